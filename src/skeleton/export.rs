//! 表示中のトランスフォームを JSON Lines で書き出す
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::body::{BodyId, JointType};

use super::mapper::{BodyVisual, SkeletonMapper};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSnapshot {
    pub joint: JointType,
    /// ルート基準の位置 (m)
    pub local_position: [f32; 3],
    pub world_position: [f32; 3],
    /// (x, y, z, w)
    pub rotation: [f32; 4],
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneSnapshot {
    pub start: JointType,
    pub end: JointType,
    pub position: [f32; 3],
    pub rotation_z_degrees: f32,
    /// (太さ, 長さ, 太さ)
    pub scale: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub joints: Vec<JointSnapshot>,
    pub bones: Vec<BoneSnapshot>,
}

impl BodySnapshot {
    pub fn capture(visual: &BodyVisual) -> Self {
        let joints = visual
            .visible_joints()
            .map(|j| {
                let q = j.transform.rotation.quaternion();
                JointSnapshot {
                    joint: j.joint_type,
                    local_position: j.transform.local_position.into(),
                    world_position: j.world_position.coords.into(),
                    rotation: [q.i, q.j, q.k, q.w],
                    scale: j.transform.scale,
                }
            })
            .collect();
        let bones = visual
            .visible_bones()
            .map(|b| BoneSnapshot {
                start: b.bone.start,
                end: b.bone.end,
                position: b.transform.position.coords.into(),
                rotation_z_degrees: b.transform.rotation_z_degrees,
                scale: b.transform.scale.into(),
            })
            .collect();
        Self {
            id: visual.id,
            joints,
            bones,
        }
    }
}

/// 1フレーム分の表示状態 (人物は ID 順)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame_index: i64,
    pub bodies: Vec<BodySnapshot>,
}

impl FrameSnapshot {
    pub fn capture(frame_index: i64, mapper: &SkeletonMapper) -> Self {
        let mut bodies: Vec<BodySnapshot> = mapper.bodies().map(BodySnapshot::capture).collect();
        bodies.sort_by_key(|b| b.id);
        Self { frame_index, bodies }
    }

    pub fn write_json_line<W: Write>(&self, out: &mut W) -> Result<()> {
        serde_json::to_writer(&mut *out, self)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}
