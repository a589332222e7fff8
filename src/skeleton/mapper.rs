use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::body::{Body, BodyFrame, BodyId, JointType};
use crate::config::MapperConfig;

use super::bone::{Bone, BONES, BONE_COUNT};
use super::transform::{BoneTransform, JointTransform};

/// 描画オブジェクトの識別子 (プロセス内で一意、再利用しない)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

/// 関節オブジェクトをぶら下げるルート
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootTransform {
    pub position: Vector3<f32>,
    pub scale: f32,
}

impl RootTransform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            scale: 1.0,
        }
    }

    /// ローカル座標 → ワールド座標
    pub fn to_world(&self, local: &Vector3<f32>) -> Point3<f32> {
        Point3::from(self.position + local * self.scale)
    }
}

impl Default for RootTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointVisual {
    pub handle: HandleId,
    pub joint_type: JointType,
    pub visible: bool,
    pub transform: JointTransform,
    /// ルート適用後のワールド位置
    pub world_position: Point3<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoneVisual {
    pub handle: HandleId,
    pub bone: Bone,
    pub visible: bool,
    pub transform: BoneTransform,
}

/// 1人分の描画オブジェクト群
#[derive(Debug, Clone)]
pub struct BodyVisual {
    pub id: BodyId,
    pub joints: Vec<JointVisual>,
    pub bones: Vec<BoneVisual>,
    /// 最後に見えた処理済みフレーム番号
    last_seen: u64,
}

impl BodyVisual {
    pub fn visible_joints(&self) -> impl Iterator<Item = &JointVisual> {
        self.joints.iter().filter(|j| j.visible)
    }

    pub fn visible_bones(&self) -> impl Iterator<Item = &BoneVisual> {
        self.bones.iter().filter(|b| b.visible)
    }

    pub fn handles(&self) -> impl Iterator<Item = HandleId> + '_ {
        self.joints
            .iter()
            .map(|j| j.handle)
            .chain(self.bones.iter().map(|b| b.handle))
    }
}

/// on_frame の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame_index: i64,
    /// 今回初めて割り当てた人物 (テレメトリ送信のトリガ)
    pub new_bodies: Vec<BodyId>,
    pub tracked_bodies: Vec<BodyId>,
    pub evicted_bodies: Vec<BodyId>,
}

/// トラッキング結果を関節・骨の描画トランスフォームへ写像する
pub struct SkeletonMapper {
    bodies: HashMap<BodyId, BodyVisual>,
    last_frame_index: Option<i64>,
    processed_frames: u64,
    next_handle: u64,
    root: RootTransform,
    /// 0 なら破棄しない
    evict_after_frames: u32,
}

impl SkeletonMapper {
    pub fn new(root: RootTransform, evict_after_frames: u32) -> Self {
        Self {
            bodies: HashMap::new(),
            last_frame_index: None,
            processed_frames: 0,
            next_handle: 0,
            root,
            evict_after_frames,
        }
    }

    pub fn from_config(config: &MapperConfig) -> Self {
        let root = RootTransform {
            position: Vector3::from(config.root_position),
            scale: config.root_scale,
        };
        Self::new(root, config.evict_after_frames)
    }

    pub fn root(&self) -> &RootTransform {
        &self.root
    }

    pub fn last_frame_index(&self) -> Option<i64> {
        self.last_frame_index
    }

    pub fn body(&self, id: BodyId) -> Option<&BodyVisual> {
        self.bodies.get(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &BodyVisual> {
        self.bodies.values()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// 新しいフレームを処理する
    ///
    /// 幅・高さが0のフレームと、直前と同じ番号のフレームは無視して None を返す
    pub fn on_frame(&mut self, frame: &BodyFrame) -> Option<FrameReport> {
        if !frame.is_valid() {
            debug!("skip frame {}: {}x{}", frame.frame_index, frame.width, frame.height);
            return None;
        }
        if let Some(last) = self.last_frame_index {
            if last == frame.frame_index {
                return None;
            }
            if frame.frame_index < last {
                debug!("frame index went backwards: {} -> {}", last, frame.frame_index);
            }
        }

        self.last_frame_index = Some(frame.frame_index);
        self.processed_frames += 1;

        let mut report = FrameReport {
            frame_index: frame.frame_index,
            ..FrameReport::default()
        };

        for body in frame.tracked_bodies() {
            if self.ensure_allocated(body) {
                info!("new body detected: {} ({} joints)", body.id, body.joints.len());
                report.new_bodies.push(body.id);
            }
            self.update_body(body);
            report.tracked_bodies.push(body.id);
        }

        report.evicted_bodies = self.evict_stale();
        Some(report)
    }

    /// 未登録のIDなら描画オブジェクトを割り当てる。割り当てたら true
    fn ensure_allocated(&mut self, body: &Body) -> bool {
        if self.bodies.contains_key(&body.id) {
            return false;
        }

        let joints = body
            .joints
            .iter()
            .map(|joint| JointVisual {
                handle: self.allocate_handle(),
                joint_type: joint.joint_type,
                visible: false,
                transform: JointTransform::default(),
                world_position: self.root.to_world(&Vector3::zeros()),
            })
            .collect();
        let bones = BONES
            .iter()
            .map(|bone| BoneVisual {
                handle: self.allocate_handle(),
                bone: *bone,
                visible: false,
                transform: BoneTransform::default(),
            })
            .collect();

        self.bodies.insert(
            body.id,
            BodyVisual {
                id: body.id,
                joints,
                bones,
                last_seen: self.processed_frames,
            },
        );
        true
    }

    fn allocate_handle(&mut self) -> HandleId {
        let id = HandleId(self.next_handle);
        self.next_handle += 1;
        id
    }

    fn update_body(&mut self, body: &Body) {
        let root = self.root;
        let processed = self.processed_frames;
        let visual = match self.bodies.get_mut(&body.id) {
            Some(v) => v,
            None => return,
        };
        visual.last_seen = processed;

        if visual.joints.len() != body.joints.len() {
            warn!(
                "{}: joint count changed {} -> {}",
                body.id,
                visual.joints.len(),
                body.joints.len()
            );
        }

        // 関節
        for (handle, joint) in visual.joints.iter_mut().zip(body.joints.iter()) {
            handle.joint_type = joint.joint_type;
            if !joint.is_tracked() {
                handle.visible = false;
                continue;
            }
            handle.visible = true;
            handle.transform = JointTransform::from_joint(joint);
            handle.world_position = root.to_world(&handle.transform.local_position);
        }
        // 関節データより多いオブジェクトは表示しない
        for handle in visual.joints.iter_mut().skip(body.joints.len()) {
            handle.visible = false;
        }

        // 骨
        debug_assert_eq!(visual.bones.len(), BONE_COUNT);
        for bone_visual in visual.bones.iter_mut() {
            let bone = bone_visual.bone;
            let (start, end) = match resolve_bone(body, &bone, visual.joints.len()) {
                Some(pair) => pair,
                None => {
                    warn!(
                        "{}: unresolved bone {:?} -> {:?}",
                        body.id, bone.start, bone.end
                    );
                    bone_visual.visible = false;
                    continue;
                }
            };

            if !body.joints[start].is_tracked() || !body.joints[end].is_tracked() {
                bone_visual.visible = false;
                continue;
            }

            bone_visual.visible = true;
            bone_visual.transform = BoneTransform::between(
                &visual.joints[start].world_position,
                &visual.joints[end].world_position,
                bone.thickness_class(),
            );
        }
    }

    /// evict_after_frames フレーム連続で見えていない人物を破棄
    fn evict_stale(&mut self) -> Vec<BodyId> {
        if self.evict_after_frames == 0 {
            return Vec::new();
        }

        let processed = self.processed_frames;
        let limit = u64::from(self.evict_after_frames);
        let mut evicted: Vec<BodyId> = self
            .bodies
            .values()
            .filter(|v| processed - v.last_seen >= limit)
            .map(|v| v.id)
            .collect();
        evicted.sort();

        for id in &evicted {
            self.bodies.remove(id);
            info!("evicted {} after {} frames without tracking", id, limit);
        }
        evicted
    }
}

impl Default for SkeletonMapper {
    fn default() -> Self {
        Self::new(RootTransform::identity(), 0)
    }
}

/// 骨の両端の関節インデックス。どちらかが見つからなければ None
fn resolve_bone(body: &Body, bone: &Bone, handle_count: usize) -> Option<(usize, usize)> {
    let start = find_index(body, bone.start, handle_count)?;
    let end = find_index(body, bone.end, handle_count)?;
    Some((start, end))
}

fn find_index(body: &Body, joint_type: JointType, handle_count: usize) -> Option<usize> {
    body.find_joint_index(joint_type).filter(|&i| i < handle_count)
}
