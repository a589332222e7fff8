use serde::{Deserialize, Serialize};
use std::fmt;

use super::joint::{Joint, JointType};

/// 追跡中の人物ID (追跡が続く間は安定)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u8);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// 人物のトラッキング状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyStatus {
    NotTracking,
    Lost,
    TrackingStarted,
    Tracking,
}

/// 1人分の関節データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub status: BodyStatus,
    pub joints: Vec<Joint>,
}

impl Body {
    pub fn new(id: BodyId, status: BodyStatus, joints: Vec<Joint>) -> Self {
        Self { id, status, joints }
    }

    pub fn is_tracking(&self) -> bool {
        self.status != BodyStatus::NotTracking
    }

    /// 関節種別から配列インデックスを線形探索で求める
    pub fn find_joint_index(&self, joint_type: JointType) -> Option<usize> {
        self.joints.iter().position(|j| j.joint_type == joint_type)
    }
}

/// 1フレーム分のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFrame {
    pub frame_index: i64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub bodies: Vec<Body>,
}

impl BodyFrame {
    pub fn new(frame_index: i64, width: u32, height: u32, bodies: Vec<Body>) -> Self {
        Self {
            frame_index,
            width,
            height,
            bodies,
        }
    }

    /// 幅・高さが0のフレームは不正
    pub fn is_valid(&self) -> bool {
        self.width != 0 && self.height != 0
    }

    /// 追跡中 (NotTracking 以外) の人物
    pub fn tracked_bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.is_tracking())
    }
}
