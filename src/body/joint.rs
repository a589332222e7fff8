use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// トラッキングSDKの関節種別 (SDKの番号付けに合わせる)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum JointType {
    Head = 0,
    ShoulderSpine = 1,
    LeftShoulder = 2,
    LeftElbow = 3,
    LeftHand = 4,
    RightShoulder = 5,
    RightElbow = 6,
    RightHand = 7,
    MidSpine = 8,
    BaseSpine = 9,
    LeftHip = 10,
    LeftKnee = 11,
    LeftFoot = 12,
    RightHip = 13,
    RightKnee = 14,
    RightFoot = 15,
    LeftWrist = 16,
    RightWrist = 17,
    Neck = 18,
    Unknown = 255,
}

impl JointType {
    /// Unknown を除いた関節数
    pub const COUNT: usize = 19;

    /// SDKが報告する順序の全関節
    pub const ALL: [JointType; JointType::COUNT] = [
        JointType::Head,
        JointType::ShoulderSpine,
        JointType::LeftShoulder,
        JointType::LeftElbow,
        JointType::LeftHand,
        JointType::RightShoulder,
        JointType::RightElbow,
        JointType::RightHand,
        JointType::MidSpine,
        JointType::BaseSpine,
        JointType::LeftHip,
        JointType::LeftKnee,
        JointType::LeftFoot,
        JointType::RightHip,
        JointType::RightKnee,
        JointType::RightFoot,
        JointType::LeftWrist,
        JointType::RightWrist,
        JointType::Neck,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// テーブル参照用のインデックス。Unknown は None
    pub fn index(self) -> Option<usize> {
        match self {
            JointType::Unknown => None,
            other => Some(other as usize),
        }
    }
}

/// 関節のトラッキング状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointStatus {
    NotTracked,
    /// 推定値 (低信頼度)
    LowConfidence,
    Tracked,
}

impl JointStatus {
    pub fn is_tracked(self) -> bool {
        self != JointStatus::NotTracked
    }
}

/// 関節の姿勢行列 (row-major 3x3)
///
/// ```text
/// m[0] m[1] m[2]
/// m[3] m[4] m[5]
/// m[6] m[7] m[8]
/// right(X) up(Y) forward(Z)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub m: [f32; 9],
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// 右方向 (M00, M10, M20)
    pub fn right(&self) -> Vector3<f32> {
        Vector3::new(self.m[0], self.m[3], self.m[6])
    }

    /// 上方向 (M01, M11, M21)
    pub fn up(&self) -> Vector3<f32> {
        Vector3::new(self.m[1], self.m[4], self.m[7])
    }

    /// 前方向 (M02, M12, M22)
    pub fn forward(&self) -> Vector3<f32> {
        Vector3::new(self.m[2], self.m[5], self.m[8])
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// 単一関節 (フレームごとにトラッカーが生成する読み取り専用データ)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub joint_type: JointType,
    pub status: JointStatus,
    /// ワールド座標 (ミリメートル)
    pub world_position: [f32; 3],
    #[serde(default)]
    pub orientation: Orientation,
}

impl Joint {
    pub fn new(joint_type: JointType, status: JointStatus, world_position: [f32; 3]) -> Self {
        Self {
            joint_type,
            status,
            world_position,
            orientation: Orientation::identity(),
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn is_tracked(&self) -> bool {
        self.status.is_tracked()
    }
}
