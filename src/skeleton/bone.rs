use crate::body::JointType;

/// 2関節をつなぐ骨 (開始関節, 終了関節)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bone {
    pub start: JointType,
    pub end: JointType,
}

impl Bone {
    pub const fn new(start: JointType, end: JointType) -> Self {
        Self { start, end }
    }

    pub fn thickness_class(&self) -> ThicknessClass {
        ThicknessClass::of(self.start)
    }
}

pub const BONE_COUNT: usize = 18;

/// 骨格構造 = 骨のリスト (全人物で共通)
pub const BONES: [Bone; BONE_COUNT] = [
    // 背骨・首・頭
    Bone::new(JointType::BaseSpine, JointType::MidSpine),
    Bone::new(JointType::MidSpine, JointType::ShoulderSpine),
    Bone::new(JointType::ShoulderSpine, JointType::Neck),
    Bone::new(JointType::Neck, JointType::Head),
    // 左腕
    Bone::new(JointType::ShoulderSpine, JointType::LeftShoulder),
    Bone::new(JointType::LeftShoulder, JointType::LeftElbow),
    Bone::new(JointType::LeftElbow, JointType::LeftWrist),
    Bone::new(JointType::LeftWrist, JointType::LeftHand),
    // 右腕
    Bone::new(JointType::ShoulderSpine, JointType::RightShoulder),
    Bone::new(JointType::RightShoulder, JointType::RightElbow),
    Bone::new(JointType::RightElbow, JointType::RightWrist),
    Bone::new(JointType::RightWrist, JointType::RightHand),
    // 左脚
    Bone::new(JointType::BaseSpine, JointType::LeftHip),
    Bone::new(JointType::LeftHip, JointType::LeftKnee),
    Bone::new(JointType::LeftKnee, JointType::LeftFoot),
    // 右脚
    Bone::new(JointType::BaseSpine, JointType::RightHip),
    Bone::new(JointType::RightHip, JointType::RightKnee),
    Bone::new(JointType::RightKnee, JointType::RightFoot),
];

/// 骨の太さ
pub const BONE_THICKNESS: f32 = 1.0;
/// 腕・脚 (筋肉) の太さ
pub const MUSCLE_THICKNESS: f32 = 2.0;
/// 頭の太さ
pub const HEAD_THICKNESS: f32 = 0.15;
/// 頭は首からの距離を伸ばして描く
pub const HEAD_LENGTH_FACTOR: f32 = 1.5;

/// 開始関節で決まる太さの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThicknessClass {
    Head,
    Muscle,
    Bone,
}

use ThicknessClass::{Bone as B, Head as H, Muscle as M};

/// JointType の番号順
const THICKNESS_TABLE: [ThicknessClass; JointType::COUNT] = [
    B, // Head
    B, // ShoulderSpine
    M, // LeftShoulder
    M, // LeftElbow
    B, // LeftHand
    M, // RightShoulder
    M, // RightElbow
    B, // RightHand
    B, // MidSpine
    B, // BaseSpine
    M, // LeftHip
    M, // LeftKnee
    B, // LeftFoot
    M, // RightHip
    M, // RightKnee
    B, // RightFoot
    B, // LeftWrist
    B, // RightWrist
    H, // Neck
];

impl ThicknessClass {
    pub fn of(joint_type: JointType) -> Self {
        joint_type
            .index()
            .map(|i| THICKNESS_TABLE[i])
            .unwrap_or(ThicknessClass::Bone)
    }

    pub fn thickness(self) -> f32 {
        match self {
            ThicknessClass::Head => HEAD_THICKNESS,
            ThicknessClass::Muscle => MUSCLE_THICKNESS,
            ThicknessClass::Bone => BONE_THICKNESS,
        }
    }

    pub fn length_factor(self) -> f32 {
        match self {
            ThicknessClass::Head => HEAD_LENGTH_FACTOR,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_count() {
        assert_eq!(BONES.len(), 18);
    }

    #[test]
    fn test_bones_are_unique() {
        for (i, a) in BONES.iter().enumerate() {
            for b in BONES.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_neck_is_head_class() {
        assert_eq!(ThicknessClass::of(JointType::Neck), ThicknessClass::Head);
        assert_eq!(ThicknessClass::Head.thickness(), HEAD_THICKNESS);
        assert_eq!(ThicknessClass::Head.length_factor(), 1.5);
    }

    #[test]
    fn test_limb_joints_are_muscle_class() {
        for ty in [
            JointType::LeftShoulder,
            JointType::RightShoulder,
            JointType::LeftElbow,
            JointType::RightElbow,
            JointType::LeftHip,
            JointType::RightHip,
            JointType::LeftKnee,
            JointType::RightKnee,
        ] {
            assert_eq!(ThicknessClass::of(ty), ThicknessClass::Muscle, "{:?}", ty);
        }
    }

    #[test]
    fn test_other_joints_are_bone_class() {
        for ty in [
            JointType::Head,
            JointType::BaseSpine,
            JointType::MidSpine,
            JointType::ShoulderSpine,
            JointType::LeftWrist,
            JointType::RightHand,
            JointType::LeftFoot,
            JointType::Unknown,
        ] {
            assert_eq!(ThicknessClass::of(ty), ThicknessClass::Bone, "{:?}", ty);
        }
        assert_eq!(ThicknessClass::Bone.length_factor(), 1.0);
    }

    #[test]
    fn test_head_bone_starts_at_neck() {
        let head = BONES[3];
        assert_eq!(head, Bone::new(JointType::Neck, JointType::Head));
        assert_eq!(head.thickness_class(), ThicknessClass::Head);
    }
}
