//! 骨格の描画トランスフォーム
pub mod bone;
pub mod export;
pub mod mapper;
pub mod transform;

pub use bone::{Bone, ThicknessClass, BONES, BONE_COUNT};
pub use export::FrameSnapshot;
pub use mapper::{BodyVisual, BoneVisual, FrameReport, HandleId, JointVisual, RootTransform, SkeletonMapper};
pub use transform::{look_rotation, BoneTransform, JointTransform};
