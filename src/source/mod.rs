//! フレームの供給元 (トラッキングSDKとの境界)

pub mod bridge;
pub mod replay;

use anyhow::Result;

use crate::body::{BodyFrame, BodyId};
use crate::controls::{BodyTrackingFeatures, ControlInputs, OptimizationLevel, SkeletonProfile};

pub use bridge::BridgeSource;
pub use replay::ReplaySource;

/// トラッキング設定の反映先
pub trait TrackingSource {
    fn set_body_features(&mut self, body: BodyId, features: BodyTrackingFeatures) -> Result<()>;
    fn set_default_body_features(&mut self, features: BodyTrackingFeatures) -> Result<()>;
    fn set_skeleton_profile(&mut self, profile: SkeletonProfile) -> Result<()>;
    fn set_skeleton_optimization(&mut self, level: OptimizationLevel) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Frame(BodyFrame),
    /// 記録されたUI入力
    Controls(ControlInputs),
    /// これ以上フレームは来ない
    Finished,
}

/// フレームを取り出せるトラッキングソース
pub trait FrameSource: TrackingSource {
    /// 次のイベント。まだ届いていなければ None
    fn poll_event(&mut self) -> Result<Option<SourceEvent>>;
}
