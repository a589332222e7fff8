//! トラッキング設定 (機能・プロファイル・最適化レベル) の状態管理
//!
//! UIの入力を毎フレーム評価し、確定した値が前回適用した値と異なるときだけ
//! トラッキングソースへ反映する。最適化レベルは適用済みの値が唯一の状態で、
//! スライダー位置とプリセットの選択状態はそこから導出する。

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::body::BodyId;
use crate::source::TrackingSource;

/// トラッキング機能
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyTrackingFeatures {
    Segmentation,
    Skeleton,
    HandPose,
}

/// 骨格プロファイル (SDKが報告する関節の集合)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkeletonProfile {
    Full,
    UpperBody,
    Basic,
}

/// 最適化レベル 1..=9 (1: 省メモリ, 9: 精度優先)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OptimizationLevel(u8);

impl OptimizationLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;

    pub const MINIMIZE_MEMORY: Self = Self(1);
    pub const BALANCED: Self = Self(5);
    pub const BEST_ACCURACY: Self = Self(9);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// スライダー値を整数に切り捨てて解釈する。範囲外は最大値に丸める
    pub fn from_slider(slider: f32) -> (Self, bool) {
        let truncated = slider as i32;
        match u8::try_from(truncated).ok().and_then(Self::new) {
            Some(level) => (level, false),
            None => (Self::BEST_ACCURACY, true),
        }
    }

    pub fn preset(self) -> Option<OptimizationPreset> {
        OptimizationPreset::ALL.into_iter().find(|p| p.level() == self)
    }
}

impl TryFrom<u8> for OptimizationLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("optimization level out of range: {}", value))
    }
}

impl From<OptimizationLevel> for u8 {
    fn from(level: OptimizationLevel) -> Self {
        level.0
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Optimization{}", self.0)
    }
}

/// 名前付きの最適化レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationPreset {
    BestAccuracy,
    Balanced,
    MinimizeMemory,
}

impl OptimizationPreset {
    /// UIでの評価順
    pub const ALL: [OptimizationPreset; 3] = [
        OptimizationPreset::BestAccuracy,
        OptimizationPreset::Balanced,
        OptimizationPreset::MinimizeMemory,
    ];

    pub fn level(self) -> OptimizationLevel {
        match self {
            OptimizationPreset::BestAccuracy => OptimizationLevel::BEST_ACCURACY,
            OptimizationPreset::Balanced => OptimizationLevel::BALANCED,
            OptimizationPreset::MinimizeMemory => OptimizationLevel::MINIMIZE_MEMORY,
        }
    }
}

/// 機能選択トグル (排他)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSelectors {
    pub segmentation: bool,
    pub skeleton: bool,
    pub hand_pose: bool,
}

impl FeatureSelectors {
    pub fn resolve(&self) -> BodyTrackingFeatures {
        if self.hand_pose {
            BodyTrackingFeatures::HandPose
        } else if self.skeleton {
            BodyTrackingFeatures::Skeleton
        } else {
            BodyTrackingFeatures::Segmentation
        }
    }

    pub fn select(features: BodyTrackingFeatures) -> Self {
        Self {
            segmentation: features == BodyTrackingFeatures::Segmentation,
            skeleton: features == BodyTrackingFeatures::Skeleton,
            hand_pose: features == BodyTrackingFeatures::HandPose,
        }
    }
}

/// プロファイル選択トグル (排他)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSelectors {
    pub full: bool,
    pub upper_body: bool,
    pub basic: bool,
}

impl ProfileSelectors {
    pub fn resolve(&self) -> SkeletonProfile {
        if self.full {
            SkeletonProfile::Full
        } else if self.upper_body {
            SkeletonProfile::UpperBody
        } else if self.basic {
            SkeletonProfile::Basic
        } else {
            SkeletonProfile::Full
        }
    }

    pub fn select(profile: SkeletonProfile) -> Self {
        Self {
            full: profile == SkeletonProfile::Full,
            upper_body: profile == SkeletonProfile::UpperBody,
            basic: profile == SkeletonProfile::Basic,
        }
    }
}

/// 最適化のプリセットトグルとスライダー (0..=9)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationWidgets {
    pub accuracy: bool,
    pub balanced: bool,
    pub memory: bool,
    pub slider: f32,
}

impl OptimizationWidgets {
    /// 選択中の最初のプリセット (精度, バランス, 省メモリの順)
    pub fn selected_preset(&self) -> Option<OptimizationPreset> {
        if self.accuracy {
            Some(OptimizationPreset::BestAccuracy)
        } else if self.balanced {
            Some(OptimizationPreset::Balanced)
        } else if self.memory {
            Some(OptimizationPreset::MinimizeMemory)
        } else {
            None
        }
    }

    pub fn select(preset: OptimizationPreset) -> Self {
        let mut widgets = Self::default();
        widgets.apply_view(preset.level());
        widgets
    }

    fn apply_view(&mut self, level: OptimizationLevel) {
        let preset = level.preset();
        self.slider = level.value() as f32;
        self.accuracy = preset == Some(OptimizationPreset::BestAccuracy);
        self.balanced = preset == Some(OptimizationPreset::Balanced);
        self.memory = preset == Some(OptimizationPreset::MinimizeMemory);
    }
}

/// 毎フレーム読み取るUI入力。None のグループは評価しない
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlInputs {
    pub features: Option<FeatureSelectors>,
    pub profile: Option<ProfileSelectors>,
    pub optimization: Option<OptimizationWidgets>,
}

impl ControlInputs {
    /// 全グループを接続した状態 (初期値は適用済み設定に合わせる)
    pub fn connected() -> Self {
        let view = TrackingControls::new().view();
        let mut inputs = Self {
            features: Some(FeatureSelectors::select(view.features)),
            profile: Some(ProfileSelectors::select(view.profile)),
            optimization: Some(OptimizationWidgets::default()),
        };
        inputs.sync_view(&view);
        inputs
    }

    /// 記録された入力のうち接続されているグループだけを上書きする
    pub fn overlay(&mut self, recorded: &ControlInputs) {
        if recorded.features.is_some() {
            self.features = recorded.features;
        }
        if recorded.profile.is_some() {
            self.profile = recorded.profile;
        }
        if recorded.optimization.is_some() {
            self.optimization = recorded.optimization;
        }
    }

    /// 導出された表示状態をスライダーとプリセットトグルへ書き戻す
    pub fn sync_view(&mut self, view: &ControlView) {
        if let Some(widgets) = self.optimization.as_mut() {
            widgets.apply_view(view.optimization);
        }
    }
}

/// 適用済み設定から導出した表示状態
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlView {
    pub features: BodyTrackingFeatures,
    pub profile: SkeletonProfile,
    pub optimization: OptimizationLevel,
}

impl ControlView {
    pub fn slider(&self) -> f32 {
        self.optimization.value() as f32
    }

    pub fn preset(&self) -> Option<OptimizationPreset> {
        self.optimization.preset()
    }
}

/// 適用済みのトラッキング設定
#[derive(Debug, Clone)]
pub struct TrackingControls {
    features: BodyTrackingFeatures,
    profile: SkeletonProfile,
    optimization: OptimizationLevel,
}

impl TrackingControls {
    pub fn new() -> Self {
        Self {
            features: BodyTrackingFeatures::HandPose,
            profile: SkeletonProfile::Full,
            optimization: OptimizationLevel::BEST_ACCURACY,
        }
    }

    pub fn view(&self) -> ControlView {
        ControlView {
            features: self.features,
            profile: self.profile,
            optimization: self.optimization,
        }
    }

    /// 入力を評価し、変化したものだけをソースへ反映する
    ///
    /// 適用済みの値は反映前に更新するため、ソース側のエラーで再送が繰り返されることはない。
    /// 一部の反映に失敗しても残りの反映と他のグループの評価は続け、エラーはまとめて返す
    pub fn update<S: TrackingSource + ?Sized>(
        &mut self,
        inputs: &ControlInputs,
        tracked_bodies: &[BodyId],
        source: &mut S,
    ) -> Result<ControlView> {
        let mut errors = Vec::new();
        if let Some(selectors) = inputs.features {
            self.update_features(selectors.resolve(), tracked_bodies, source, &mut errors);
        }
        if let Some(selectors) = inputs.profile {
            if let Err(e) = self.update_profile(selectors.resolve(), source) {
                errors.push(e);
            }
        }
        if let Some(widgets) = inputs.optimization {
            if let Err(e) = self.update_optimization(&widgets, source) {
                errors.push(e);
            }
        }
        combine_errors(errors)?;
        Ok(self.view())
    }

    fn update_features<S: TrackingSource + ?Sized>(
        &mut self,
        target: BodyTrackingFeatures,
        tracked_bodies: &[BodyId],
        source: &mut S,
        errors: &mut Vec<anyhow::Error>,
    ) {
        if target == self.features {
            return;
        }
        self.features = target;
        info!("SetBodyFeatures: {:?}", target);
        for id in tracked_bodies {
            if let Err(e) = source.set_body_features(*id, target) {
                errors.push(e.context(format!("SetBodyFeatures {}", id)));
            }
        }
        if let Err(e) = source.set_default_body_features(target) {
            errors.push(e.context("SetDefaultBodyFeatures"));
        }
    }

    fn update_profile<S: TrackingSource + ?Sized>(
        &mut self,
        target: SkeletonProfile,
        source: &mut S,
    ) -> Result<()> {
        if target == self.profile {
            return Ok(());
        }
        self.profile = target;
        info!("SetSkeletonProfile: {:?}", target);
        source.set_skeleton_profile(target).context("SetSkeletonProfile")
    }

    fn update_optimization<S: TrackingSource + ?Sized>(
        &mut self,
        widgets: &OptimizationWidgets,
        source: &mut S,
    ) -> Result<()> {
        // プリセットは適用済みの値と異なるときだけスライダーより優先
        let target = match widgets.selected_preset().map(OptimizationPreset::level) {
            Some(level) if level != self.optimization => level,
            _ => {
                let (level, clamped) = OptimizationLevel::from_slider(widgets.slider);
                if clamped {
                    debug!("optimization slider {} out of range, clamped to {}", widgets.slider, level.value());
                }
                level
            }
        };

        if target == self.optimization {
            return Ok(());
        }
        self.optimization = target;
        info!("SetSkeletonOptimization: {}", target);
        source.set_skeleton_optimization(target).context("SetSkeletonOptimization")
    }
}

/// 1件ならそのまま、複数なら1つのエラーにまとめる
fn combine_errors(mut errors: Vec<anyhow::Error>) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        n => {
            let messages: Vec<String> = errors.iter().map(|e| format!("{:#}", e)).collect();
            Err(anyhow!("{} tracking settings rejected: {}", n, messages.join("; ")))
        }
    }
}

impl Default for TrackingControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::{Command, RecordingSource};

    fn optimization_inputs(widgets: OptimizationWidgets) -> ControlInputs {
        ControlInputs {
            optimization: Some(widgets),
            ..ControlInputs::default()
        }
    }

    #[test]
    fn test_level_from_slider() {
        assert_eq!(OptimizationLevel::from_slider(7.0), (OptimizationLevel(7), false));
        assert_eq!(OptimizationLevel::from_slider(7.9), (OptimizationLevel(7), false));
        assert_eq!(OptimizationLevel::from_slider(1.0), (OptimizationLevel(1), false));
        assert_eq!(OptimizationLevel::from_slider(0.0), (OptimizationLevel(9), true));
        assert_eq!(OptimizationLevel::from_slider(12.0), (OptimizationLevel(9), true));
        assert_eq!(OptimizationLevel::from_slider(-3.0), (OptimizationLevel(9), true));
        assert_eq!(OptimizationLevel::from_slider(f32::NAN), (OptimizationLevel(9), true));
    }

    #[test]
    fn test_level_presets() {
        assert_eq!(OptimizationLevel(1).preset(), Some(OptimizationPreset::MinimizeMemory));
        assert_eq!(OptimizationLevel(5).preset(), Some(OptimizationPreset::Balanced));
        assert_eq!(OptimizationLevel(9).preset(), Some(OptimizationPreset::BestAccuracy));
        assert_eq!(OptimizationLevel(7).preset(), None);
        assert_eq!(OptimizationLevel(7).to_string(), "Optimization7");
    }

    #[test]
    fn test_level_serde_rejects_out_of_range() {
        assert_eq!(serde_json::from_str::<OptimizationLevel>("4").unwrap(), OptimizationLevel(4));
        assert!(serde_json::from_str::<OptimizationLevel>("0").is_err());
        assert!(serde_json::from_str::<OptimizationLevel>("10").is_err());
    }

    #[test]
    fn test_slider_change_applied_once() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let inputs = optimization_inputs(OptimizationWidgets {
            slider: 7.0,
            ..OptimizationWidgets::default()
        });

        for _ in 0..5 {
            let view = controls.update(&inputs, &[], &mut source).unwrap();
            assert_eq!(view.optimization, OptimizationLevel(7));
            assert_eq!(view.preset(), None);
        }
        assert_eq!(
            source.commands,
            vec![Command::SkeletonOptimization(OptimizationLevel(7))]
        );
    }

    #[test]
    fn test_accuracy_preset_drives_slider() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let mut inputs = ControlInputs::connected();

        // スライダーを 3 へ
        inputs.optimization.as_mut().unwrap().slider = 3.0;
        let view = controls.update(&inputs, &[], &mut source).unwrap();
        inputs.sync_view(&view);
        let widgets = inputs.optimization.unwrap();
        assert_eq!(widgets.slider, 3.0);
        assert!(!widgets.accuracy && !widgets.balanced && !widgets.memory);

        // 精度優先プリセットを選択
        inputs.optimization.as_mut().unwrap().accuracy = true;
        let view = controls.update(&inputs, &[], &mut source).unwrap();
        inputs.sync_view(&view);
        let widgets = inputs.optimization.unwrap();
        assert_eq!(view.optimization, OptimizationLevel::BEST_ACCURACY);
        assert_eq!(widgets.slider, 9.0);
        assert!(widgets.accuracy);
        assert!(!widgets.balanced);
        assert!(!widgets.memory);

        assert_eq!(
            source.commands,
            vec![
                Command::SkeletonOptimization(OptimizationLevel(3)),
                Command::SkeletonOptimization(OptimizationLevel(9)),
            ]
        );
    }

    #[test]
    fn test_preset_switch_clears_other_presets() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let mut inputs = optimization_inputs(OptimizationWidgets::select(OptimizationPreset::BestAccuracy));

        // 精度優先が先に評価され、適用済み (9) と同じなのでスライダー (9) が使われる
        inputs.optimization.as_mut().unwrap().memory = true;
        let view = controls.update(&inputs, &[], &mut source).unwrap();
        assert_eq!(view.optimization, OptimizationLevel(9));
        assert!(source.commands.is_empty());

        let mut inputs = optimization_inputs(OptimizationWidgets::select(OptimizationPreset::MinimizeMemory));
        let view = controls.update(&inputs, &[], &mut source).unwrap();
        inputs.sync_view(&view);
        let widgets = inputs.optimization.unwrap();
        assert_eq!(view.optimization, OptimizationLevel::MINIMIZE_MEMORY);
        assert_eq!(widgets.slider, 1.0);
        assert!(widgets.memory && !widgets.accuracy && !widgets.balanced);
    }

    #[test]
    fn test_slider_moved_after_preset_wins() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let mut inputs = optimization_inputs(OptimizationWidgets::select(OptimizationPreset::Balanced));
        let view = controls.update(&inputs, &[], &mut source).unwrap();
        assert_eq!(view.optimization, OptimizationLevel::BALANCED);
        inputs.sync_view(&view);

        // バランスのトグルが付いたままスライダーを 6 へ
        inputs.optimization.as_mut().unwrap().slider = 6.0;
        let view = controls.update(&inputs, &[], &mut source).unwrap();
        inputs.sync_view(&view);
        assert_eq!(view.optimization, OptimizationLevel(6));
        assert_eq!(inputs.optimization.unwrap().selected_preset(), None);
    }

    #[test]
    fn test_out_of_range_slider_clamps_to_max() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let mut inputs = optimization_inputs(OptimizationWidgets {
            slider: 4.0,
            ..OptimizationWidgets::default()
        });
        controls.update(&inputs, &[], &mut source).unwrap();

        inputs.optimization.as_mut().unwrap().slider = 15.0;
        let view = controls.update(&inputs, &[], &mut source).unwrap();
        inputs.sync_view(&view);
        assert_eq!(view.optimization, OptimizationLevel(9));
        assert_eq!(inputs.optimization.unwrap().slider, 9.0);
        assert!(inputs.optimization.unwrap().accuracy);
    }

    #[test]
    fn test_features_pushed_to_tracked_bodies_then_default() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let inputs = ControlInputs {
            features: Some(FeatureSelectors {
                skeleton: true,
                ..FeatureSelectors::default()
            }),
            ..ControlInputs::default()
        };
        let bodies = [BodyId(1), BodyId(4)];
        controls.update(&inputs, &bodies, &mut source).unwrap();
        controls.update(&inputs, &bodies, &mut source).unwrap();

        assert_eq!(
            source.commands,
            vec![
                Command::BodyFeatures(BodyId(1), BodyTrackingFeatures::Skeleton),
                Command::BodyFeatures(BodyId(4), BodyTrackingFeatures::Skeleton),
                Command::DefaultBodyFeatures(BodyTrackingFeatures::Skeleton),
            ]
        );
    }

    #[test]
    fn test_feature_resolution_priority() {
        let all = FeatureSelectors {
            segmentation: true,
            skeleton: true,
            hand_pose: true,
        };
        assert_eq!(all.resolve(), BodyTrackingFeatures::HandPose);
        assert_eq!(FeatureSelectors::default().resolve(), BodyTrackingFeatures::Segmentation);
    }

    #[test]
    fn test_profile_change_detection() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let upper = ControlInputs {
            profile: Some(ProfileSelectors::select(SkeletonProfile::UpperBody)),
            ..ControlInputs::default()
        };
        let none_selected = ControlInputs {
            profile: Some(ProfileSelectors::default()),
            ..ControlInputs::default()
        };
        controls.update(&upper, &[], &mut source).unwrap();
        controls.update(&upper, &[], &mut source).unwrap();
        controls.update(&none_selected, &[], &mut source).unwrap();

        assert_eq!(
            source.commands,
            vec![
                Command::SkeletonProfile(SkeletonProfile::UpperBody),
                Command::SkeletonProfile(SkeletonProfile::Full),
            ]
        );
    }

    #[test]
    fn test_disconnected_inputs_do_nothing() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let view = controls.update(&ControlInputs::default(), &[BodyId(1)], &mut source).unwrap();
        assert!(source.commands.is_empty());
        assert_eq!(view.features, BodyTrackingFeatures::HandPose);
        assert_eq!(view.profile, SkeletonProfile::Full);
        assert_eq!(view.optimization, OptimizationLevel::BEST_ACCURACY);
    }

    #[test]
    fn test_connected_defaults_apply_nothing() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource::default();
        let inputs = ControlInputs::connected();
        controls.update(&inputs, &[], &mut source).unwrap();
        assert!(source.commands.is_empty());
    }

    #[test]
    fn test_applied_value_kept_when_source_fails() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource {
            fail: true,
            ..RecordingSource::default()
        };
        let inputs = optimization_inputs(OptimizationWidgets {
            slider: 2.0,
            ..OptimizationWidgets::default()
        });
        assert!(controls.update(&inputs, &[], &mut source).is_err());
        // 2回目は変化なしなので送らない
        assert!(controls.update(&inputs, &[], &mut source).is_ok());
        assert_eq!(controls.view().optimization, OptimizationLevel(2));
    }

    #[test]
    fn test_failed_body_push_does_not_skip_the_rest() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource {
            fail_next: 1,
            ..RecordingSource::default()
        };
        let inputs = ControlInputs {
            features: Some(FeatureSelectors::select(BodyTrackingFeatures::Skeleton)),
            profile: Some(ProfileSelectors::select(SkeletonProfile::Basic)),
            optimization: None,
        };
        let bodies = [BodyId(1), BodyId(2)];

        let err = controls.update(&inputs, &bodies, &mut source).unwrap_err();
        assert!(format!("{:#}", err).contains("body#1"));
        assert_eq!(
            source.commands,
            vec![
                Command::BodyFeatures(BodyId(1), BodyTrackingFeatures::Skeleton),
                Command::BodyFeatures(BodyId(2), BodyTrackingFeatures::Skeleton),
                Command::DefaultBodyFeatures(BodyTrackingFeatures::Skeleton),
                Command::SkeletonProfile(SkeletonProfile::Basic),
            ]
        );
        assert_eq!(controls.view().features, BodyTrackingFeatures::Skeleton);
        assert_eq!(controls.view().profile, SkeletonProfile::Basic);

        // 適用済みなので再送しない
        controls.update(&inputs, &bodies, &mut source).unwrap();
        assert_eq!(source.commands.len(), 4);
    }

    #[test]
    fn test_every_failure_reported_together() {
        let mut controls = TrackingControls::new();
        let mut source = RecordingSource {
            fail: true,
            ..RecordingSource::default()
        };
        let inputs = ControlInputs {
            features: Some(FeatureSelectors::select(BodyTrackingFeatures::Segmentation)),
            profile: Some(ProfileSelectors::select(SkeletonProfile::UpperBody)),
            optimization: Some(OptimizationWidgets::select(OptimizationPreset::Balanced)),
        };

        let err = controls.update(&inputs, &[BodyId(3)], &mut source).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("4 tracking settings rejected"));
        assert!(message.contains("SetDefaultBodyFeatures"));
        assert!(message.contains("SetSkeletonOptimization"));
        assert_eq!(source.commands.len(), 4);
        assert_eq!(controls.view().optimization, OptimizationLevel::BALANCED);
    }

    #[test]
    fn test_overlay_replaces_recorded_groups_only() {
        let mut inputs = ControlInputs::connected();
        let recorded = ControlInputs {
            profile: Some(ProfileSelectors::select(SkeletonProfile::Basic)),
            ..ControlInputs::default()
        };
        inputs.overlay(&recorded);
        assert_eq!(inputs.profile.unwrap().resolve(), SkeletonProfile::Basic);
        assert_eq!(inputs.features.unwrap().resolve(), BodyTrackingFeatures::HandPose);
        assert_eq!(inputs.optimization.unwrap().slider, 9.0);
    }
}
