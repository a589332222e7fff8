use crate::controls::{
    BodyTrackingFeatures, ControlInputs, FeatureSelectors, OptimizationLevel, OptimizationPreset,
    OptimizationWidgets, ProfileSelectors, SkeletonProfile,
};

/// デバッグビューのキー操作 (UIトグル・スライダーの代わり)
///
/// | キー | 操作 |
/// |------|------|
/// | 1 / 2 / 3 | Segmentation / Skeleton / HandPose |
/// | F / U / B | Full / UpperBody / Basic |
/// | A / S / M | 精度 / バランス / 省メモリ |
/// | Up / Down | スライダー ±1 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Features(BodyTrackingFeatures),
    Profile(SkeletonProfile),
    Preset(OptimizationPreset),
    SliderUp,
    SliderDown,
}

impl ControlKey {
    pub fn apply(self, inputs: &mut ControlInputs) {
        match self {
            ControlKey::Features(features) => {
                inputs.features = Some(FeatureSelectors::select(features));
            }
            ControlKey::Profile(profile) => {
                inputs.profile = Some(ProfileSelectors::select(profile));
            }
            ControlKey::Preset(preset) => {
                inputs.optimization = Some(OptimizationWidgets::select(preset));
            }
            ControlKey::SliderUp => step_slider(inputs, 1.0),
            ControlKey::SliderDown => step_slider(inputs, -1.0),
        }
    }
}

fn step_slider(inputs: &mut ControlInputs, step: f32) {
    let widgets = inputs.optimization.get_or_insert_with(OptimizationWidgets::default);
    let min = OptimizationLevel::MIN as f32;
    let max = OptimizationLevel::MAX as f32;
    widgets.slider = (widgets.slider + step).clamp(min, max);
    widgets.accuracy = false;
    widgets.balanced = false;
    widgets.memory = false;
}
