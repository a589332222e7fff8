use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

use crate::body::{BodyFrame, BodyId};
use crate::controls::{BodyTrackingFeatures, ControlInputs, OptimizationLevel, SkeletonProfile};

use super::{FrameSource, SourceEvent, TrackingSource};

/// 記録ファイルの1行 (JSON Lines)
///
/// ```text
/// {"frame": {"frame_index": 1, "width": 640, "height": 480, "bodies": [...]}}
/// {"controls": {"optimization": {"slider": 7.0}}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayRecord {
    Frame(BodyFrame),
    Controls(ControlInputs),
}

/// 再生側で受け取ったトラッキング設定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedSettings {
    pub default_features: Option<BodyTrackingFeatures>,
    pub body_features: BTreeMap<BodyId, BodyTrackingFeatures>,
    pub profile: Option<SkeletonProfile>,
    pub optimization: Option<OptimizationLevel>,
}

/// 記録済みフレームを順に返すソース
pub struct ReplaySource {
    records: Vec<ReplayRecord>,
    cursor: usize,
    looping: bool,
    /// ループ1周ごとにフレーム番号へ足す量
    index_span: i64,
    index_offset: i64,
    applied: AppliedSettings,
}

impl ReplaySource {
    pub fn open<P: AsRef<Path>>(path: P, looping: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open replay file {}", path.display()))?;
        Self::from_reader(BufReader::new(file), looping)
            .with_context(|| format!("Failed to read replay file {}", path.display()))
    }

    pub fn from_reader<R: BufRead>(reader: R, looping: bool) -> Result<Self> {
        let mut records = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(&line)
                .with_context(|| format!("line {}: invalid record", n + 1))?;
            records.push(record);
        }
        Ok(Self::from_records(records, looping))
    }

    pub fn from_records(records: Vec<ReplayRecord>, looping: bool) -> Self {
        let indices = records.iter().filter_map(|r| match r {
            ReplayRecord::Frame(f) => Some(f.frame_index),
            ReplayRecord::Controls(_) => None,
        });
        let (min, max) = indices.fold((None, None), |(lo, hi): (Option<i64>, Option<i64>), i| {
            (
                Some(lo.map_or(i, |lo| lo.min(i))),
                Some(hi.map_or(i, |hi| hi.max(i))),
            )
        });
        let index_span = match (min, max) {
            (Some(lo), Some(hi)) => hi - lo + 1,
            _ => 0,
        };

        Self {
            records,
            cursor: 0,
            // フレームのない記録をループすると空回りする
            looping: looping && index_span > 0,
            index_span,
            index_offset: 0,
            applied: AppliedSettings::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn applied(&self) -> &AppliedSettings {
        &self.applied
    }
}

impl FrameSource for ReplaySource {
    fn poll_event(&mut self) -> Result<Option<SourceEvent>> {
        if self.cursor >= self.records.len() {
            if !self.looping {
                return Ok(Some(SourceEvent::Finished));
            }
            self.cursor = 0;
            self.index_offset += self.index_span;
        }

        let event = match &self.records[self.cursor] {
            ReplayRecord::Frame(frame) => {
                let mut frame = frame.clone();
                frame.frame_index += self.index_offset;
                SourceEvent::Frame(frame)
            }
            ReplayRecord::Controls(inputs) => SourceEvent::Controls(*inputs),
        };
        self.cursor += 1;
        Ok(Some(event))
    }
}

impl TrackingSource for ReplaySource {
    fn set_body_features(&mut self, body: BodyId, features: BodyTrackingFeatures) -> Result<()> {
        info!("[replay] {} features -> {:?}", body, features);
        self.applied.body_features.insert(body, features);
        Ok(())
    }

    fn set_default_body_features(&mut self, features: BodyTrackingFeatures) -> Result<()> {
        info!("[replay] default features -> {:?}", features);
        self.applied.default_features = Some(features);
        Ok(())
    }

    fn set_skeleton_profile(&mut self, profile: SkeletonProfile) -> Result<()> {
        info!("[replay] profile -> {:?}", profile);
        self.applied.profile = Some(profile);
        Ok(())
    }

    fn set_skeleton_optimization(&mut self, level: OptimizationLevel) -> Result<()> {
        info!("[replay] optimization -> {}", level);
        self.applied.optimization = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::OptimizationWidgets;
    use std::io::Cursor;

    const RECORDING: &str = r#"
{"frame": {"frame_index": 10, "width": 640, "height": 480, "bodies": []}}
{"controls": {"optimization": {"slider": 7.0}}}
{"frame": {"frame_index": 11, "width": 640, "height": 480, "bodies": [{"id": 1, "status": "Tracking", "joints": [{"joint_type": "Head", "status": "Tracked", "world_position": [0.0, 1600.0, 2000.0]}]}]}}
"#;

    fn frame_index(event: Option<SourceEvent>) -> i64 {
        match event {
            Some(SourceEvent::Frame(f)) => f.frame_index,
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn test_reads_frames_and_controls_in_order() {
        let mut source = ReplaySource::from_reader(Cursor::new(RECORDING), false).unwrap();
        assert_eq!(source.len(), 3);

        assert_eq!(frame_index(source.poll_event().unwrap()), 10);
        match source.poll_event().unwrap() {
            Some(SourceEvent::Controls(inputs)) => {
                assert_eq!(inputs.optimization.map(|w| w.slider), Some(7.0));
                assert!(inputs.features.is_none());
            }
            other => panic!("expected controls, got {:?}", other),
        }
        match source.poll_event().unwrap() {
            Some(SourceEvent::Frame(f)) => {
                assert_eq!(f.frame_index, 11);
                assert_eq!(f.bodies[0].id, BodyId(1));
                assert_eq!(f.bodies[0].joints[0].world_position, [0.0, 1600.0, 2000.0]);
            }
            other => panic!("expected frame, got {:?}", other),
        }
        assert_eq!(source.poll_event().unwrap(), Some(SourceEvent::Finished));
        assert_eq!(source.poll_event().unwrap(), Some(SourceEvent::Finished));
    }

    #[test]
    fn test_looping_offsets_frame_indices() {
        let mut source = ReplaySource::from_reader(Cursor::new(RECORDING), true).unwrap();
        let mut indices = Vec::new();
        for _ in 0..6 {
            if let Some(SourceEvent::Frame(f)) = source.poll_event().unwrap() {
                indices.push(f.frame_index);
            }
        }
        assert_eq!(indices, vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_looping_without_frames_finishes() {
        let records = vec![ReplayRecord::Controls(ControlInputs {
            optimization: Some(OptimizationWidgets::default()),
            ..ControlInputs::default()
        })];
        let mut source = ReplaySource::from_records(records, true);
        assert!(matches!(source.poll_event().unwrap(), Some(SourceEvent::Controls(_))));
        assert_eq!(source.poll_event().unwrap(), Some(SourceEvent::Finished));
    }

    #[test]
    fn test_invalid_line_reports_line_number() {
        let err = ReplaySource::from_reader(Cursor::new("{\"frame\": 3}\n"), false)
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn test_records_applied_settings() {
        let mut source = ReplaySource::from_records(Vec::new(), false);
        source.set_body_features(BodyId(2), BodyTrackingFeatures::Skeleton).unwrap();
        source.set_default_body_features(BodyTrackingFeatures::Skeleton).unwrap();
        source.set_skeleton_profile(SkeletonProfile::Basic).unwrap();
        source.set_skeleton_optimization(OptimizationLevel::BALANCED).unwrap();

        let applied = source.applied();
        assert_eq!(applied.body_features.get(&BodyId(2)), Some(&BodyTrackingFeatures::Skeleton));
        assert_eq!(applied.default_features, Some(BodyTrackingFeatures::Skeleton));
        assert_eq!(applied.profile, Some(SkeletonProfile::Basic));
        assert_eq!(applied.optimization, Some(OptimizationLevel::BALANCED));
    }
}
