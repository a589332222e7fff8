use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mapper: MapperConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapperConfig {
    /// このフレーム数連続で見えない人物を破棄 (0 = 破棄しない)
    #[serde(default = "default_evict_after_frames")]
    pub evict_after_frames: u32,
    /// 関節ルートの位置（メートル）
    #[serde(default)]
    pub root_position: [f32; 3],
    /// 関節ルートのスケール
    #[serde(default = "default_root_scale")]
    pub root_scale: f32,
}

fn default_evict_after_frames() -> u32 { 30 }
fn default_root_scale() -> f32 { 1.0 }

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            evict_after_frames: default_evict_after_frames(),
            root_position: [0.0; 3],
            root_scale: default_root_scale(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// 記録済みフレームの再生
    Replay,
    /// TCPブリッジ経由のライブフレーム
    Bridge,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    #[serde(default = "default_replay_path")]
    pub replay_path: String,
    /// 末尾まで再生したら先頭に戻る
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "default_bridge_addr")]
    pub bridge_addr: String,
}

fn default_source_kind() -> SourceKind { SourceKind::Replay }
fn default_replay_path() -> String { "recordings/session.jsonl".to_string() }
fn default_bridge_addr() -> String { "127.0.0.1:39600".to_string() }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            replay_path: default_replay_path(),
            looping: false,
            bridge_addr: default_bridge_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// 新しい人物を検出したときに GET する URL (http / https)。未設定なら無効
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_telemetry_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_telemetry_timeout_ms() -> u64 { 5000 }

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_telemetry_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

fn default_target_fps() -> u32 { 30 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// デバッグウィンドウを表示
    #[serde(default)]
    pub view: bool,
    #[serde(default = "default_view_width")]
    pub view_width: usize,
    #[serde(default = "default_view_height")]
    pub view_height: usize,
    /// 1メートルあたりのピクセル数
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f32,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_view_width() -> usize { 960 }
fn default_view_height() -> usize { 720 }
fn default_pixels_per_meter() -> f32 { 300.0 }
fn default_log_dir() -> String { "logs".to_string() }

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            view: false,
            view_width: default_view_width(),
            view_height: default_view_height(),
            pixels_per_meter: default_pixels_per_meter(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        Ok(config)
    }

    /// 読み込めなければデフォルト設定
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.mapper.evict_after_frames, 30);
        assert_eq!(config.mapper.root_scale, 1.0);
        assert_eq!(config.source.kind, SourceKind::Replay);
        assert_eq!(config.source.bridge_addr, "127.0.0.1:39600");
        assert!(config.telemetry.endpoint.is_none());
        assert_eq!(config.app.target_fps, 30);
        assert!(!config.debug.view);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [mapper]
            evict_after_frames = 0
            root_position = [0.0, 1.0, 0.0]

            [source]
            kind = "bridge"

            [telemetry]
            endpoint = "http://127.0.0.1:8080/ping"
            "#,
        )
        .unwrap();
        assert_eq!(config.mapper.evict_after_frames, 0);
        assert_eq!(config.mapper.root_position, [0.0, 1.0, 0.0]);
        assert_eq!(config.mapper.root_scale, 1.0);
        assert_eq!(config.source.kind, SourceKind::Bridge);
        assert_eq!(config.source.replay_path, "recordings/session.jsonl");
        assert_eq!(config.telemetry.endpoint.as_deref(), Some("http://127.0.0.1:8080/ping"));
        assert_eq!(config.telemetry.timeout_ms, 5000);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(Config::parse("[source]\nkind = \"camera\"").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.app.target_fps, 30);
    }
}
