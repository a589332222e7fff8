pub mod body;
pub mod config;
pub mod controls;
pub mod logging;
pub mod protocol;
pub mod render;
pub mod skeleton;
pub mod source;
pub mod telemetry;
