pub mod keys;
pub mod skeleton;
#[cfg(feature = "viewer")]
pub mod window;

pub use keys::ControlKey;
pub use skeleton::ViewProjection;
#[cfg(feature = "viewer")]
pub use window::MinifbRenderer;
