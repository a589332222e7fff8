pub mod frame;
pub mod joint;

pub use frame::{Body, BodyFrame, BodyId, BodyStatus};
pub use joint::{Joint, JointStatus, JointType, Orientation};
