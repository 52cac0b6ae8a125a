pub mod aspect_ratio;
pub mod video;

pub use aspect_ratio::AspectRatio;
pub use video::{CreateVideoParams, ObjectReference, Video};
