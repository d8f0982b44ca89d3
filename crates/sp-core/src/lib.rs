pub mod error;
pub mod factory;
pub mod id;
pub mod markup;
pub mod model;
pub mod rotation;

pub use error::{Error, Result};
pub use id::ObjectId;
pub use markup::strip_markup;
pub use model::*;
pub use rotation::{RotateDirection, Rotation};

// Re-export kurbo geometry so downstream crates don't need a direct dependency
pub use kurbo::{Point, Rect, Size};
