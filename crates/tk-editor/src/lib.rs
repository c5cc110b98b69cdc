pub mod fonts;
pub mod gesture;
pub mod input;
pub mod metrics;
pub mod picture;
pub mod projection;
pub mod session;
pub mod shortcuts;
pub mod templates;
pub mod transform;

pub use metrics::{ApproxMeasure, FontQuery, MeasureError, TextExtent, TextMeasure};
pub use session::{Applied, Change, DeleteRequest, Intent, Session};
pub use transform::TransformEngine;
