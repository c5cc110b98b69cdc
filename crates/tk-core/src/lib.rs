pub mod attr;
pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod scene;
pub mod selection;

pub use attr::Attribute;
pub use config::{ConfigError, EditorConfig, Limits, TextResizeMode};
pub use error::{EditError, ErrorKind};
pub use id::ElementId;
pub use model::*;
pub use scene::{ReorderDirection, SceneSnapshot, SceneStore};
pub use selection::Selection;
