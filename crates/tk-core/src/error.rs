use crate::id::ElementId;
use crate::model::ShapeKind;
use crate::scene::ReorderDirection;
use serde::Serialize;

/// Coarse classification of every editing failure, as reported to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidOperation,
    DegenerateGeometry,
    ResourceLoadFailure,
    UnknownIdReference,
}

/// Errors raised by scene mutations, attribute parsing, and resource loading.
/// A failed operation never leaves the scene partially modified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("cannot modify locked element {0}")]
    Locked(ElementId),

    #[error("element {0} is already at the {1} of the stack")]
    AtBoundary(ElementId, ReorderDirection),

    #[error("attribute `{key}` does not apply to {kind} elements")]
    InapplicableAttribute { key: &'static str, kind: ShapeKind },

    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("font `{name}` failed to load: {reason}")]
    FontLoad { name: String, reason: String },

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("no element with id `{0}`")]
    UnknownElement(String),
}

impl EditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Locked(_)
            | Self::AtBoundary(..)
            | Self::InapplicableAttribute { .. }
            | Self::UnknownAttribute(_)
            | Self::InvalidValue { .. } => ErrorKind::InvalidOperation,
            Self::DegenerateGeometry(_) => ErrorKind::DegenerateGeometry,
            Self::FontLoad { .. } | Self::ImageDecode(_) => ErrorKind::ResourceLoadFailure,
            Self::UnknownElement(_) => ErrorKind::UnknownIdReference,
        }
    }
}
