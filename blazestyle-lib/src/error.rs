//! Error types for the style-property model.

use thiserror::Error;

/// Errors surfaced by the property model and its collaborators.
///
/// Missing style data is never an error: parsers return `None` for "no value".
#[derive(Debug, Error)]
pub enum Error {
    #[error("CSS parsing error: {0}")]
    CssParse(String),

    #[error("custom fromStyle of `{property}` failed: {source}")]
    FromStyle {
        property: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("custom toStyle of `{property}` failed: {source}")]
    ToStyle {
        property: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("fromStyle of `{property}` returned unknown sub-property `{key}`")]
    UnexpectedShape { property: String, key: String },

    #[error("layer {index} is out of range for `{property}` ({len} layers)")]
    LayerOutOfRange {
        property: String,
        index: usize,
        len: usize,
    },

    #[error("`{0}` is not a stack property")]
    NotAStack(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Unknown sector: {0}")]
    UnknownSector(String),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("no style target is selected")]
    NoTarget,

    #[error("Invalid property configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
