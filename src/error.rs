use crate::input::InputKind;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error("Invalid target kind: {target:?} cannot be driven by a {physical:?} input")]
    InvalidKind {
        physical: InputKind,
        target: InputKind,
    },

    #[error("Malformed remap rule: {0}")]
    MalformedRule(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for RemapError {
    fn from(err: quick_xml::Error) -> Self {
        RemapError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for RemapError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        RemapError::Xml(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for RemapError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        RemapError::Xml(err.to_string())
    }
}

// Host UI bridges forward errors as plain strings
impl Serialize for RemapError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RemapError>;
