//! Data validation errors

use thiserror::Error;

/// A problem with one entry of a component list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Null actor class at index {0} in component list")]
    NullActorClass(usize),

    #[error("Null component class at index {0} in component list")]
    NullComponentClass(usize),

    #[error("Entry at index {0} targets neither clients nor servers")]
    NoTarget(usize),

    #[error("Invalid component list: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
