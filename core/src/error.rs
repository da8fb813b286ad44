// accrete/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccreteError {
  #[error("Duplicate field '{field}' in schema '{schema}'")]
  DuplicateField { schema: String, field: String },

  #[error("Unknown field '{field}' on schema '{schema}'")]
  UnknownField { schema: String, field: String },

  #[error("Type mismatch for field '{field}' on schema '{schema}' (expected {expected}, got {actual})")]
  TypeMismatch {
    schema: String,
    field: String,
    expected: &'static str,
    actual: &'static str,
  },

  #[error("Field key '{field}' was minted by a different schema than '{schema}'")]
  ForeignKey { schema: String, field: String },

  #[error("Internal accrete error: {0}")]
  Internal(String),
}

pub type AccreteResult<T, E = AccreteError> = std::result::Result<T, E>;
