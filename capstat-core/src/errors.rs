use thiserror::Error;

/// Error produced when a single text line can not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Missing field `{0}`")]
    MissingField(&'static str),

    #[error("Field `{field}` is not a valid integer: {value}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("Field `{field}` is not a valid number: {value}")]
    InvalidFloat { field: &'static str, value: String },

    #[error("Invalid interval: start ({start}) must be smaller than end ({end})")]
    InvalidInterval { start: u64, end: u64 },
}
