#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("undecodable record: {0}")]
    Decode(#[source] serde_json::Error),
}

impl RecordError {
    pub fn reason(&self) -> &'static str {
        match self {
            RecordError::MissingField(_) => "missing_field",
            RecordError::InvalidTimestamp(_) => "invalid_timestamp",
            RecordError::Decode(_) => "decode",
        }
    }
}
