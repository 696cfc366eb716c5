use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A required field is missing from the whole collection, or the input is
    /// not a collection of records at all.
    #[error("schema violation on `{field}`: {detail}")]
    SchemaViolation { field: String, detail: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("log setup error: {0}")]
    LogSetup(String),
}

impl ReportError {
    pub fn schema(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            detail: detail.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation { .. })
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
