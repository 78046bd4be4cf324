use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid date bound '{0}': expected DD-Mon-YYYY or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("Unknown field mode '{0}'")]
    UnknownFieldMode(String),

    #[error("Failed to parse field schema document: {0}")]
    SchemaDocument(#[from] serde_json::Error),
}
