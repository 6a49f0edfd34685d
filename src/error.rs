use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Duplicate key on {field}: {value}")]
    DuplicateKey { field: &'static str, value: String },
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    InvalidAssetLink(String),
    #[error("{0}")]
    DuplicateMaterial(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MaterialError {
    pub fn status_code(&self) -> u16 {
        match self {
            MaterialError::ValidationFailed(_) | MaterialError::InvalidAssetLink(_) => 400,
            MaterialError::DuplicateMaterial(_) => 409,
            MaterialError::NotFound(_) => 404,
            MaterialError::Store(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, MaterialError>;
