use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SyntheseError {
    #[error("audit {id} introuvable")]
    AuditNotFound { id: String },
    #[error("projet {id} introuvable")]
    ProjetNotFound { id: String },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type SyntheseResult<T> = std::result::Result<T, SyntheseError>;
