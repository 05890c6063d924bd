use thiserror::Error;

use crate::store::StoreError;
use crate::synthese::SyntheseError;

#[derive(Debug, Error)]
pub enum PasError {
    #[error(transparent)]
    Synthese(#[from] SyntheseError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type PasResult<T> = std::result::Result<T, PasError>;
