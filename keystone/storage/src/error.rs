use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage engine unavailable: {0}")]
    Unavailable(String),
    #[error("corrupted data: {0}")]
    Corrupted(String),
}
