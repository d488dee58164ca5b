use crate::page::PageId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Page not found: {0}")]
    PageNotFound(PageId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Workspace is read-only for this identity")]
    ReadOnly,

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, FolioError>;
