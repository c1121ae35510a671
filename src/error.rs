use crate::api::ApiError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, IdleError>;

#[derive(Error, Debug)]
pub enum IdleError {
    #[error("Group ID {0} not found in your list of visible groups")]
    GroupNotFound(String),

    #[error("GroupMe API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}
