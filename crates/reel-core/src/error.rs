use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("media source URL is empty")]
    EmptySource,
}

pub type CoreResult<T> = Result<T, CoreError>;
