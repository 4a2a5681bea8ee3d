use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt user file: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("username already registered")]
    UsernameTaken,
    #[error("unknown username")]
    UnknownUser,
}

pub type RepoResult<T> = Result<T, RepoError>;
