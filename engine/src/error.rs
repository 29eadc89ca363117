use thiserror::Error;

/// Everything that can go wrong between the remote API, the YAML parser and
/// the persisted collection. None of these are fatal to a session.
#[derive(Debug, Error)]
pub enum StatblockError {
    #[error("failed to fetch monster list: {0}")]
    DirectoryFetchFailed(String),

    #[error("failed to fetch monster data: {0}")]
    MonsterFetchFailed(String),

    #[error("could not find statblock content")]
    NoStatblockBlockFound,

    #[error("invalid YAML format: {0}")]
    InvalidFormat(String),

    #[error("persisted statblocks under '{key}' are unreadable: {reason}")]
    CorruptPersistedState { key: String, reason: String },

    #[error("no statblock at index {index} (collection holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<serde_yaml::Error> for StatblockError {
    fn from(e: serde_yaml::Error) -> Self {
        StatblockError::InvalidFormat(e.to_string())
    }
}
