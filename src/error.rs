use std::fmt;
use std::io;

/// Failure while reading or writing a storage slot.
#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Encode(serde_json::Error),
    LockPoisoned(&'static str),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "storage io error: {}", err),
            StorageError::Encode(err) => write!(f, "snapshot encode error: {}", err),
            StorageError::LockPoisoned(operation) => {
                write!(f, "storage lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::Encode(err) => Some(err),
            StorageError::LockPoisoned(_) => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Encode(err)
    }
}
