use thiserror::Error;

use super::entities::WatchId;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WatchError {
    #[error("No such watch: {0}")]
    NoSuchWatch(WatchId),
}
