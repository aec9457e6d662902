use thiserror::Error;

/// Failures surfaced by activation, revert, and sweep passes.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("offer {0} not found")]
    OfferNotFound(i64),

    /// The offer is not in a status the requested operation can start from.
    /// Also raised when a concurrent caller claims the transition first.
    #[error("offer {id} is not in status '{expected}'")]
    InvalidTransition { id: i64, expected: &'static str },

    #[error(transparent)]
    Db(#[from] offerkit_db::DbError),
}
