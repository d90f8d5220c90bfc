use model::entities::design_request::RequestStatus;
use thiserror::Error;

/// Error taxonomy for the lifecycle engine.
///
/// All variants are terminal per attempted operation; nothing is retried
/// automatically and the caller must resubmit with corrected input.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Role or ownership mismatch for the attempted operation
    #[error("operation not permitted for this actor")]
    Forbidden,

    /// The transition is not valid from the request's current status
    #[error("transition not valid from status {current:?}")]
    InvalidState { current: RequestStatus },

    /// An uploaded file exceeds the size ceiling
    #[error("uploaded file exceeds the {limit} byte ceiling")]
    PayloadTooLarge { limit: usize },

    /// Unknown id, or the request is outside the actor's visibility scope
    #[error("request not found")]
    NotFound,

    /// A required descriptive field is missing or malformed input
    #[error("validation failed: {0}")]
    Validation(String),

    /// Error from the persistence gateway
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Runtime error for unexpected situations (e.g. a corrupt stored hash)
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Type alias for Result with EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
