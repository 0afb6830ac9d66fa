//! Service-level error taxonomy.
//!
//! Expected command outcomes (bad code, already redeemed, ...) are plain
//! enum variants on the services that produce them, not errors. This type
//! covers the rest: caller mistakes worth a specific message, and faults
//! whose detail is logged server-side but never shown to end users.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad command input - message is safe to show.
    #[error("{0}")]
    Validation(String),
    /// Code creation requested with an expiry that is not in the future.
    #[error("expiry must be in the future")]
    InvalidExpiry,
    /// Every generation attempt collided with an existing code.
    #[error("failed to mint a unique code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
    /// Credit issued against a profile that was never materialized.
    /// Internal invariant violation - logged, not shown verbatim.
    #[error("no profile row for user {user_id}")]
    ProfileNotFound { user_id: i64 },
    /// Storage or transport fault - logged but reported generically.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl EngineError {
    /// Whether this is an internal fault that should be error-logged with
    /// full detail, as opposed to an expected validation outcome.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            EngineError::ProfileNotFound { .. } | EngineError::Backend(_)
        )
    }

    /// Text safe to put in a user-facing reply.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Validation(msg) => msg.clone(),
            EngineError::InvalidExpiry => "The expiry time has to be in the future.".to_string(),
            EngineError::CodeSpaceExhausted { .. } => {
                "Could not generate a fresh code. Ask a mod to purge old event codes.".to_string()
            }
            EngineError::ProfileNotFound { .. } | EngineError::Backend(_) => {
                "Something went wrong, please contact the mods.".to_string()
            }
        }
    }

    /// Log this error the way it deserves: faults at error level with full
    /// detail, expected outcomes at debug.
    pub fn report(&self) {
        if self.is_fault() {
            tracing::error!("engine fault: {:?}", self);
        } else {
            tracing::debug!("rejected request: {}", self);
        }
    }
}
