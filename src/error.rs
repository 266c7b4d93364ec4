use crate::model::Field;
use thiserror::Error;

/// Infrastructure errors: config files, the data directory, backups and the CLI.
pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Result type used by the account and ledger operations.
pub type BudgetResult<T> = std::result::Result<T, BudgetError>;

/// A failure of an account or ledger operation.
///
/// Every variant except `Storage` is recoverable and meant to be shown to the user as-is. The
/// `Display` text of `Validation` and `State` is the user-facing message.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Malformed or out-of-range input. Tagged with the input to flag.
    #[error("{message}")]
    Validation { field: Field, message: String },

    /// The operation is impossible given the current state, e.g. removing from an empty list.
    #[error("{0}")]
    State(String),

    /// The operation needs a logged-in user.
    #[error("No user is logged in. Please log in.")]
    NoActiveSession,

    /// The backing key-value store failed or returned data that could not be parsed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl BudgetError {
    pub fn validation(field: Field, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// The input the UI should flag, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            BudgetError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BudgetError::Validation { .. })
    }

    pub fn is_state(&self) -> bool {
        matches!(self, BudgetError::State(_))
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(e: serde_json::Error) -> Self {
        BudgetError::Storage(e.into())
    }
}
