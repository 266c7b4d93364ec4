use crate::BudgetError;
use serde::{Deserialize, Serialize};

/// Identifies the input a failed operation should visually flag.
///
/// The wire names match the form field ids used by the web front end.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    SignupUsername,
    SignupPassword,
    SignupConfirmPassword,
    LoginUsername,
    LoginPassword,
    /// Used for a failed login regardless of which input was wrong.
    LoginCredentials,
    TransactionNote,
    Amount,
    Date,
    GoalName,
    TargetAmount,
    Deadline,
    DistributionAmount,
}

serde_plain::derive_display_from_serialize!(Field);
serde_plain::derive_fromstr_from_deserialize!(Field);

/// The result shape handed to a UI layer: `{ success, message, field? }`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

impl Feedback {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            field: None,
        }
    }

    pub fn failed(error: &BudgetError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            field: error.field(),
        }
    }
}

impl<S> From<Result<S, BudgetError>> for Feedback
where
    S: Into<String>,
{
    fn from(value: Result<S, BudgetError>) -> Self {
        match value {
            Ok(message) => Feedback::ok(message),
            Err(e) => Feedback::failed(&e),
        }
    }
}
