//! Types that represent the core data model, such as `Transaction`, `Goal` and `Totals`.
mod amount;
mod feedback;
mod goal;
mod summary;
mod transaction;

pub use amount::{Amount, AmountError};
pub use feedback::{Feedback, Field};
pub use goal::{Goal, GoalStatus, GoalView};
use serde::{Deserialize, Serialize};
pub use summary::{Mood, MoodThresholds, Totals};
pub use transaction::{parse_date, Transaction, TransactionKind};

/// Everything stored for one user, e.g. for a backup.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerSnapshot {
    pub income: Vec<Transaction>,
    pub expenses: Vec<Transaction>,
    pub goals: Vec<Goal>,
}
