//! Totals over a user's ledger and the pet mood derived from them.

use crate::model::{Amount, Goal, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sums over the current income, expense and goal lists. Always recomputed, never cached.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub total_income: Amount,
    pub total_expenses: Amount,
    /// `total_income - total_expenses`. Allocations to goals are expenses, so they reduce it.
    pub balance: Amount,
    pub total_goal_target: Amount,
    pub total_goal_progress: Amount,
}

impl Totals {
    pub fn compute(income: &[Transaction], expenses: &[Transaction], goals: &[Goal]) -> Self {
        let total_income: Amount = income.iter().map(Transaction::amount).sum();
        let total_expenses: Amount = expenses.iter().map(Transaction::amount).sum();
        Self {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
            total_goal_target: goals.iter().map(Goal::target_amount).sum(),
            total_goal_progress: goals.iter().map(Goal::progress).sum(),
        }
    }

    /// Classifies the totals. The first matching rule wins:
    ///
    /// 1. a negative balance is `Critical`
    /// 2. progress at or above the combined goal target is `GoalComplete`
    /// 3. progress at or above `good_progress_ratio` of the target is `GoodProgress`
    /// 4. a balance under `low_balance_ratio` of income is `LowBalance`
    /// 5. otherwise `Neutral`
    ///
    /// With no goals, both target and progress are zero, so rule 2 matches.
    pub fn mood(&self, thresholds: &MoodThresholds) -> Mood {
        if self.balance.is_negative() {
            Mood::Critical
        } else if self.total_goal_progress >= self.total_goal_target {
            Mood::GoalComplete
        } else if self.total_goal_progress >= self.total_goal_target * thresholds.good_progress_ratio
        {
            Mood::GoodProgress
        } else if self.balance < self.total_income * thresholds.low_balance_ratio {
            Mood::LowBalance
        } else {
            Mood::Neutral
        }
    }
}

/// The ratios used by [`Totals::mood`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct MoodThresholds {
    /// A balance below this share of total income is low. Defaults to 0.2.
    pub low_balance_ratio: Decimal,
    /// Goal progress at or above this share of the total target is good. Defaults to 0.5.
    pub good_progress_ratio: Decimal,
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self {
            low_balance_ratio: Decimal::new(2, 1),
            good_progress_ratio: Decimal::new(5, 1),
        }
    }
}

/// The pet's mood.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// In debt.
    Critical,
    GoalComplete,
    GoodProgress,
    LowBalance,
    Neutral,
}

serde_plain::derive_display_from_serialize!(Mood);

impl Mood {
    /// The image the web front end shows for this mood.
    pub fn image(&self) -> &'static str {
        match self {
            Mood::Critical => "images/petDestroyed.PNG",
            Mood::GoalComplete => "images/petBlank.PNG",
            Mood::GoodProgress => "images/petHappy.PNG",
            Mood::LowBalance => "images/petWary.PNG",
            Mood::Neutral => "images/petNeutral.PNG",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Mood::Critical => "Your pet is miserable: you are spending more than you earn.",
            Mood::GoalComplete => "Your pet is content: every savings goal is funded.",
            Mood::GoodProgress => "Your pet is happy: you are over halfway to your goals.",
            Mood::LowBalance => "Your pet is wary: your balance is running low.",
            Mood::Neutral => "Your pet is doing fine.",
        }
    }
}
