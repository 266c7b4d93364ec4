use crate::model::{Amount, Field};
use crate::{BudgetError, BudgetResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether money came in or went out.
///
/// On the wire these are `income` and `expenses`, the names the browser client has always stored.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum TransactionKind {
    #[serde(rename = "income")]
    #[value(name = "income")]
    Income,
    #[serde(rename = "expenses", alias = "expense")]
    #[value(name = "expenses", alias = "expense")]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionKind);
serde_plain::derive_fromstr_from_deserialize!(TransactionKind);

impl TransactionKind {
    /// A plural noun for messages, e.g. "No expenses to remove."
    pub fn plural(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expenses",
        }
    }
}

/// A single income or expense entry. Immutable once created.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    /// Older snapshots carry no id and read as nil. `LedgerStore::load` assigns and stores one.
    #[serde(default)]
    id: Uuid,
    #[serde(rename = "type")]
    kind: TransactionKind,
    note: String,
    amount: Amount,
    date: NaiveDate,
    #[serde(default)]
    description: String,
}

impl Transaction {
    /// Creates a transaction after checking the same rules the entry form enforces: a note is
    /// required and the amount must be greater than zero.
    pub fn new(
        kind: TransactionKind,
        note: impl Into<String>,
        amount: Amount,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> BudgetResult<Self> {
        let note = note.into();
        if note.trim().is_empty() {
            return Err(BudgetError::validation(
                Field::TransactionNote,
                "A transaction note is required.",
            ));
        }
        if !amount.is_positive() {
            return Err(BudgetError::validation(
                Field::Amount,
                "The amount must be greater than zero.",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            note,
            amount,
            date,
            description: description.into(),
        })
    }

    /// The expense recorded when money is moved into a savings goal.
    pub(crate) fn goal_allocation(goal_name: &str, amount: Amount, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::Expense,
            note: format!("Goal: {goal_name}"),
            amount,
            date,
            description: "Allocated to goal".to_string(),
        }
    }

    /// Gives a transaction read without an id a fresh one. Returns whether it changed.
    pub(crate) fn ensure_id(&mut self) -> bool {
        if !self.id.is_nil() {
            return false;
        }
        self.id = Uuid::new_v4();
        true
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Parses a `YYYY-MM-DD` date from a form input.
pub fn parse_date(s: &str, field: Field) -> BudgetResult<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::validation(field, "A date is required."));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        BudgetError::validation(field, format!("'{trimmed}' is not a date (YYYY-MM-DD)."))
    })
}
