//! The income, expense and goal lists of the logged-in user, and everything derived from them.

use crate::model::{
    Amount, Field, Goal, GoalView, LedgerSnapshot, Mood, MoodThresholds, Totals, Transaction,
    TransactionKind,
};
use crate::store::{keys, load_json, save_json, KeyValueStore};
use crate::{BudgetError, BudgetResult, Session};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const INSUFFICIENT_BALANCE: &str = "Invalid amount or not enough balance.";

/// The outcome of a successful allocation to a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub goal_index: usize,
    pub goal_name: String,
    pub amount: Amount,
    /// The id of the expense that records the allocation.
    pub expense_id: Uuid,
    pub message: String,
}

/// Owns one user's lists for the duration of a session.
///
/// Every mutation is written through to the store before it returns. When no user is logged in
/// the ledger still works, but only in memory: nothing is read or written.
#[derive(Debug)]
pub struct LedgerStore<S> {
    store: S,
    owner: Option<String>,
    income: Vec<Transaction>,
    expenses: Vec<Transaction>,
    goals: Vec<Goal>,
    thresholds: MoodThresholds,
}

impl<S> LedgerStore<S>
where
    S: KeyValueStore,
{
    /// An empty ledger that belongs to nobody until `load` is called.
    pub fn new(store: S) -> Self {
        Self {
            store,
            owner: None,
            income: Vec::new(),
            expenses: Vec::new(),
            goals: Vec::new(),
            thresholds: MoodThresholds::default(),
        }
    }

    /// Creates a ledger and loads the lists of the session's user.
    pub fn open(store: S, session: &Session) -> BudgetResult<Self> {
        let mut ledger = Self::new(store);
        ledger.load(session)?;
        Ok(ledger)
    }

    pub fn with_thresholds(mut self, thresholds: MoodThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replaces the in-memory lists with those stored for the session's user. Lists that were
    /// never stored are empty. Without a logged-in user all lists are empty and nothing will be
    /// persisted.
    ///
    /// Transactions stored without an id are given one, and the lists are written back so that
    /// the ids stay the same from one load to the next.
    pub fn load(&mut self, session: &Session) -> BudgetResult<()> {
        let Some(username) = session.user() else {
            warn!("No current user found, the ledger will not be saved. Please log in.");
            self.owner = None;
            self.income.clear();
            self.expenses.clear();
            self.goals.clear();
            return Ok(());
        };

        let mut income: Vec<Transaction> =
            load_json(&self.store, &keys::income(username))?.unwrap_or_default();
        let mut expenses: Vec<Transaction> =
            load_json(&self.store, &keys::expenses(username))?.unwrap_or_default();
        let goals: Vec<Goal> = load_json(&self.store, &keys::goals(username))?.unwrap_or_default();

        let assigned = income
            .iter_mut()
            .chain(expenses.iter_mut())
            .map(Transaction::ensure_id)
            .filter(|changed| *changed)
            .count();

        self.owner = Some(username.to_string());
        self.income = income;
        self.expenses = expenses;
        self.goals = goals;
        debug!(
            "Loaded {} income, {} expenses and {} goals for {username}",
            self.income.len(),
            self.expenses.len(),
            self.goals.len()
        );
        if assigned > 0 {
            info!("Assigned ids to {assigned} stored transactions");
            self.save_transactions()?;
        }
        Ok(())
    }

    /// The user whose lists are loaded, `None` for an in-memory ledger.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn income(&self) -> &[Transaction] {
        &self.income
    }

    pub fn expenses(&self) -> &[Transaction] {
        &self.expenses
    }

    pub fn transactions(&self, kind: TransactionKind) -> &[Transaction] {
        match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expenses,
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Appends a transaction to the list for `kind`.
    ///
    /// An amount that would take the total of its list past what can be represented is rejected
    /// like any other invalid amount.
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        note: &str,
        amount: Amount,
        date: NaiveDate,
        description: &str,
    ) -> BudgetResult<&Transaction> {
        let transaction = Transaction::new(kind, note, amount, date, description)?;
        ensure_room(
            self.transactions(kind).iter().map(Transaction::amount),
            amount,
            Field::Amount,
        )?;

        let before = self.snapshot();
        self.list_mut(kind).push(transaction);
        self.save_or_restore(before)?;
        let added = self.last(kind);
        info!("Transaction added: {kind} - {} - {}", added.note(), added.amount());
        Ok(added)
    }

    /// Removes the most recently added transaction of `kind`.
    pub fn remove_last_transaction(&mut self, kind: TransactionKind) -> BudgetResult<Transaction> {
        let before = self.snapshot();
        let Some(removed) = self.list_mut(kind).pop() else {
            warn!("Cannot remove a transaction, the {} list is empty", kind.plural());
            return Err(BudgetError::state(format!("No {} to remove.", kind.plural())));
        };
        self.save_or_restore(before)?;
        info!("Removed {kind} transaction {}", removed.note());
        Ok(removed)
    }

    /// Removes the transaction of `kind` with the given id.
    pub fn remove_transaction(&mut self, kind: TransactionKind, id: Uuid) -> BudgetResult<Transaction> {
        let before = self.snapshot();
        let list = self.list_mut(kind);
        let Some(position) = list.iter().position(|t| t.id() == id) else {
            return Err(BudgetError::state(format!("No {kind} transaction has the id {id}.")));
        };
        let removed = list.remove(position);
        self.save_or_restore(before)?;
        info!("Removed {kind} transaction {}", removed.note());
        Ok(removed)
    }

    /// Appends a goal. Its progress starts at zero whatever it was before.
    pub fn add_goal(&mut self, mut goal: Goal) -> BudgetResult<&Goal> {
        ensure_room(
            self.goals.iter().map(Goal::target_amount),
            goal.target_amount(),
            Field::TargetAmount,
        )?;
        goal.reset_progress();

        let before = self.snapshot();
        self.goals.push(goal);
        self.save_or_restore(before)?;
        let index = self.goals.len() - 1;
        let added = &self.goals[index];
        info!("Added goal {} ({})", added.name(), added.target_amount());
        Ok(added)
    }

    /// Removes the goal at `index`. Callers are expected to confirm with the user first.
    pub fn remove_goal(&mut self, index: usize) -> BudgetResult<Goal> {
        if index >= self.goals.len() {
            return Err(no_goal_at(index));
        }
        let before = self.snapshot();
        let removed = self.goals.remove(index);
        self.save_or_restore(before)?;
        info!("Removed goal {}", removed.name());
        Ok(removed)
    }

    /// Removes the most recently added goal.
    pub fn remove_last_goal(&mut self) -> BudgetResult<Goal> {
        let before = self.snapshot();
        let Some(removed) = self.goals.pop() else {
            return Err(BudgetError::state("No goals to remove."));
        };
        self.save_or_restore(before)?;
        info!("Removed goal {}", removed.name());
        Ok(removed)
    }

    /// Moves `amount` of the balance into the goal at `goal_index`, dated today (UTC).
    pub fn allocate_to_goal(&mut self, goal_index: usize, amount: Amount) -> BudgetResult<Allocation> {
        self.allocate_to_goal_on(goal_index, amount, Utc::now().date_naive())
    }

    /// Moves `amount` of the balance into the goal at `goal_index`.
    ///
    /// The amount must be positive, no more than the current balance, and must not take the
    /// goal's progress past its target. On success the goal's progress grows by `amount` and an
    /// expense of `amount` dated `date` is recorded, so the balance shrinks by the same amount.
    /// Either both changes are stored or neither is.
    pub fn allocate_to_goal_on(
        &mut self,
        goal_index: usize,
        amount: Amount,
        date: NaiveDate,
    ) -> BudgetResult<Allocation> {
        let balance = self.totals().balance;
        let Some(goal) = self.goals.get(goal_index) else {
            return Err(no_goal_at(goal_index));
        };
        if !amount.is_positive() || amount > balance {
            warn!("Refusing to allocate {amount} with a balance of {balance}");
            return Err(BudgetError::state(INSUFFICIENT_BALANCE));
        }
        if amount > goal.remaining() {
            return Err(BudgetError::state(format!(
                "Allocating {amount} exceeds the goal amount of {}. Please enter a smaller amount.",
                goal.target_amount()
            )));
        }
        let goal_name = goal.name().to_string();
        ensure_room(
            self.expenses.iter().map(Transaction::amount),
            amount,
            Field::DistributionAmount,
        )?;

        let before = self.snapshot();
        let expense = Transaction::goal_allocation(&goal_name, amount, date);
        let expense_id = expense.id();
        self.expenses.push(expense);
        self.goals[goal_index].add_progress(amount);
        self.save_or_restore(before)?;

        let message = format!("Added {amount} to \"{goal_name}\"!");
        info!("{message}");
        Ok(Allocation {
            goal_index,
            goal_name,
            amount,
            expense_id,
            message,
        })
    }

    pub fn totals(&self) -> Totals {
        Totals::compute(&self.income, &self.expenses, &self.goals)
    }

    pub fn mood(&self) -> Mood {
        self.totals().mood(&self.thresholds)
    }

    /// Every goal with its percent and status, in list order.
    pub fn goal_views(&self) -> Vec<GoalView> {
        self.views(|_| true)
    }

    /// Goals that can still receive allocations.
    pub fn open_goals(&self) -> Vec<GoalView> {
        self.views(|goal| !goal.is_complete())
    }

    /// Goals whose progress has reached their target.
    pub fn completed_goals(&self) -> Vec<GoalView> {
        self.views(Goal::is_complete)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            income: self.income.clone(),
            expenses: self.expenses.clone(),
            goals: self.goals.clone(),
        }
    }

    fn views(&self, keep: impl Fn(&Goal) -> bool) -> Vec<GoalView> {
        self.goals
            .iter()
            .enumerate()
            .filter(|(_, goal)| keep(*goal))
            .map(|(index, goal)| GoalView::new(index, goal))
            .collect()
    }

    fn list_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Income => &mut self.income,
            TransactionKind::Expense => &mut self.expenses,
        }
    }

    fn last(&self, kind: TransactionKind) -> &Transaction {
        let list = self.transactions(kind);
        &list[list.len() - 1]
    }

    /// Writes every list. If a write fails, the lists go back to `before` in memory and, as far
    /// as the store allows, on disk.
    fn save_or_restore(&mut self, before: LedgerSnapshot) -> BudgetResult<()> {
        let Err(e) = self.save_all() else {
            return Ok(());
        };
        warn!("Unable to save the ledger, undoing the change: {e}");
        self.income = before.income;
        self.expenses = before.expenses;
        self.goals = before.goals;
        if let Err(restore_error) = self.save_all() {
            error!("Unable to restore the stored ledger: {restore_error}");
        }
        Err(e)
    }

    /// Expenses first, so a stored goal allocation always has its expense.
    fn save_all(&self) -> BudgetResult<()> {
        self.save_transactions()?;
        self.save_goals()
    }

    fn save_transactions(&self) -> BudgetResult<()> {
        let Some(username) = self.owner() else {
            debug!("No current user, transactions are kept in memory only");
            return Ok(());
        };
        save_json(&self.store, &keys::expenses(username), &self.expenses)?;
        save_json(&self.store, &keys::income(username), &self.income)?;
        debug!("Transactions saved for user: {username}");
        Ok(())
    }

    fn save_goals(&self) -> BudgetResult<()> {
        let Some(username) = self.owner() else {
            debug!("No current user, goals are kept in memory only");
            return Ok(());
        };
        save_json(&self.store, &keys::goals(username), &self.goals)?;
        debug!("Goals saved for user: {username}");
        Ok(())
    }
}

/// Fails when `amount` cannot be added to the sum of `existing`.
fn ensure_room(
    existing: impl Iterator<Item = Amount>,
    amount: Amount,
    field: Field,
) -> BudgetResult<()> {
    let amounts: Vec<Amount> = existing.chain(std::iter::once(amount)).collect();
    if Amount::checked_sum(&amounts).is_none() {
        warn!("Refusing {amount}, the total would overflow");
        return Err(BudgetError::validation(field, "The amount is too large."));
    }
    Ok(())
}

fn no_goal_at(index: usize) -> BudgetError {
    BudgetError::state(format!("There is no goal number {index}."))
}
