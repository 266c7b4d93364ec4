//! Command handlers for the budget-pet CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod account;
mod goal;
mod init;
mod report;
mod transaction;

use crate::model::{Amount, Field};
use crate::{AccountDirectory, BudgetError, BudgetResult, Config, FileStore, LedgerStore, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::rc::Rc;
use std::str::FromStr;
use tracing::{debug, info};

pub use account::{login, logout, signup, whoami};
pub use goal::{goal_add, goal_allocate, goal_remove, goal_remove_last, goals};
pub use init::init;
pub use report::{backup, export, summary, Summary};
pub use transaction::{add, list, remove, remove_last, Listing};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

type Store = Rc<FileStore>;

/// Opens the account directory in the data directory, restoring any saved session.
fn open_accounts(config: &Config) -> Result<AccountDirectory<Store>> {
    let store = Rc::new(config.store()?);
    Ok(AccountDirectory::open(store)?.with_hash_iterations(config.hash_iterations()))
}

/// Opens the ledger of the logged-in user. Fails with `NoActiveSession` when nobody is logged in.
fn open_ledger(config: &Config) -> Result<LedgerStore<Store>> {
    let store = Rc::new(config.store()?);
    let accounts = AccountDirectory::open(Rc::clone(&store))?;
    let username = accounts.session().require_user()?;
    debug!("Opening the ledger of {username}");
    let ledger = LedgerStore::open(store, accounts.session())?.with_thresholds(config.thresholds());
    Ok(ledger)
}

/// Parses an amount typed by the user, flagging `field` when it is not a number.
fn parse_amount(s: &str, field: Field) -> BudgetResult<Amount> {
    Amount::from_str(s)
        .map_err(|_| BudgetError::validation(field, format!("'{}' is not a valid amount.", s.trim())))
}
