//! budget-pet: a personal budgeting ledger with savings goals and a pet whose mood follows your
//! financial health.
//!
//! The library is built from two stateful components over a pluggable [`KeyValueStore`]:
//! [`AccountDirectory`] for signup, login and the [`Session`], and [`LedgerStore`] for one user's
//! income, expenses and goals. Totals and the pet [`Mood`](model::Mood) are pure functions of the
//! ledger.

mod account;
pub mod args;
mod backup;
pub mod commands;
mod config;
mod credential;
mod error;
pub mod export;
mod ledger;
pub mod model;
mod session;
pub mod store;
mod utils;


pub use account::{AccountDirectory, UserRecord};
pub use backup::Backup;
pub use config::Config;
pub use credential::{Credential, DEFAULT_HASH_ITERATIONS};
pub use error::{BudgetError, BudgetResult, Error, Result};
pub use ledger::{Allocation, LedgerStore};
pub use session::Session;
pub use store::{FileStore, KeyValueStore, MemoryStore};
