//! These structs provide the CLI interface for the budget-pet CLI.

use crate::model::TransactionKind;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use uuid::Uuid;

/// budget-pet: track income, expenses and savings goals, and keep your pet happy.
///
/// Sign up and log in first. Everything you record belongs to the logged-in user and is stored
/// under --home. Your pet's mood follows your balance and your progress towards your goals; see
/// it with `budget-pet summary`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and the default configuration. Run this first.
    Init,
    /// Create an account. The password is read from BUDGET_PET_PASSWORD and its confirmation
    /// from BUDGET_PET_CONFIRM_PASSWORD.
    Signup(SignupArgs),
    /// Log in with the password in BUDGET_PET_PASSWORD. The session is remembered until you log
    /// out.
    Login(LoginArgs),
    /// Log out.
    Logout,
    /// Show who is logged in.
    Whoami,
    /// Record income or an expense.
    Add(AddArgs),
    /// Remove the most recently recorded income or expense.
    RemoveLast(RemoveLastArgs),
    /// Remove a transaction by its id (see `list`).
    Remove(RemoveArgs),
    /// List transactions.
    List,
    /// Manage savings goals.
    #[command(subcommand)]
    Goal(GoalCommand),
    /// List savings goals with their progress.
    Goals,
    /// Show totals and your pet's mood.
    Summary,
    /// Save a backup of your ledger in the backups directory.
    Backup,
    /// Export your transactions as CSV.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where budget-pet data and configuration is held. Defaults to ~/budget-pet
    #[arg(long, env = "BUDGET_PET_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `budget-pet signup` command.
#[derive(Debug, Parser, Clone)]
pub struct SignupArgs {
    /// At least 3 characters.
    #[arg(long)]
    username: String,

    /// At least 8 characters. Prefer BUDGET_PET_PASSWORD: a flag shows up in the process list
    /// and in shell history.
    #[arg(long, env = "BUDGET_PET_PASSWORD", hide = true, hide_env_values = true)]
    password: String,

    /// Must match the password.
    #[arg(
        long,
        env = "BUDGET_PET_CONFIRM_PASSWORD",
        hide = true,
        hide_env_values = true
    )]
    confirm_password: String,
}

impl SignupArgs {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirm_password(&self) -> &str {
        &self.confirm_password
    }
}

/// Args for the `budget-pet login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    username: String,

    /// Prefer BUDGET_PET_PASSWORD: a flag shows up in the process list and in shell history.
    #[arg(long, env = "BUDGET_PET_PASSWORD", hide = true, hide_env_values = true)]
    password: String,
}

impl LoginArgs {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Args for the `budget-pet add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// "income" or "expenses".
    kind: TransactionKind,

    /// What the money was for, e.g. "Groceries".
    #[arg(long)]
    note: String,

    /// A positive amount, e.g. 42.50 or $1,200.
    #[arg(long)]
    amount: String,

    /// The date as YYYY-MM-DD.
    #[arg(long)]
    date: String,

    /// Any extra detail.
    #[arg(long, default_value = "")]
    description: String,
}

impl AddArgs {
    pub fn new(
        kind: TransactionKind,
        note: impl Into<String>,
        amount: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            note: note.into(),
            amount: amount.into(),
            date: date.into(),
            description: description.into(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Args for the `budget-pet remove-last` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveLastArgs {
    /// "income" or "expenses".
    kind: TransactionKind,
}

impl RemoveLastArgs {
    pub fn new(kind: TransactionKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }
}

/// Args for the `budget-pet remove` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveArgs {
    /// "income" or "expenses".
    kind: TransactionKind,

    /// The transaction id.
    id: Uuid,
}

impl RemoveArgs {
    pub fn new(kind: TransactionKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GoalCommand {
    /// Add a savings goal.
    Add(GoalAddArgs),
    /// Delete the goal with the given number. This cannot be undone.
    Remove(GoalRemoveArgs),
    /// Delete the most recently added goal.
    RemoveLast,
    /// Move money from your balance into a goal.
    Allocate(AllocateArgs),
}

/// Args for the `budget-pet goal add` command.
#[derive(Debug, Parser, Clone)]
pub struct GoalAddArgs {
    #[arg(long)]
    name: String,

    /// The amount to save, e.g. 500.
    #[arg(long)]
    target: String,

    /// The deadline as YYYY-MM-DD.
    #[arg(long)]
    deadline: String,
}

impl GoalAddArgs {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            deadline: deadline.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn deadline(&self) -> &str {
        &self.deadline
    }
}

/// Args for the `budget-pet goal remove` command.
#[derive(Debug, Parser, Clone)]
pub struct GoalRemoveArgs {
    /// The goal number shown by `budget-pet goals`.
    index: usize,

    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
}

impl GoalRemoveArgs {
    pub fn new(index: usize, yes: bool) -> Self {
        Self { index, yes }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `budget-pet goal allocate` command.
#[derive(Debug, Parser, Clone)]
pub struct AllocateArgs {
    /// The goal number shown by `budget-pet goals`.
    index: usize,

    /// The amount to move into the goal.
    amount: String,
}

impl AllocateArgs {
    pub fn new(index: usize, amount: impl Into<String>) -> Self {
        Self {
            index,
            amount: amount.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// Args for the `budget-pet export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The file to write. If not supplied, the CSV is written to stdout.
    #[arg(long = "file", short = 'f')]
    file: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("budget-pet"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or BUDGET_PET_HOME instead of relying on the default \
                directory. If you continue using the program right now, you may have problems!",
            );
            PathBuf::from("budget-pet")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_add() {
        let args = Args::parse_from([
            "budget-pet",
            "--home",
            "/tmp/pet",
            "add",
            "expenses",
            "--note",
            "Lunch",
            "--amount",
            "12.50",
            "--date",
            "2025-04-01",
        ]);
        assert_eq!(args.common().home().path(), Path::new("/tmp/pet"));
        let Command::Add(add) = args.command() else {
            panic!("expected the add command");
        };
        assert_eq!(add.kind(), TransactionKind::Expense);
        assert_eq!(add.amount(), "12.50");
        assert_eq!(add.description(), "");
    }

    #[test]
    fn test_parse_goal_allocate() {
        let args = Args::parse_from(["budget-pet", "goal", "allocate", "2", "40"]);
        let Command::Goal(GoalCommand::Allocate(a)) = args.command() else {
            panic!("expected goal allocate");
        };
        assert_eq!(a.index(), 2);
        assert_eq!(a.amount(), "40");
    }

    #[test]
    fn test_log_level() {
        let args = Args::parse_from(["budget-pet", "--log-level", "debug", "whoami"]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_passwords_stay_out_of_help() {
        let mut command = <Args as CommandFactory>::command();
        for name in ["signup", "login"] {
            let sub = command.find_subcommand_mut(name).unwrap();
            let password = sub
                .get_arguments()
                .find(|arg| arg.get_id() == "password")
                .unwrap();
            assert!(password.is_hide_set());
            let help = sub.render_long_help().to_string();
            assert!(!help.contains("--password"), "{help}");
            assert!(help.contains("BUDGET_PET_PASSWORD"), "{help}");
        }
    }

    #[test]
    fn test_password_flags_still_parse() {
        let args = Args::parse_from([
            "budget-pet",
            "signup",
            "--username",
            "sam",
            "--password",
            "password1",
            "--confirm-password",
            "password1",
        ]);
        let Command::Signup(signup) = args.command() else {
            panic!("expected signup");
        };
        assert_eq!(signup.confirm_password(), "password1");
    }
}
