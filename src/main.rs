use budget_pet::args::{Args, Command, GoalCommand};
use budget_pet::{commands, Config, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    let config = || Config::load(home);

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home)?.print(),
        Command::Signup(signup_args) => commands::signup(&config()?, signup_args)?.print(),
        Command::Login(login_args) => commands::login(&config()?, login_args)?.print(),
        Command::Logout => commands::logout(&config()?)?.print(),
        Command::Whoami => commands::whoami(&config()?)?.print(),
        Command::Add(add_args) => commands::add(&config()?, add_args)?.print(),
        Command::RemoveLast(remove_args) => commands::remove_last(&config()?, remove_args)?.print(),
        Command::Remove(remove_args) => commands::remove(&config()?, remove_args)?.print(),
        Command::List => commands::list(&config()?)?.print(),
        Command::Goal(goal_command) => match goal_command {
            GoalCommand::Add(goal_args) => commands::goal_add(&config()?, goal_args)?.print(),
            GoalCommand::Remove(goal_args) => commands::goal_remove(&config()?, goal_args)?.print(),
            GoalCommand::RemoveLast => commands::goal_remove_last(&config()?)?.print(),
            GoalCommand::Allocate(allocate_args) => {
                commands::goal_allocate(&config()?, allocate_args)?.print()
            }
        },
        Command::Goals => commands::goals(&config()?)?.print(),
        Command::Summary => commands::summary(&config()?)?.print(),
        Command::Backup => commands::backup(&config()?)?.print(),
        Command::Export(export_args) => commands::export(&config()?, export_args)?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            // The library and the binary share the crate name.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
