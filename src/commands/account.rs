//! Account command handlers: signup, login, logout and whoami.

use crate::args::{LoginArgs, SignupArgs};
use crate::commands::{open_accounts, Out};
use crate::{Config, Result};

/// Creates an account. Does not log the new user in.
///
/// # Errors
/// - Returns the first failing signup rule, e.g. a short username or mismatched passwords.
/// - Returns an error if the data directory cannot be written.
pub fn signup(config: &Config, args: &SignupArgs) -> Result<Out<()>> {
    let accounts = open_accounts(config)?;
    let message = accounts.signup(args.username(), args.password(), args.confirm_password())?;
    Ok(message.into())
}

/// Logs in and remembers the session until `logout`.
pub fn login(config: &Config, args: &LoginArgs) -> Result<Out<()>> {
    let mut accounts = open_accounts(config)?;
    let message = accounts.login(args.username(), args.password())?;
    Ok(message.into())
}

pub fn logout(config: &Config) -> Result<Out<()>> {
    let mut accounts = open_accounts(config)?;
    let message = match accounts.current_user() {
        Some(username) => format!("Goodbye, {username}!"),
        None => "Nobody was logged in.".to_string(),
    };
    accounts.logout()?;
    Ok(message.into())
}

/// Reports the logged-in user, if any.
pub fn whoami(config: &Config) -> Result<Out<Option<String>>> {
    let accounts = open_accounts(config)?;
    let user = accounts.current_user().map(str::to_string);
    let message = match &user {
        Some(username) => format!("Logged in as {username}"),
        None => "Nobody is logged in".to_string(),
    };
    Ok(Out::new(message, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;
    use crate::test::{TestEnv, PASSWORD};
    use crate::BudgetError;

    #[test]
    fn test_signup_login_logout() {
        let env = TestEnv::new();
        let config = env.config();

        let out = signup(config, &SignupArgs::new("sam", PASSWORD, PASSWORD)).unwrap();
        assert_eq!(
            out.message(),
            "Account created successfully! You can now log in."
        );
        assert_eq!(whoami(config).unwrap().structure(), Some(&None));

        let out = login(config, &LoginArgs::new("sam", PASSWORD)).unwrap();
        assert_eq!(out.message(), "Welcome back, sam!");
        let out = whoami(config).unwrap();
        assert_eq!(out.structure(), Some(&Some("sam".to_string())));

        assert_eq!(logout(config).unwrap().message(), "Goodbye, sam!");
        assert_eq!(whoami(config).unwrap().message(), "Nobody is logged in");
    }

    #[test]
    fn test_signup_rejects_short_username() {
        let env = TestEnv::new();
        let err = signup(env.config(), &SignupArgs::new("ab", PASSWORD, PASSWORD)).unwrap_err();
        let budget_error = err.downcast_ref::<BudgetError>().unwrap();
        assert_eq!(budget_error.field(), Some(Field::SignupUsername));
    }

    #[test]
    fn test_login_wrong_password() {
        let env = TestEnv::new();
        signup(env.config(), &SignupArgs::new("sam", PASSWORD, PASSWORD)).unwrap();
        let err = login(env.config(), &LoginArgs::new("sam", "wrong password")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password.");
        assert!(whoami(env.config()).unwrap().structure() == Some(&None));
    }
}
