//! Signup, login and the logged-in session.

use crate::credential::{Credential, DEFAULT_HASH_ITERATIONS};
use crate::model::Field;
use crate::store::{keys, load_json, save_json, KeyValueStore};
use crate::{BudgetError, BudgetResult, Session};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid username or password.";

type Users = BTreeMap<String, UserRecord>;

/// What the directory stores for each username.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UserRecord {
    credential: Credential,
}

/// Owns the username-to-credential map and the session.
///
/// Passwords are never stored in the clear. Validation follows the rules and messages of the
/// signup and login forms exactly, including which field each failure flags.
#[derive(Debug)]
pub struct AccountDirectory<S> {
    store: S,
    session: Session,
    hash_iterations: u32,
}

impl<S> AccountDirectory<S>
where
    S: KeyValueStore,
{
    /// A directory with nobody logged in.
    pub fn new(store: S) -> Self {
        Self {
            store,
            session: Session::anonymous(),
            hash_iterations: DEFAULT_HASH_ITERATIONS,
        }
    }

    /// A directory whose session is restored from the stored current user, if any.
    pub fn open(store: S) -> BudgetResult<Self> {
        let mut directory = Self::new(store);
        if let Some(username) = directory.store.get(keys::CURRENT_USER)? {
            if directory.users().contains_key(&username) {
                debug!("Restoring session for {username}");
                directory.session.begin(username);
            } else {
                warn!("The stored current user '{username}' is not in the directory, ignoring it");
                directory.store.remove(keys::CURRENT_USER)?;
            }
        }
        Ok(directory)
    }

    /// Sets the PBKDF2 iteration count used for new password hashes.
    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.hash_iterations = iterations.max(1);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<&str> {
        self.session.user()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users().contains_key(username)
    }

    /// Creates an account. The first failing rule wins:
    ///
    /// 1. username shorter than 3 characters
    /// 2. empty password
    /// 3. password shorter than 8 characters
    /// 4. password and confirmation differ
    /// 5. username already taken
    ///
    /// Returns a confirmation message. Signing up does not log the user in.
    pub fn signup(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> BudgetResult<String> {
        if username.chars().count() < MIN_USERNAME_CHARS {
            return Err(rejected(
                Field::SignupUsername,
                "Username must be at least 3 characters long.",
            ));
        }
        if password.is_empty() {
            return Err(rejected(Field::SignupPassword, "Password is required."));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(rejected(
                Field::SignupPassword,
                "Password must be at least 8 characters long.",
            ));
        }
        if password != confirm_password {
            return Err(rejected(
                Field::SignupConfirmPassword,
                "Passwords do not match.",
            ));
        }

        let mut users = self.users();
        if users.contains_key(username) {
            return Err(rejected(
                Field::SignupUsername,
                "Username already exists. Please choose another.",
            ));
        }
        users.insert(
            username.to_string(),
            UserRecord {
                credential: Credential::hash(password, self.hash_iterations),
            },
        );
        self.save_users(&users)?;
        info!("Created account {username}");
        Ok("Account created successfully! You can now log in.".to_string())
    }

    /// Logs in. Unknown usernames and wrong passwords fail identically, flagged as
    /// `loginCredentials`.
    pub fn login(&mut self, username: &str, password: &str) -> BudgetResult<String> {
        if username.is_empty() {
            return Err(rejected(Field::LoginUsername, "Username is required"));
        }
        if password.is_empty() {
            return Err(rejected(Field::LoginPassword, "Password is required"));
        }

        let mut users = self.users();
        let Some(record) = users.get_mut(username) else {
            return Err(rejected(Field::LoginCredentials, INVALID_CREDENTIALS));
        };
        if !record.credential.verify(password) {
            return Err(rejected(Field::LoginCredentials, INVALID_CREDENTIALS));
        }

        if record.credential.is_plain() {
            record.credential = Credential::hash(password, self.hash_iterations);
            self.save_users(&users)?;
            info!("Replaced the plain-text password of {username} with a hash");
        }

        self.store.set(keys::CURRENT_USER, username)?;
        self.session.begin(username);
        info!("Logged in as {username}");
        Ok(format!("Welcome back, {username}!"))
    }

    pub fn logout(&mut self) -> BudgetResult<()> {
        if let Some(username) = self.session.user() {
            info!("Logged out {username}");
        }
        self.store.remove(keys::CURRENT_USER)?;
        self.session.end();
        Ok(())
    }

    /// The stored directory. A directory that cannot be read or parsed is treated as empty.
    fn users(&self) -> Users {
        match load_json::<Users, _>(&self.store, keys::USERS) {
            Ok(users) => users.unwrap_or_default(),
            Err(e) => {
                error!("Error in retrieving users, treating the directory as empty: {e:#}");
                Users::new()
            }
        }
    }

    fn save_users(&self, users: &Users) -> BudgetResult<()> {
        save_json(&self.store, keys::USERS, users)?;
        debug!("Saved {} users", users.len());
        Ok(())
    }
}

fn rejected(field: Field, message: &str) -> BudgetError {
    debug!("Rejected {field}: {message}");
    BudgetError::validation(field, message)
}
