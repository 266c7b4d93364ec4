use crate::{BudgetError, BudgetResult};
use serde::Serialize;

/// Who is logged in, if anyone.
///
/// `AccountDirectory` owns the session and changes it on login and logout. A `LedgerStore` only
/// reads it, to decide which user's lists to load and where to save them.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    /// A session with nobody logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            user: Some(username.into()),
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.user.is_some()
    }

    /// The logged-in username, or `NoActiveSession`.
    pub fn require_user(&self) -> BudgetResult<&str> {
        self.user().ok_or(BudgetError::NoActiveSession)
    }

    pub(crate) fn begin(&mut self, username: impl Into<String>) {
        self.user = Some(username.into());
    }

    pub(crate) fn end(&mut self) {
        self.user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let mut session = Session::anonymous();
        assert!(!session.is_active());
        assert!(matches!(
            session.require_user(),
            Err(BudgetError::NoActiveSession)
        ));
        session.begin("robin");
        assert_eq!(session.require_user().unwrap(), "robin");
        session.end();
        assert_eq!(session, Session::anonymous());
    }
}
