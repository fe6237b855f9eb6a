//! Route guards: pure predicates over "is a session token present".

use std::fmt;

/// Views a guard can send the user to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Login => "login",
            View::Dashboard => "dashboard",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Guard {
    /// Signed-in users only.
    Protected,
    /// Signed-out users only (login, register).
    PublicOnly,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(View),
}

impl Guard {
    pub fn evaluate(self, authenticated: bool) -> Access {
        match (self, authenticated) {
            (Guard::Protected, true) | (Guard::PublicOnly, false) => Access::Allow,
            (Guard::Protected, false) => Access::Redirect(View::Login),
            (Guard::PublicOnly, true) => Access::Redirect(View::Dashboard),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table() {
        assert_eq!(Guard::Protected.evaluate(true), Access::Allow);
        assert_eq!(Guard::Protected.evaluate(false), Access::Redirect(View::Login));
        assert_eq!(Guard::PublicOnly.evaluate(false), Access::Allow);
        assert_eq!(
            Guard::PublicOnly.evaluate(true),
            Access::Redirect(View::Dashboard)
        );
    }
}
