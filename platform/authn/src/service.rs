use entity::{NewUser, User};
use platform_api::{Collection, RecordStoreClient};
use tracing::{info, instrument};

use crate::{
    AuthnError, AuthnResult,
    session::Session,
    token::{self, SessionIdentity},
};

pub const USERS: &str = "users";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn validate(&self) -> AuthnResult<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AuthnError::MissingCredentials);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Registration and login against the `users` collection.
///
/// Uniqueness is checked here, not by the store: two registrations racing on the
/// same email can both pass the check.
#[derive(Clone, Debug)]
pub struct AuthService {
    users: Collection<User>,
    session: Session,
}

impl AuthService {
    pub fn new(client: &RecordStoreClient, session: Session) -> Self {
        Self {
            users: client.collection(USERS),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[instrument(name = "authn.register", skip_all, fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &Credentials) -> AuthnResult<User> {
        credentials.validate()?;
        let existing = self
            .users
            .find_by(&[("email", credentials.email.as_str())])
            .await?;
        if !existing.is_empty() {
            return Err(AuthnError::DuplicateUser);
        }
        let user = self
            .users
            .create(&NewUser {
                email: &credentials.email,
                password: &credentials.password,
            })
            .await?;
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    #[instrument(name = "authn.login", skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> AuthnResult<LoginOutcome> {
        credentials.validate()?;
        let matches = self
            .users
            .find_by(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .await?;
        let Some(user) = matches.into_iter().next() else {
            return Err(AuthnError::InvalidCredentials);
        };
        let token = token::encode(&SessionIdentity::issue(&user))?;
        self.session.store_token(&token)?;
        info!(user_id = %user.id, "signed in");
        Ok(LoginOutcome { token, user })
    }

    /// Drops the stored token. No network call.
    pub fn logout(&self) -> AuthnResult<()> {
        self.session.clear()?;
        info!("signed out");
        Ok(())
    }

    pub fn current_user(&self) -> AuthnResult<Option<SessionIdentity>> {
        self.session.identity()
    }
}
