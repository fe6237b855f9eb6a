use std::sync::Arc;

use platform_storage::KeyValueStore;
use tracing::{debug, warn};

use crate::{
    AuthnResult,
    guard::{Access, Guard},
    token::{self, SessionIdentity, TOKEN_KEY},
};

/// Handle on the persisted session token.
///
/// Lifecycle: written by a successful login, read before every guarded command,
/// removed by logout or when the stored value no longer decodes.
#[derive(Clone, Debug)]
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Raw stored token; an empty value counts as no token.
    pub fn token(&self) -> AuthnResult<Option<String>> {
        Ok(self
            .storage
            .get(TOKEN_KEY)?
            .filter(|value| !value.trim().is_empty()))
    }

    pub fn store_token(&self, token: &str) -> AuthnResult<()> {
        self.storage.set(TOKEN_KEY, token)?;
        debug!("session token stored");
        Ok(())
    }

    pub fn clear(&self) -> AuthnResult<()> {
        self.storage.delete(TOKEN_KEY)?;
        debug!("session token cleared");
        Ok(())
    }

    /// Decoded identity of the stored token. A token that fails to decode is
    /// removed and reported as signed out.
    pub fn identity(&self) -> AuthnResult<Option<SessionIdentity>> {
        let Some(raw) = self.token()? else {
            return Ok(None);
        };
        match token::decode(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(err) => {
                warn!(error = %err, "discarding unreadable session token");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn is_authenticated(&self) -> AuthnResult<bool> {
        Ok(self.identity()?.is_some())
    }

    pub fn check(&self, guard: Guard) -> AuthnResult<Access> {
        Ok(guard.evaluate(self.is_authenticated()?))
    }
}
