use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Account document in the `users` collection.
///
/// The store keeps passwords as plain text; nothing on this side hashes them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body posted to `/users` at registration.
#[derive(Clone, Serialize)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
