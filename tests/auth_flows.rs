use std::sync::Arc;

use anyhow::Result;
use axum::http::Method;
use console_tests::MockRecordStore;
use platform_authn::{
    Access, AuthService, AuthnError, Credentials, Guard, Session, TOKEN_KEY, View, token,
};
use platform_storage::{FileStore, KeyValueStore, MemoryStore};
use serde_json::json;

fn auth_over(store: &MockRecordStore, storage: Arc<dyn KeyValueStore>) -> AuthService {
    AuthService::new(&store.client(), Session::new(storage))
}

#[tokio::test]
async fn second_registration_for_an_email_conflicts() -> Result<()> {
    let store = MockRecordStore::spawn().await?;
    let auth = auth_over(&store, Arc::new(MemoryStore::new()));
    let credentials = Credentials::new("a@x.com", "pw1");

    let user = auth.register(&credentials).await?;
    assert_eq!(user.email, "a@x.com");

    let err = auth
        .register(&Credentials::new("a@x.com", "other"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthnError::DuplicateUser), "{err}");
    assert_eq!(err.to_string(), "User already exists");
    assert_eq!(store.records("users").len(), 1);
    Ok(())
}

#[tokio::test]
async fn registration_checks_existence_by_email_only() -> Result<()> {
    let store = MockRecordStore::spawn().await?;
    let auth = auth_over(&store, Arc::new(MemoryStore::new()));
    auth.register(&Credentials::new("b@x.com", "pw")).await?;

    let lookups = store.requests_to(Method::GET);
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].path, "/users");
    assert_eq!(lookups[0].query.get("email").map(String::as_str), Some("b@x.com"));
    assert!(!lookups[0].query.contains_key("password"));

    let created = store.requests_to(Method::POST);
    assert_eq!(created[0].body, Some(json!({"email": "b@x.com", "password": "pw"})));
    Ok(())
}

#[tokio::test]
async fn blank_credentials_send_nothing() -> Result<()> {
    let store = MockRecordStore::spawn().await?;
    let auth = auth_over(&store, Arc::new(MemoryStore::new()));

    for credentials in [Credentials::new("", "pw"), Credentials::new("a@x.com", "")] {
        let err = auth.register(&credentials).await.unwrap_err();
        assert!(matches!(err, AuthnError::MissingCredentials));
        let err = auth.login(&credentials).await.unwrap_err();
        assert_eq!(err.to_string(), "Email and password are required");
    }
    assert!(store.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn login_mints_a_token_for_the_matching_user() -> Result<()> {
    let store = MockRecordStore::spawn().await?;
    store.seed("users", [json!({"id": 4, "email": "a@x.com", "password": "pw1"})]);
    let storage = Arc::new(MemoryStore::new());
    let auth = auth_over(&store, storage.clone());

    let outcome = auth.login(&Credentials::new("a@x.com", "pw1")).await?;
    assert_eq!(storage.get(TOKEN_KEY)?, Some(outcome.token.clone()));

    let identity = token::decode(&outcome.token)?;
    assert_eq!(identity.email, "a@x.com");
    assert_eq!(identity.user_id.as_key(), "4");
    assert!(identity.issued_at().is_some());

    let lookup = &store.requests_to(Method::GET)[0];
    assert_eq!(lookup.query.get("password").map(String::as_str), Some("pw1"));
    assert_eq!(auth.session().check(Guard::PublicOnly)?, Access::Redirect(View::Dashboard));
    Ok(())
}

#[tokio::test]
async fn failed_login_keeps_the_previous_token() -> Result<()> {
    let store = MockRecordStore::spawn().await?;
    store.seed("users", [json!({"id": 1, "email": "a@x.com", "password": "pw1"})]);
    let storage = Arc::new(MemoryStore::new());
    storage.set(TOKEN_KEY, "previous")?;
    let auth = auth_over(&store, storage.clone());

    let err = auth
        .login(&Credentials::new("a@x.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthnError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid email or password");

    let err = auth
        .login(&Credentials::new("nobody@x.com", "pw1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthnError::InvalidCredentials));

    store.fail_next(Method::GET, "users");
    let err = auth
        .login(&Credentials::new("a@x.com", "pw1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthnError::Store(_)), "{err}");

    assert_eq!(storage.get(TOKEN_KEY)?.as_deref(), Some("previous"));
    Ok(())
}

#[tokio::test]
async fn session_survives_in_the_token_file() -> Result<()> {
    let store = MockRecordStore::spawn().await?;
    store.seed("users", [json!({"id": "u-1", "email": "a@x.com", "password": "pw1"})]);
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("console").join("storage.json");

    let auth = auth_over(&store, Arc::new(FileStore::new(&path)));
    auth.login(&Credentials::new("a@x.com", "pw1")).await?;

    // A fresh process sees the same file.
    let later = auth_over(&store, Arc::new(FileStore::new(&path)));
    let identity = later.current_user()?.expect("signed in");
    assert_eq!(identity.email, "a@x.com");
    assert_eq!(later.session().check(Guard::Protected)?, Access::Allow);

    later.logout()?;
    let after = Session::new(Arc::new(FileStore::new(&path)));
    assert!(!after.is_authenticated()?);
    assert_eq!(after.check(Guard::Protected)?, Access::Redirect(View::Login));
    Ok(())
}

#[tokio::test]
async fn tampered_token_file_means_signed_out() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let storage = Arc::new(FileStore::new(&path));
    storage.set(TOKEN_KEY, "%%not-base64%%")?;

    let session = Session::new(storage.clone());
    assert_eq!(session.check(Guard::Protected)?, Access::Redirect(View::Login));
    assert_eq!(storage.get(TOKEN_KEY)?, None);
    Ok(())
}
