use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use entity::{Employee, RecordId};
use platform_api::RecordStoreClient;
use platform_authn::{
    Access, AuthService, AuthnError, Credentials, Guard, Session, SessionIdentity, View,
};
use platform_storage::{FileStore, KeyValueStore};
use products_hr::{EmployeeDraft, EmployeeService, HrError, Roster};
use tracing::warn;

use crate::config::ConsoleConfig;

/// Services shared by every command, wired against one record store and one
/// session file.
#[derive(Clone, Debug)]
pub struct Console {
    auth: AuthService,
    employees: EmployeeService,
}

impl Console {
    pub fn connect(config: &ConsoleConfig) -> Result<Self> {
        let client = RecordStoreClient::new(&config.store)
            .with_context(|| format!("invalid record store url {}", config.store.base_url))?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_path));
        Ok(Self::new(&client, storage))
    }

    pub fn new(client: &RecordStoreClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            auth: AuthService::new(client, Session::new(storage)),
            employees: EmployeeService::new(client),
        }
    }

    /// Fails with the redirect a browser would have taken.
    pub fn require(&self, guard: Guard) -> Result<()> {
        match self.auth.session().check(guard)? {
            Access::Allow => Ok(()),
            Access::Redirect(View::Login) => Err(anyhow!(
                "Not signed in. Run `staff-console login` first."
            )),
            Access::Redirect(View::Dashboard) => Err(anyhow!(
                "Already signed in. Run `staff-console logout` first."
            )),
        }
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<String> {
        self.require(Guard::PublicOnly)?;
        self.auth
            .register(credentials)
            .await
            .map_err(|err| auth_failure("Registration", err))?;
        Ok(String::from("Registration successful. Please sign in."))
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        self.require(Guard::PublicOnly)?;
        let outcome = self
            .auth
            .login(credentials)
            .await
            .map_err(|err| auth_failure("Login", err))?;
        Ok(format!("Signed in as {}", outcome.user.email))
    }

    pub fn logout(&self) -> Result<String> {
        self.auth.logout()?;
        Ok(String::from("Signed out"))
    }

    pub fn whoami(&self) -> Result<SessionIdentity> {
        self.require(Guard::Protected)?;
        self.auth
            .current_user()?
            .ok_or_else(|| anyhow!("Not signed in. Run `staff-console login` first."))
    }

    pub async fn load_roster(&self) -> Result<Roster> {
        Roster::load(&self.employees)
            .await
            .map_err(|err| hr_failure("load employees", err))
    }

    pub async fn refresh(&self, roster: &mut Roster) -> Result<String> {
        roster
            .refresh(&self.employees)
            .await
            .map_err(|err| hr_failure("refresh employees", err))?;
        Ok(format!("Loaded {} employees", roster.employees().len()))
    }

    pub async fn show(&self, id: &RecordId) -> Result<Employee> {
        self.employees
            .get(id)
            .await
            .map_err(|err| hr_failure("load employee", HrError::Store(err)))
    }

    /// A roster holding just `id`, for commands that touch one record. The rest of
    /// the collection is neither fetched nor decoded.
    pub async fn roster_for(&self, id: &RecordId) -> Result<Roster> {
        Ok(Roster::from_employees(vec![self.show(id).await?]))
    }

    pub async fn add(&self, roster: &mut Roster, draft: EmployeeDraft) -> Result<Employee> {
        let profile = draft
            .into_profile()
            .map_err(|err| hr_failure("add employee", HrError::from(err)))?;
        roster
            .add(&self.employees, &profile)
            .await
            .cloned()
            .map_err(|err| hr_failure("add employee", err))
    }

    /// Untouched fields keep their values: the cached record when the roster has
    /// one, otherwise whatever the store holds now.
    pub async fn edit(&self, roster: &mut Roster, id: &RecordId, draft: EmployeeDraft) -> Result<Employee> {
        let current = match roster.find(id) {
            Some(employee) => employee.clone(),
            None => self.show(id).await?,
        };
        let profile = draft
            .apply_to(&current.profile)
            .map_err(|err| hr_failure("update employee", HrError::from(err)))?;
        roster
            .update(&self.employees, &current.id, &profile)
            .await
            .map_err(|err| hr_failure("update employee", err))
    }

    pub async fn toggle(&self, roster: &mut Roster, id: &RecordId) -> Result<String> {
        let active = roster
            .toggle_status(&self.employees, id)
            .await
            .map_err(|err| hr_failure("update status", err))?;
        Ok(String::from(if active { "Marked Active" } else { "Marked Inactive" }))
    }

    pub async fn delete(&self, roster: &mut Roster, id: &RecordId) -> Result<String> {
        roster
            .remove(&self.employees, id)
            .await
            .map_err(|err| hr_failure("delete employee", err))?;
        Ok(String::from("Employee deleted"))
    }
}

/// Credential problems are shown as-is; transport detail goes to the log.
fn auth_failure(action: &str, err: AuthnError) -> anyhow::Error {
    match err {
        AuthnError::Store(source) => {
            warn!(error = %source, code = source.code(), "{action} request failed");
            anyhow!("{action} failed")
        }
        other => anyhow!(other),
    }
}

fn hr_failure(action: &str, err: HrError) -> anyhow::Error {
    match err {
        HrError::Store(source) if source.is_not_found() => anyhow!("Employee not found"),
        HrError::Store(source) => {
            warn!(error = %source, code = source.code(), "failed to {action}");
            anyhow!("Failed to {action}")
        }
        other => anyhow!(other),
    }
}
