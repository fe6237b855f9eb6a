use entity::{Employee, EmployeeProfile, RecordId, StatusPatch};
use platform_api::{ApiResult, Collection, RecordStoreClient};
use tracing::{info, instrument};

pub const EMPLOYEES: &str = "employees";

/// CRUD over the `employees` collection. Errors from the record store are passed
/// through untouched.
#[derive(Clone, Debug)]
pub struct EmployeeService {
    employees: Collection<Employee>,
}

impl EmployeeService {
    pub fn new(client: &RecordStoreClient) -> Self {
        Self {
            employees: client.collection(EMPLOYEES),
        }
    }

    #[instrument(name = "hr.list", skip_all)]
    pub async fn list(&self) -> ApiResult<Vec<Employee>> {
        self.employees.list().await
    }

    #[instrument(name = "hr.get", skip(self))]
    pub async fn get(&self, id: &RecordId) -> ApiResult<Employee> {
        self.employees.get(id).await
    }

    #[instrument(name = "hr.create", skip_all)]
    pub async fn create(&self, profile: &EmployeeProfile) -> ApiResult<Employee> {
        let created = self.employees.create(profile).await?;
        info!(id = %created.id, "employee created");
        Ok(created)
    }

    /// Full replacement; the body carries the id alongside every field.
    #[instrument(name = "hr.update", skip(self, profile))]
    pub async fn update(&self, id: &RecordId, profile: &EmployeeProfile) -> ApiResult<Employee> {
        let record = Employee::new(id.clone(), profile.clone());
        self.employees.replace(id, &record).await
    }

    /// Sends only `{"active": ..}`.
    #[instrument(name = "hr.patch_status", skip(self))]
    pub async fn patch_status(&self, id: &RecordId, active: bool) -> ApiResult<Employee> {
        self.employees.patch(id, &StatusPatch { active }).await
    }

    #[instrument(name = "hr.remove", skip(self))]
    pub async fn remove(&self, id: &RecordId) -> ApiResult<()> {
        self.employees.delete(id).await?;
        info!(%id, "employee deleted");
        Ok(())
    }
}
