use entity::{Employee, EmployeeProfile, Gender, RecordId};
use tracing::{debug, info};

use crate::{
    HrError, HrResult,
    service::EmployeeService,
    summary::Summary,
    view::{self, FilterState, PageView, StatusFilter},
};

/// The dashboard's working set: the cached employee collection plus filter and
/// page selection.
///
/// Every mutating call talks to the store first and touches the cache only once
/// that call has succeeded. A failed call leaves the cache exactly as it was.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    employees: Vec<Employee>,
    filter: FilterState,
    page: usize,
}

impl Roster {
    pub fn from_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees,
            filter: FilterState::default(),
            page: 1,
        }
    }

    pub async fn load(service: &EmployeeService) -> HrResult<Self> {
        let employees = service.list().await?;
        info!(count = employees.len(), "employees loaded");
        Ok(Self::from_employees(employees))
    }

    /// Re-fetches the collection; filters and page survive.
    pub async fn refresh(&mut self, service: &EmployeeService) -> HrResult<()> {
        self.employees = service.list().await?;
        debug!(count = self.employees.len(), "employees refreshed");
        Ok(())
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn find(&self, id: &RecordId) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == *id)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.page = 1;
    }

    pub fn set_gender(&mut self, gender: Option<Gender>) {
        self.filter.gender = gender;
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<StatusFilter>) {
        self.filter.status = status;
        self.page = 1;
    }

    /// Requested page; may exceed the last page; [`Roster::view`] clamps it.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        let meta = self.view().meta;
        if meta.has_next() {
            self.page = meta.current_page + 1;
        }
    }

    pub fn previous_page(&mut self) {
        let meta = self.view().meta;
        if meta.has_previous() {
            self.page = meta.current_page - 1;
        }
    }

    pub fn view(&self) -> PageView<'_> {
        view::derive_view(&self.employees, &self.filter, self.page)
    }

    /// Every row matching the filters, across all pages.
    pub fn filtered(&self) -> Vec<&Employee> {
        view::filter_employees(&self.employees, &self.filter)
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.employees)
    }

    /// Flips the cached status of `id` and returns the new value. Unknown ids fail
    /// before any request is sent.
    pub async fn toggle_status(&mut self, service: &EmployeeService, id: &RecordId) -> HrResult<bool> {
        let current = self
            .find(id)
            .map(|employee| employee.profile.active)
            .ok_or_else(|| HrError::UnknownEmployee(id.clone()))?;
        let next = !current;
        service.patch_status(id, next).await?;
        for employee in self.employees.iter_mut().filter(|employee| employee.id == *id) {
            employee.profile.active = next;
        }
        Ok(next)
    }

    pub async fn add(&mut self, service: &EmployeeService, profile: &EmployeeProfile) -> HrResult<&Employee> {
        let created = service.create(profile).await?;
        self.employees.push(created);
        let last = self.employees.len() - 1;
        Ok(&self.employees[last])
    }

    /// Replaces the cached record with whatever the store returned.
    pub async fn update(
        &mut self,
        service: &EmployeeService,
        id: &RecordId,
        profile: &EmployeeProfile,
    ) -> HrResult<Employee> {
        let updated = service.update(id, profile).await?;
        for employee in self
            .employees
            .iter_mut()
            .filter(|employee| employee.id == updated.id)
        {
            *employee = updated.clone();
        }
        Ok(updated)
    }

    /// Deletes remotely, then drops any cached row with that id. Removing an id the
    /// cache never had is not an error.
    pub async fn remove(&mut self, service: &EmployeeService, id: &RecordId) -> HrResult<()> {
        service.remove(id).await?;
        let before = self.employees.len();
        self.employees.retain(|employee| employee.id != *id);
        debug!(%id, dropped = before - self.employees.len(), "cache reconciled after delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use entity::State;
    use platform_api::{RecordStoreClient, StoreConfig};

    fn employee(id: u64, name: &str, active: bool) -> Employee {
        Employee::new(
            RecordId::Number(id),
            EmployeeProfile {
                full_name: name.to_string(),
                gender: if id % 2 == 0 { Gender::Male } else { Gender::Female },
                dob: NaiveDate::from_ymd_opt(1992, 8, 15).unwrap(),
                state: State::Maharashtra,
                active,
                image: None,
            },
        )
    }

    fn roster_of(count: u64) -> Roster {
        Roster::from_employees(
            (1..=count)
                .map(|i| employee(i, &format!("Person {i}"), i % 3 != 0))
                .collect(),
        )
    }

    #[test]
    fn filter_changes_return_to_first_page() {
        let mut roster = roster_of(12);
        roster.set_page(3);
        assert_eq!(roster.view().meta.current_page, 3);

        roster.set_search("person 1");
        assert_eq!(roster.page(), 1);
        let names: Vec<_> = roster
            .view()
            .rows
            .iter()
            .map(|e| e.profile.full_name.clone())
            .collect();
        assert_eq!(names, vec!["Person 1", "Person 10", "Person 11", "Person 12"]);

        roster.set_page(2);
        roster.set_status(Some(StatusFilter::Inactive));
        assert_eq!(roster.page(), 1);
    }

    #[test]
    fn paging_stays_within_bounds() {
        let mut roster = roster_of(12);
        roster.previous_page();
        assert_eq!(roster.view().meta.current_page, 1);
        roster.next_page();
        roster.next_page();
        roster.next_page();
        assert_eq!(roster.view().meta.current_page, 3);

        roster.set_page(9);
        assert_eq!(roster.view().meta.current_page, 3);
        roster.previous_page();
        assert_eq!(roster.page(), 2);
    }

    #[test]
    fn summary_covers_the_whole_cache() {
        let mut roster = roster_of(6);
        roster.set_status(Some(StatusFilter::Active));
        let summary = roster.summary();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.inactive, 2);
        assert_eq!(roster.filtered().len(), 4);
    }

    #[tokio::test]
    async fn toggling_an_unknown_id_sends_nothing() {
        // Port 9 has no listener: reaching the network would surface as a store error.
        let client = RecordStoreClient::new(&StoreConfig::new("http://127.0.0.1:9")).unwrap();
        let service = EmployeeService::new(&client);
        let mut roster = roster_of(2);

        let err = roster
            .toggle_status(&service, &RecordId::Number(99))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::UnknownEmployee(_)), "{err}");
    }

    #[tokio::test]
    async fn failed_calls_leave_the_cache_alone() {
        let client = RecordStoreClient::new(&StoreConfig::new("http://127.0.0.1:9")).unwrap();
        let service = EmployeeService::new(&client);
        let mut roster = roster_of(3);
        let before = roster.employees().to_vec();

        assert!(matches!(
            roster.toggle_status(&service, &RecordId::Number(1)).await,
            Err(HrError::Store(_))
        ));
        assert!(roster.remove(&service, &RecordId::Number(2)).await.is_err());
        assert!(roster.refresh(&service).await.is_err());
        assert_eq!(roster.employees(), before.as_slice());
    }
}
