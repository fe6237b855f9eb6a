//! Record shapes exchanged with the record store.
//!
//! Field names follow the store's camelCase documents; everything else in the
//! workspace works with these types directly.

pub mod employees;
pub mod record_id;
pub mod users;

pub use employees::{Employee, EmployeeProfile, Gender, State, StatusPatch};
pub use record_id::RecordId;
pub use users::{NewUser, User};
