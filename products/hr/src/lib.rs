//! HR vertical slice.
//!
//! [`EmployeeService`] talks to the `employees` collection, [`view`] turns the
//! cached collection plus the current filters into one page of rows, and
//! [`Roster`] ties the two together: it owns the cached copy and reconciles it
//! only after each remote call has succeeded.

pub mod form;
pub mod roster;
pub mod service;
pub mod summary;
pub mod view;

use std::{io, path::PathBuf};

use entity::RecordId;
use platform_api::ApiError;
use thiserror::Error;

pub use form::{EmployeeDraft, Field, FieldError, ImageInput, ValidationErrors};
pub use roster::Roster;
pub use service::EmployeeService;
pub use summary::Summary;
pub use view::{FilterState, PAGE_SIZE, PageMeta, PageView, StatusFilter};

#[derive(Debug, Error)]
pub enum HrError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("employee {0} is not in the current list")]
    UnknownEmployee(RecordId),
    #[error("failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Store(#[from] ApiError),
}

pub type HrResult<T> = Result<T, HrError>;
