//! HR module: the employee directory.
//!
//! Handlers talk to an [`EmployeeStore`]; every write goes through
//! [`validate`] first and list reads go through [`query`].

pub mod model;
pub mod query;
pub mod store;
pub mod validate;

use platform_api::{ApiError, FieldErrors};
use sea_orm::DbErr;
use thiserror::Error;

pub use model::{Employee, EmployeePatch, NewEmployee};
pub use query::{EmployeeFilter, EmployeeQuery, ListParams, PAGE_SIZE, PageWindow};
pub use store::{EmployeeStore, SeaOrmEmployeeStore};

#[derive(Debug, Error)]
pub enum HrError {
    #[error("employee not found")]
    NotFound,
    #[error("invalid employee data")]
    Invalid(FieldErrors),
    #[error("employee store failure: {0}")]
    Store(#[from] DbErr),
}

pub type HrResult<T> = Result<T, HrError>;

impl From<FieldErrors> for HrError {
    fn from(value: FieldErrors) -> Self {
        Self::Invalid(value)
    }
}

impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        match value {
            HrError::NotFound => ApiError::NotFound,
            HrError::Invalid(errors) => ApiError::Validation(errors),
            HrError::Store(err) => ApiError::internal(err),
        }
    }
}
