use async_trait::async_trait;
use chrono::Utc;
use entity::employees;
use platform_api::FieldErrors;
use platform_db::DbPool;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr,
};
use tracing::debug;

use crate::{
    HrError, HrResult,
    model::{Employee, EmployeePatch, NewEmployee},
    query::{EmployeeFilter, PageWindow},
    validate::EMAIL,
};

const DUPLICATE_EMAIL: &str = "employee with this email already exists.";

/// Repository over employee records. Each call is a single atomic statement.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn create(&self, new: NewEmployee) -> HrResult<Employee>;
    async fn read(&self, id: i64) -> HrResult<Employee>;
    async fn update(&self, id: i64, patch: EmployeePatch) -> HrResult<Employee>;
    async fn delete(&self, id: i64) -> HrResult<()>;
    /// Filtered records in insertion order, restricted to `window`.
    async fn list(&self, filter: &EmployeeFilter, window: PageWindow) -> HrResult<Vec<Employee>>;
    async fn count(&self) -> HrResult<u64>;
}

#[derive(Clone, Debug)]
pub struct SeaOrmEmployeeStore {
    db: DbPool,
}

impl SeaOrmEmployeeStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    async fn find(&self, id: i64) -> HrResult<employees::Model> {
        employees::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound)
    }
}

#[async_trait]
impl EmployeeStore for SeaOrmEmployeeStore {
    async fn create(&self, new: NewEmployee) -> HrResult<Employee> {
        let model = employees::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            email: Set(new.email),
            department: Set(new.department),
            role: Set(new.role),
            date_joined: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;
        debug!(employee_id = model.id, "employee inserted");
        Ok(model.into())
    }

    async fn read(&self, id: i64) -> HrResult<Employee> {
        self.find(id).await.map(Into::into)
    }

    async fn update(&self, id: i64, patch: EmployeePatch) -> HrResult<Employee> {
        let existing = self.find(id).await?;
        if patch.is_empty() {
            return Ok(existing.into());
        }
        let mut active: employees::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(department) = patch.department {
            active.department = Set(department);
        }
        if let Some(role) = patch.role {
            active.role = Set(role);
        }
        let updated = active.update(&self.db).await.map_err(write_error)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> HrResult<()> {
        let result = employees::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(HrError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, filter: &EmployeeFilter, window: PageWindow) -> HrResult<Vec<Employee>> {
        let mut select = employees::Entity::find();
        if let Some(department) = &filter.department {
            select = select.filter(employees::Column::Department.eq(department.as_str()));
        }
        if let Some(role) = &filter.role {
            select = select.filter(employees::Column::Role.eq(role.as_str()));
        }
        let rows = select
            .order_by_asc(employees::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn count(&self) -> HrResult<u64> {
        Ok(employees::Entity::find().count(&self.db).await?)
    }
}

/// Maps the unique email constraint to a field error; a row that vanished
/// between read and write is reported as missing.
fn write_error(err: DbErr) -> HrError {
    if matches!(err, DbErr::RecordNotUpdated) {
        return HrError::NotFound;
    }
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            HrError::Invalid(FieldErrors::single(EMAIL, DUPLICATE_EMAIL))
        }
        _ => HrError::Store(err),
    }
}
