use migration::{Migrator, MigratorTrait};
use products_hr::{
    EmployeeFilter, EmployeePatch, EmployeeStore, HrError, NewEmployee, PageWindow,
    SeaOrmEmployeeStore,
};
use sea_orm::Database;

async fn setup_store() -> SeaOrmEmployeeStore {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    SeaOrmEmployeeStore::new(db)
}

fn new_employee(name: &str, email: &str, department: &str, role: &str) -> NewEmployee {
    NewEmployee {
        name: name.into(),
        email: email.into(),
        department: Some(department.into()),
        role: Some(role.into()),
    }
}

async fn seed_engineers(store: &SeaOrmEmployeeStore, count: usize) {
    for i in 0..count {
        store
            .create(new_employee(
                &format!("Employee {i}"),
                &format!("employee{i}@example.com"),
                "Engineering",
                "Developer",
            ))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn create_assigns_id_and_date_joined() {
    let store = setup_store().await;
    let first = store
        .create(new_employee("John Doe", "john.doe@example.com", "Engineering", "Developer"))
        .await
        .unwrap();
    let second = store
        .create(new_employee("Jane Doe", "jane.doe@example.com", "HR", "Manager"))
        .await
        .unwrap();
    assert!(second.id > first.id);

    let fetched = store.read(first.id).await.unwrap();
    assert_eq!(fetched.name, "John Doe");
    assert_eq!(fetched.date_joined.timestamp(), first.date_joined.timestamp());
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn duplicate_email_is_a_field_error() {
    let store = setup_store().await;
    store
        .create(new_employee("John", "john@example.com", "Engineering", "Developer"))
        .await
        .unwrap();
    let err = store
        .create(new_employee("Johnny", "john@example.com", "Sales", "Rep"))
        .await
        .unwrap_err();
    match err {
        HrError::Invalid(errors) => assert!(errors.get("email").is_some()),
        other => panic!("expected field error, got {other:?}"),
    }
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn update_merges_supplied_fields_only() {
    let store = setup_store().await;
    let created = store
        .create(new_employee("John Doe", "john@example.com", "Engineering", "Developer"))
        .await
        .unwrap();
    let patch = EmployeePatch {
        role: Some(Some("Senior Developer".into())),
        ..EmployeePatch::default()
    };
    let updated = store.update(created.id, patch).await.unwrap();
    assert_eq!(updated.role.as_deref(), Some("Senior Developer"));
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.email, created.email);
    assert_eq!(updated.department, created.department);
    assert_eq!(updated.date_joined, created.date_joined);

    let cleared = store
        .update(
            created.id,
            EmployeePatch {
                department: Some(None),
                ..EmployeePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.department, None);
    assert_eq!(cleared.role.as_deref(), Some("Senior Developer"));
}

#[tokio::test]
async fn update_to_taken_email_fails() {
    let store = setup_store().await;
    store
        .create(new_employee("A", "a@example.com", "HR", "Manager"))
        .await
        .unwrap();
    let b = store
        .create(new_employee("B", "b@example.com", "HR", "Manager"))
        .await
        .unwrap();
    let patch = EmployeePatch {
        email: Some("a@example.com".into()),
        ..EmployeePatch::default()
    };
    assert!(matches!(
        store.update(b.id, patch).await,
        Err(HrError::Invalid(_))
    ));
    assert_eq!(store.read(b.id).await.unwrap().email, "b@example.com");
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let store = setup_store().await;
    assert!(matches!(store.read(42).await, Err(HrError::NotFound)));
    assert!(matches!(
        store.update(42, EmployeePatch::default()).await,
        Err(HrError::NotFound)
    ));
    assert!(matches!(store.delete(42).await, Err(HrError::NotFound)));
}

#[tokio::test]
async fn delete_is_permanent_and_ids_are_not_reused() {
    let store = setup_store().await;
    seed_engineers(&store, 2).await;
    let all = store
        .list(&EmployeeFilter::default(), PageWindow::for_page(1))
        .await
        .unwrap();
    let last = all.last().unwrap().id;

    store.delete(last).await.unwrap();
    assert!(matches!(store.read(last).await, Err(HrError::NotFound)));
    assert_eq!(store.count().await.unwrap(), 1);

    let next = store
        .create(new_employee("New", "new@example.com", "HR", "Manager"))
        .await
        .unwrap();
    assert!(next.id > last);
}

#[tokio::test]
async fn pages_slice_fifteen_records() {
    let store = setup_store().await;
    seed_engineers(&store, 15).await;
    let filter = EmployeeFilter::default();

    let page1 = store.list(&filter, PageWindow::for_page(1)).await.unwrap();
    let page2 = store.list(&filter, PageWindow::for_page(2)).await.unwrap();
    let page3 = store.list(&filter, PageWindow::for_page(3)).await.unwrap();
    assert_eq!(page1.len(), 10);
    assert_eq!(page2.len(), 5);
    assert!(page3.is_empty());
    assert_eq!(page1[0].name, "Employee 0");
    assert_eq!(page2[0].name, "Employee 10");
}

#[tokio::test]
async fn filters_are_anded() {
    let store = setup_store().await;
    store
        .create(new_employee("A", "a@example.com", "Engineering", "Developer"))
        .await
        .unwrap();
    store
        .create(new_employee("B", "b@example.com", "Engineering", "Manager"))
        .await
        .unwrap();
    store
        .create(new_employee("C", "c@example.com", "HR", "Manager"))
        .await
        .unwrap();

    let engineering = EmployeeFilter {
        department: Some("Engineering".into()),
        role: None,
    };
    let names: Vec<String> = store
        .list(&engineering, PageWindow::for_page(1))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["A", "B"]);

    let managers_in_engineering = EmployeeFilter {
        department: Some("Engineering".into()),
        role: Some("Manager".into()),
    };
    let hits = store
        .list(&managers_in_engineering, PageWindow::for_page(1))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "B");
}
