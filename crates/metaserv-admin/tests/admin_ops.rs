//! Tests for registering institutions, projects and users.

mod common;
use common::*;

use metaserv_admin::prelude::*;
use metaserv_schema::ErrorKind;

fn user(name: &str) -> NewUser {
    NewUser {
        user_name: name.into(),
        first_name: "First".into(),
        last_name: "Last".into(),
        email: format!("{name}@example.org"),
    }
}

#[tokio::test]
async fn institution_registered_once() {
    let fx = fixture().await;
    fx.admin.add_institution("SLAC").await.unwrap();

    let err = fx.admin.add_institution("SLAC").await.unwrap_err();
    assert!(matches!(err, AdminError::InstitutionExists(ref name) if name == "SLAC"));
    assert_eq!(err.code(), 3050);
    assert_eq!(count(&fx.admin, "Institution").await, 1);
}

#[tokio::test]
async fn project_registered_once() {
    let fx = fixture().await;
    fx.admin.add_project("LSST").await.unwrap();
    fx.admin.add_project("Gaia").await.unwrap();

    let err = fx.admin.add_project("LSST").await.unwrap_err();
    assert!(matches!(err, AdminError::ProjectExists(_)));
    assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
    assert_eq!(count(&fx.admin, "Project").await, 2);
}

#[tokio::test]
async fn user_needs_known_institution() {
    let fx = fixture().await;

    let err = fx.admin.add_user(&user("jdoe"), "SLAC").await.unwrap_err();
    assert!(matches!(err, AdminError::InstitutionNotFound(ref name) if name == "SLAC"));
    assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    assert_eq!(count(&fx.admin, "User").await, 0);

    fx.admin.add_institution("SLAC").await.unwrap();
    fx.admin.add_user(&user("jdoe"), "SLAC").await.unwrap();
    assert_eq!(count(&fx.admin, "User").await, 1);
}

#[tokio::test]
async fn duplicate_user_rejected() {
    let fx = fixture().await;
    fx.admin.add_institution("SLAC").await.unwrap();
    fx.admin.add_user(&user("jdoe"), "SLAC").await.unwrap();

    let err = fx.admin.add_user(&user("jdoe"), "SLAC").await.unwrap_err();
    assert!(matches!(err, AdminError::UserExists(_)));
    assert_eq!(err.code(), 3060);
}

#[tokio::test]
async fn user_affiliation_recorded() {
    let fx = fixture().await;
    seed(&fx.admin).await;

    let row: (String, String) = sqlx::query_as(
        "SELECT u.email, i.name FROM User u JOIN Institution i ON i.institution_id = u.institution_id \
         WHERE u.user_name = 'jdoe'",
    )
    .fetch_one(fx.admin.catalog().pool())
    .await
    .unwrap();
    assert_eq!(row, ("jdoe@example.org".into(), "SLAC".into()));
}
