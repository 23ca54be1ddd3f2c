// Integration tests for administrative user management

mod common;

use account_service::config::BootstrapSettings;
use account_service::db::ResetTokenStore;
use account_service::services::seed_admin;
use account_service::AccountError;
use common::Harness;

#[tokio::test]
async fn test_create_list_get() {
    let h = Harness::new();
    let created = h
        .admin
        .create_user("carol", "carol@example.com", "password1", Some("ROLE_ADMIN"))
        .await
        .unwrap();
    h.admin
        .create_user("dave", "dave@example.com", "password1", None)
        .await
        .unwrap();

    let users = h.admin.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].username, "carol");
    assert_eq!(users[1].role, "ROLE_USER");

    let fetched = h.admin.get_user(created.id).await.unwrap();
    assert_eq!(fetched, created);

    // Admin-created accounts can log in
    assert!(h.credentials.login("carol", "password1").await.unwrap());
}

#[tokio::test]
async fn test_create_duplicates() {
    let h = Harness::new();
    h.admin
        .create_user("carol", "carol@example.com", "password1", None)
        .await
        .unwrap();

    let err = h
        .admin
        .create_user("carol", "x@example.com", "password1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::DuplicateUsername));

    let err = h
        .admin
        .create_user("carla", "CAROL@example.com", "password1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::DuplicateEmail));
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let h = Harness::new();

    assert!(matches!(h.admin.get_user(42).await, Err(AccountError::NotFound)));
    assert!(matches!(
        h.admin.update_user(42, Some("x"), None, None).await,
        Err(AccountError::NotFound)
    ));
    assert!(matches!(
        h.admin.change_role(42, "ROLE_ADMIN").await,
        Err(AccountError::NotFound)
    ));
    assert!(matches!(h.admin.delete_user(42).await, Err(AccountError::NotFound)));
}

#[tokio::test]
async fn test_update_user_fields_and_role() {
    let h = Harness::new();
    let user = h
        .admin
        .create_user("erin", "erin@example.com", "password1", None)
        .await
        .unwrap();

    let updated = h
        .admin
        .update_user(
            user.id,
            Some("erin2"),
            Some("erin2@example.com"),
            Some("ROLE_ADMIN"),
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "erin2");
    assert_eq!(updated.email, "erin2@example.com");
    assert_eq!(updated.role, "ROLE_ADMIN");

    // Password is untouched by admin update
    assert!(h.credentials.login("erin2", "password1").await.unwrap());
}

#[tokio::test]
async fn test_update_user_same_values_and_conflicts() {
    let h = Harness::new();
    let erin = h
        .admin
        .create_user("erin", "erin@example.com", "password1", None)
        .await
        .unwrap();
    h.admin
        .create_user("frank", "frank@example.com", "password1", None)
        .await
        .unwrap();

    h.admin
        .update_user(erin.id, Some("erin"), Some("Erin@Example.com"), None)
        .await
        .unwrap();

    let err = h
        .admin
        .update_user(erin.id, Some("frank"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::DuplicateUsername));

    let err = h
        .admin
        .update_user(erin.id, None, Some("FRANK@example.com"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::DuplicateEmail));
}

#[tokio::test]
async fn test_change_role() {
    let h = Harness::new();
    let user = h
        .admin
        .create_user("gina", "gina@example.com", "password1", None)
        .await
        .unwrap();

    let promoted = h.admin.change_role(user.id, "ROLE_ADMIN").await.unwrap();
    assert_eq!(promoted.role, "ROLE_ADMIN");

    let auth = h.credentials.authenticate("gina", "password1").await.unwrap();
    assert_eq!(h.signer.verify(&auth.token).unwrap().role, "ROLE_ADMIN");
}

#[tokio::test]
async fn test_delete_user_removes_reset_token() {
    let h = Harness::new();
    let user = h
        .admin
        .create_user("hank", "hank@example.com", "password1", None)
        .await
        .unwrap();
    let issued = h.credentials.request_reset("hank@example.com").await.unwrap();

    h.admin.delete_user(user.id).await.unwrap();

    assert!(h.reset_tokens.find_by_user(user.id).await.unwrap().is_none());
    assert!(matches!(
        h.credentials.consume_reset(&issued.token, "newpassword").await,
        Err(AccountError::InvalidToken)
    ));
    assert!(matches!(
        h.admin.delete_user(user.id).await,
        Err(AccountError::NotFound)
    ));
}

#[tokio::test]
async fn test_seed_admin_is_idempotent() {
    let h = Harness::new();
    let settings = BootstrapSettings {
        username: "admin".to_string(),
        email: "admin@gmail.com".to_string(),
        password: Some("admin123".to_string()),
    };

    assert!(seed_admin(&h.admin, &settings).await.unwrap());
    assert!(!seed_admin(&h.admin, &settings).await.unwrap());

    let users = h.admin.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, "ROLE_ADMIN");
}

#[tokio::test]
async fn test_seed_admin_skipped_without_password() {
    let h = Harness::new();
    let settings = BootstrapSettings {
        username: "admin".to_string(),
        email: "admin@gmail.com".to_string(),
        password: None,
    };

    assert!(!seed_admin(&h.admin, &settings).await.unwrap());
    assert!(h.admin.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_admin_rejects_malformed_settings() {
    let h = Harness::new();
    let bad_email = BootstrapSettings {
        username: "admin".to_string(),
        email: "not-an-address".to_string(),
        password: Some("admin123".to_string()),
    };
    let err = seed_admin(&h.admin, &bad_email).await.unwrap_err();
    assert!(matches!(err, AccountError::Validation(ref fields) if fields.contains_key("email")));

    let bad_username = BootstrapSettings {
        username: "root admin".to_string(),
        email: "admin@gmail.com".to_string(),
        password: Some("admin123".to_string()),
    };
    let err = seed_admin(&h.admin, &bad_username).await.unwrap_err();
    assert!(matches!(err, AccountError::Validation(ref fields) if fields.contains_key("username")));

    assert!(h.admin.list_users().await.unwrap().is_empty());
}
