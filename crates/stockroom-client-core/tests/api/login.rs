use crate::helpers::{
    login_args, login_ok_body, no_cb, spawn_app_with_login, unused_address, wait_until,
    CannedResponse,
};
use serde_json::json;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use stockroom_client_core::{Client, KvStore, LoginOutcome, MemoryStore};
use stockroom_shared::{
    const_config::storage_key::STORAGE_KEY_ROLE,
    session::Session,
    uac::{AuthError, Role},
};

#[tokio::test]
async fn login_success_stores_session_and_role() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("editor"))).await;

    // Assert - Ensure not logged in
    assert!(
        !app.core_client.has_valid_session().await,
        "should not be logged in before logging in"
    );

    // Act
    let outcome = app.login().await.unwrap();

    // Assert
    assert_eq!(outcome, LoginOutcome::Success);
    assert!(app.core_client.has_valid_session().await);
    let permissions = app.core_client.permissions();
    assert!(permissions.can_create());
    assert!(!permissions.can_access_storage());
    assert!(!permissions.is_loading());
    let user = app.core_client.user().await.unwrap();
    assert_eq!(user.user_id.as_ref(), "7");
    assert_eq!(user.username, "ana");
    assert_eq!(
        app.kv.get(STORAGE_KEY_ROLE).await.unwrap().as_deref(),
        Some("editor")
    );
}

#[tokio::test]
async fn login_sends_credentials_to_login_path() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("owner"))).await;

    // Act
    let _ = app.login().await.unwrap();

    // Assert
    let received = app.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/auth/login");
    assert_eq!(received[0].authorization, None);
    let body: serde_json::Value = serde_json::from_str(&received[0].body).unwrap();
    assert_eq!(
        body,
        json!({"usuario": "ana", "password": "secret-password"})
    );
}

#[tokio::test]
async fn login_rejected_leaves_no_session() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(
        401,
        json!({"message": "bad credentials"}),
    ))
    .await;

    // Act
    let outcome = app.login().await;

    // Assert
    let err = outcome.unwrap_err();
    let auth_error = err.downcast_ref::<AuthError>().unwrap();
    assert!(auth_error.is_rejected());
    assert!(err.to_string().contains("bad credentials"), "{err}");
    assert!(!app.core_client.has_valid_session().await);
    assert_eq!(app.kv.get(STORAGE_KEY_ROLE).await.unwrap(), None);
}

#[tokio::test]
async fn login_rejected_keeps_existing_session() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(
        401,
        json!({"message": "bad credentials"}),
    ))
    .await;
    let existing = Session::new("old-token".into(), None).unwrap();
    app.core_client
        .session_store()
        .save_session(&existing)
        .await
        .unwrap();
    app.core_client.permissions().set_role(Some(Role::Admin)).await;

    // Act
    let outcome = app.login().await;

    // Assert
    assert!(outcome.is_err());
    assert_eq!(
        app.core_client.session_store().session().await,
        Some(existing)
    );
    assert_eq!(app.core_client.permissions().role(), Some(Role::Admin));
}

#[tokio::test]
async fn login_ok_status_with_unexpected_shape_fails() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(
        200,
        json!({"token": "abc123", "user": {"id": 7}}),
    ))
    .await;

    // Act
    let outcome = app.login().await;

    // Assert
    let err = outcome.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::UnexpectedResponse(_))
    ));
    assert!(!app.core_client.has_valid_session().await);
    assert_eq!(app.core_client.permissions().role(), None);
}

#[tokio::test]
async fn login_ok_status_with_text_body_fails() {
    let app = spawn_app_with_login(CannedResponse::text(200, "welcome")).await;

    let outcome = app.login().await;

    assert!(outcome.is_err());
    assert!(!app.core_client.has_valid_session().await);
}

#[tokio::test]
async fn login_with_unknown_role_grants_nothing() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("superadmin"))).await;

    // Act
    let outcome = app.login().await.unwrap();

    // Assert
    assert_eq!(outcome, LoginOutcome::SuccessWithoutRole);
    assert!(app.core_client.has_valid_session().await);
    let permissions = app.core_client.permissions();
    assert_eq!(permissions.role(), None);
    assert!(!permissions.can_create());
    assert!(!permissions.is_loading());
}

#[tokio::test]
async fn login_without_role_falls_back_to_seller() {
    // Arrange
    let mut body = login_ok_body("ignored");
    body["data"]["usuario"]
        .as_object_mut()
        .unwrap()
        .remove("permisos");
    let app = spawn_app_with_login(CannedResponse::json(200, body)).await;

    // Act
    let outcome = app.login().await.unwrap();

    // Assert
    assert_eq!(outcome, LoginOutcome::Success);
    assert_eq!(app.core_client.permissions().role(), Some(Role::Seller));
}

#[tokio::test]
async fn login_calls_ui_notify() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("owner"))).await;
    let was_called = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&was_called);

    // Act
    let _ = app
        .core_client
        .login(login_args(), move || flag.store(true, Ordering::SeqCst))
        .await
        .unwrap();

    // Assert
    assert!(was_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn login_completes_after_receiver_dropped() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("admin"))).await;

    let client = &app.core_client;

    // Act
    drop(client.login(login_args(), no_cb));

    // Assert
    wait_until(|| client.has_valid_session())
        .await
        .expect("login should still be applied");
    wait_until(|| async move { client.permissions().can_access_sales() })
        .await
        .expect("role should still be applied");
}

#[tokio::test]
async fn login_server_unreachable_is_error() {
    // Arrange
    let client = Client::new(unused_address(), Arc::new(MemoryStore::new()));

    // Act
    let outcome = client.login(login_args(), no_cb).await.unwrap();

    // Assert
    let err = outcome.unwrap_err();
    assert!(err.downcast_ref::<AuthError>().is_none(), "{err:?}");
    assert!(!client.has_valid_session().await);
}
