use crate::helpers::{login_ok_body, spawn_app_with_login, CannedResponse};
use stockroom_client_core::{AccessDecision, KvStore};
use stockroom_shared::{const_config::storage_key::STORAGE_KEY_ROLE, uac::Capability};

#[tokio::test]
async fn login_logout_round_trip() {
    // Arrange
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("owner"))).await;
    let _ = app.login().await.unwrap();
    assert_eq!(
        app.core_client.check_access(Capability::Audits).await,
        AccessDecision::Granted
    );

    // Act
    app.core_client.logout().await;

    // Assert
    assert!(!app.core_client.has_valid_session().await);
    assert_eq!(app.core_client.user().await, None);
    assert_eq!(app.core_client.permissions().role(), None);
    assert_eq!(app.kv.get(STORAGE_KEY_ROLE).await.unwrap(), None);
    assert_eq!(
        app.core_client.check_access(Capability::Audits).await,
        AccessDecision::Unauthenticated
    );
}

#[tokio::test]
async fn logout_without_session_is_fine() {
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("owner"))).await;

    app.core_client.logout().await;
    app.core_client.logout().await;

    assert!(!app.core_client.has_valid_session().await);
    assert!(app.received().is_empty(), "logout is local only");
}

#[tokio::test]
async fn authenticated_but_unauthorized_is_distinguishable() {
    let app = spawn_app_with_login(CannedResponse::json(200, login_ok_body("seller"))).await;
    let _ = app.login().await.unwrap();

    let actual = app.core_client.check_access(Capability::Storage).await;

    assert_eq!(actual, AccessDecision::Unauthorized);
}
