use super::*;
use tokio::time::{Duration, timeout};

fn test_config() -> BackendConfig {
    BackendConfig {
        base_url: "https://backend.example.test".into(),
        api_key: "public-key".into(),
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
    }
}

fn client() -> AuthClient {
    AuthClient::new(test_config()).expect("client should build")
}

fn token_response(user_id: Uuid) -> TokenResponse {
    TokenResponse {
        access_token: "access-1".into(),
        refresh_token: "refresh-1".into(),
        expires_in: 3600,
        user: TokenUser { id: user_id },
    }
}

// =============================================================================
// Endpoint URLs
// =============================================================================

#[test]
fn token_url_carries_grant_type() {
    let client = client();
    assert_eq!(
        client.token_url("password"),
        "https://backend.example.test/auth/v1/token?grant_type=password"
    );
    assert_eq!(
        client.token_url("refresh_token"),
        "https://backend.example.test/auth/v1/token?grant_type=refresh_token"
    );
}

#[test]
fn logout_url_points_at_logout() {
    assert_eq!(client().logout_url(), "https://backend.example.test/auth/v1/logout");
}

// =============================================================================
// Token payload parsing
// =============================================================================

#[test]
fn token_response_parses_expected_shape() {
    let body = r#"{
        "access_token": "at",
        "refresh_token": "rt",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": { "id": "00000000-0000-0000-0000-000000000001", "email": "a@example.test" }
    }"#;
    let parsed: TokenResponse = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.access_token, "at");
    assert_eq!(parsed.refresh_token, "rt");
    assert_eq!(parsed.expires_in, 3600);
    assert_eq!(parsed.user.id.to_string(), "00000000-0000-0000-0000-000000000001");
}

#[test]
fn token_response_rejects_missing_user() {
    let body = r#"{ "access_token": "at", "refresh_token": "rt", "expires_in": 3600 }"#;
    assert!(serde_json::from_str::<TokenResponse>(body).is_err());
}

// =============================================================================
// Local session state
// =============================================================================

#[tokio::test]
async fn current_session_is_none_before_sign_in() {
    let client = client();
    assert_eq!(client.current_session().await.unwrap(), None);
    assert_eq!(client.access_token().await, None);
}

#[tokio::test]
async fn stored_tokens_become_the_current_session() {
    let client = client();
    let user_id = Uuid::new_v4();
    let session = client.store_tokens(token_response(user_id)).await;
    assert_eq!(session.user_id, user_id);
    assert_eq!(session.access_token, "access-1");

    let current = client.current_session().await.unwrap().unwrap();
    assert_eq!(current.user_id, user_id);
    assert_eq!(client.access_token().await.as_deref(), Some("access-1"));
}

#[tokio::test]
async fn refresh_without_session_reports_no_session() {
    let err = client().refresh().await.unwrap_err();
    assert!(matches!(err, AuthApiError::NoSession));
}

// =============================================================================
// Session fan-out
// =============================================================================

#[tokio::test]
async fn subscribers_receive_broadcast_values() {
    let client = client();
    let mut rx = client.subscribe().await;

    let session = Session::new(Uuid::new_v4(), "tok");
    client.broadcast(Some(session.clone())).await;
    client.broadcast(None).await;

    let first = timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("broadcast should arrive")
        .expect("channel open");
    assert_eq!(first, Some(session));
    let second = timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("broadcast should arrive")
        .expect("channel open");
    assert_eq!(second, None);
}

#[tokio::test]
async fn dropped_subscribers_are_pruned_on_broadcast() {
    let client = client();
    let rx = client.subscribe().await;
    let _rx_live = client.subscribe().await;
    assert_eq!(client.subscriber_count().await, 2);

    drop(rx);
    client.broadcast(None).await;
    assert_eq!(client.subscriber_count().await, 1);
}

#[tokio::test]
async fn sign_out_without_session_still_notifies() {
    let client = client();
    let mut rx = client.subscribe().await;

    client.sign_out().await.unwrap();

    let update = timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("sign-out should broadcast")
        .expect("channel open");
    assert_eq!(update, None);
    assert_eq!(client.current_session().await.unwrap(), None);
}
