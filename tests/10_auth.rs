mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn resource_routes_require_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/products/list")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Access token missing");
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_forbidden() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/products/list"))
        .bearer_auth("definitely-not-a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn authorization_scheme_is_not_checked_only_the_second_word() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // "Basic xyz" has a second word, so it passes extraction and fails
    // verification: 403, not 401.
    let res = client
        .get(server.url("/api/products/list"))
        .header("Authorization", "Basic xyz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // A bare scheme with no second word reads as a missing token.
    let res = client
        .get(server.url("/api/products/list"))
        .header("Authorization", "Bearer")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_tokens_are_forbidden() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Hand-sign a token that expired an hour ago, with the same secret the
    // server resolves from its config.
    let secret = &ecom_admin_api::config::config().security.jwt_secret;
    let now = chrono::Utc::now().timestamp();
    let claims = serde_json::json!({
        "userId": uuid::Uuid::new_v4(),
        "email": "expired@example.com",
        "iat": now - 7200,
        "exp": now - 3600,
    });
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )?;

    let res = client
        .get(server.url("/api/products/list"))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn a_fresh_login_token_opens_the_gate() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_and_login(server).await?;

    let res = client
        .get(server.url("/api/products/list"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Product Data Fetch Successfully");
    assert!(body["data"].is_array());
    Ok(())
}
