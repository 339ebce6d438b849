mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use journey_api::auth::{Claims, TokenService};

use common::{read, TestServer};

const DEV_SECRET: &str = "development-only-secret";

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in ["/api/auth/me", "/api/journeys/my-journeys", "/api/chats", "/api/journeys/viewed/count"] {
        let (status, body) = read(server.get(path, None).await?).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", path);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    let res = server
        .client
        .get(server.url("/api/auth/me"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.get("/api/auth/me", Some("not.a.jwt")).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let account = server.seeker("s@example.com").await?;
    let id: Uuid = account.id.parse()?;

    let stale = Claims {
        sub: id,
        iat: 1_600_000_000,
        exp: 1_600_003_600,
    };
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &stale,
        &jsonwebtoken::EncodingKey::from_secret(DEV_SECRET.as_bytes()),
    )?;
    assert_eq!(server.get("/api/auth/me", Some(&expired)).await?.status(), StatusCode::UNAUTHORIZED);

    let forged = TokenService::new("someone-elses-secret", 1).issue(id)?;
    assert_eq!(server.get("/api/auth/me", Some(&forged)).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_a_missing_user_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = TokenService::new(DEV_SECRET, 1).issue(Uuid::new_v4())?;

    let (status, body) = read(server.get("/api/auth/me", Some(&token)).await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    Ok(())
}

#[tokio::test]
async fn roles_gate_their_routes() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;
    let seeker = server.seeker("s@example.com").await?;

    let (status, body) = read(server.create_journey(&seeker.token, server.journey_form("Nope", &[])).await?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    assert_eq!(server.get("/api/journeys/my-journeys", Some(&seeker.token)).await?.status(), StatusCode::FORBIDDEN);
    assert_eq!(server.get("/api/journeys/saved/all", Some(&traveler.token)).await?.status(), StatusCode::FORBIDDEN);

    let id = server.journey(&traveler.token, "Mine").await?["id"].clone();
    let res = server.post_json("/api/journeys/save", &traveler.token, &json!({ "journeyId": id })).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Either role may read the public list and its own view count
    assert_eq!(server.get("/api/journeys", Some(&seeker.token)).await?.status(), StatusCode::OK);
    assert_eq!(server.get("/api/journeys/viewed/count", Some(&traveler.token)).await?.status(), StatusCode::OK);
    Ok(())
}
