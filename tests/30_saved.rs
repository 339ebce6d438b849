mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{read, TestServer};

#[tokio::test]
async fn save_is_idempotent_only_in_one_direction() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;
    let seeker = server.seeker("s@example.com").await?;
    let id = server.journey(&traveler.token, "Worth saving").await?["id"].clone();

    let (status, body) = read(server.post_json("/api/journeys/save", &seeker.token, &json!({ "journeyId": id })).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["savedCount"], 1);

    let (status, body) = read(server.post_json("/api/journeys/save", &seeker.token, &json!({ "journeyId": id })).await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Journey already saved");

    let (status, body) = read(server.post_json("/api/journeys/unsave", &seeker.token, &json!({ "journeyId": id })).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["savedCount"], 0);

    // Unsaving something not saved is a no-op
    let (status, body) = read(server.post_json("/api/journeys/unsave", &seeker.token, &json!({ "journeyId": id })).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["savedCount"], 0);
    Ok(())
}

#[tokio::test]
async fn save_requires_an_existing_journey() -> Result<()> {
    let server = TestServer::spawn().await?;
    let seeker = server.seeker("s@example.com").await?;

    let res = server.post_json("/api/journeys/save", &seeker.token, &json!({})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.post_json("/api/journeys/save", &seeker.token, &json!({ "journeyId": "nope" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let unknown = json!({ "journeyId": uuid::Uuid::new_v4() });
    let res = server.post_json("/api/journeys/save", &seeker.token, &unknown).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn saved_list_and_view_history() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;
    let seeker = server.seeker("s@example.com").await?;
    let first = server.journey(&traveler.token, "First").await?["id"].as_str().unwrap_or_default().to_string();
    let second = server.journey(&traveler.token, "Second").await?["id"].as_str().unwrap_or_default().to_string();

    server.post_json("/api/journeys/save", &seeker.token, &json!({ "journeyId": first })).await?;
    server.post_json("/api/journeys/save", &seeker.token, &json!({ "journeyId": second })).await?;

    let (status, body) = read(server.get("/api/journeys/saved/all", Some(&seeker.token)).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["journeys"][0]["traveler"]["name"], "Traveler");

    // Views are recorded once per journey, however often it is opened
    for path in [&first, &first, &second] {
        server.get(&format!("/api/journeys/{}", path), Some(&seeker.token)).await?;
    }
    let (_, body) = read(server.get("/api/journeys/viewed/count", Some(&seeker.token)).await?).await?;
    assert_eq!(body["data"]["count"], 2);

    let (_, journey) = read(server.get(&format!("/api/journeys/{}", first), None).await?).await?;
    assert_eq!(journey["data"]["journey"]["views"], 3);
    Ok(())
}

#[tokio::test]
async fn deleting_a_journey_drops_it_from_saved_lists() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;
    let seeker = server.seeker("s@example.com").await?;
    let id = server.journey(&traveler.token, "Short lived").await?["id"].as_str().unwrap_or_default().to_string();

    server.post_json("/api/journeys/save", &seeker.token, &json!({ "journeyId": id })).await?;
    let res = server
        .client
        .delete(server.url(&format!("/api/journeys/{}", id)))
        .bearer_auth(&traveler.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, body) = read(server.get("/api/journeys/saved/all", Some(&seeker.token)).await?).await?;
    assert_eq!(body["data"]["count"], 0);
    Ok(())
}
