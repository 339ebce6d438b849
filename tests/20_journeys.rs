mod common;

use anyhow::Result;
use reqwest::{multipart, StatusCode};
use serde_json::Value;

use common::{read, TestServer};

fn titles(body: &Value) -> Vec<String> {
    body["data"]["journeys"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|j| j["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn create_computes_duration_and_defaults() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;

    let journey = server.journey(&traveler.token, "Atlantic coast").await?;
    assert_eq!(journey["duration"], 4);
    assert_eq!(journey["views"], 0);
    assert_eq!(journey["budget"], "moderate");
    assert_eq!(journey["travelerId"], traveler.id.as_str());
    assert_eq!(journey["traveler"]["name"], "Traveler");
    assert!(journey["rating"].is_null());
    Ok(())
}

#[tokio::test]
async fn create_partitions_uploads_by_type() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;

    let form = server
        .journey_form("With media", &[("highlights", r#"["Tram 28","Pastel de nata"]"#), ("transportation", "Train")])
        .part("files", multipart::Part::bytes(vec![1, 2, 3]).file_name("a.jpg").mime_str("image/jpeg")?)
        .part("files", multipart::Part::bytes(vec![4, 5]).file_name("b.mp4").mime_str("video/mp4")?)
        .part("files", multipart::Part::bytes(vec![6]).file_name("c.pdf").mime_str("application/pdf")?);

    let (status, body) = read(server.create_journey(&traveler.token, form).await?).await?;
    assert_eq!(status, StatusCode::CREATED);

    let journey = &body["data"]["journey"];
    assert_eq!(journey["images"].as_array().map(Vec::len), Some(1));
    assert_eq!(journey["videos"].as_array().map(Vec::len), Some(1));
    assert!(journey["images"][0].as_str().unwrap_or_default().starts_with("data:image/jpeg;base64,"));
    assert_eq!(journey["highlights"], serde_json::json!(["Tram 28", "Pastel de nata"]));
    assert_eq!(journey["transportation"], serde_json::json!(["Train"]));
    Ok(())
}

#[tokio::test]
async fn create_rejects_oversized_uploads() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;

    let form = server
        .journey_form("Too big", &[])
        .part("files", multipart::Part::bytes(vec![0u8; 128 * 1024]).file_name("big.jpg").mime_str("image/jpeg")?);

    let (status, body) = read(server.create_journey(&traveler.token, form).await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn create_validates_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;

    let missing = multipart::Form::new().text("title", "No description");
    let (status, body) = read(server.create_journey(&traveler.token, missing).await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all required fields");

    for (key, value) in [("rating", "0"), ("budget", "cheap"), ("endDate", "not-a-date")] {
        let form = multipart::Form::new()
            .text("title", "t")
            .text("description", "d")
            .text("startLocation", "a")
            .text("endLocation", "b")
            .text("startDate", "2024-01-01")
            .text(key, value);
        let form = if key == "endDate" { form } else { form.text("endDate", "2024-01-02") };
        let res = server.create_journey(&traveler.token, form).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}={} should be rejected", key, value);
    }
    Ok(())
}

#[tokio::test]
async fn list_filters_are_mutually_exclusive() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;

    for (title, from, to, start, highlight) in [
        ("Alps", "Zurich", "Milan", "2024-01-10", "Glacier"),
        ("Coast", "Lisbon", "Porto", "2024-05-01", "Surf"),
        ("Desert", "Marrakesh", "Merzouga", "2024-09-01", "Dunes by Milan's friend"),
    ] {
        let form = multipart::Form::new()
            .text("title", title)
            .text("description", "Trip")
            .text("startLocation", from)
            .text("endLocation", to)
            .text("startDate", start)
            .text("endDate", start)
            .text("highlights", highlight);
        assert_eq!(server.create_journey(&traveler.token, form).await?.status(), StatusCode::CREATED);
    }

    let (_, all) = read(server.get("/api/journeys", None).await?).await?;
    assert_eq!(all["data"]["count"], 3);
    assert_eq!(titles(&all), vec!["Desert", "Coast", "Alps"]);
    assert!(all["data"]["journeys"][0]["traveler"].get("email").is_none());

    let (_, route) = read(server.get("/api/journeys?fromLocation=zur&toLocation=MIL", None).await?).await?;
    assert_eq!(titles(&route), vec!["Alps"]);

    // Route filter wins over search
    let (_, route_first) = read(server.get("/api/journeys?fromLocation=lisbon&search=glacier", None).await?).await?;
    assert_eq!(titles(&route_first), vec!["Coast"]);

    let (_, search) = read(server.get("/api/journeys?search=milan", None).await?).await?;
    assert_eq!(titles(&search), vec!["Desert"]);

    let (_, location) = read(server.get("/api/journeys?location=milan", None).await?).await?;
    assert_eq!(titles(&location), vec!["Alps"]);

    let (_, dated) = read(server.get("/api/journeys?startDate=2024-02-01&endDate=2024-06-01", None).await?).await?;
    assert_eq!(titles(&dated), vec!["Coast"]);

    let (_, literal) = read(server.get("/api/journeys?search=%25", None).await?).await?;
    assert_eq!(literal["data"]["count"], 0);

    let res = server.get("/api/journeys?startDate=soon", None).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn every_fetch_counts_as_a_view() -> Result<()> {
    let server = TestServer::spawn().await?;
    let traveler = server.traveler("t@example.com").await?;
    let id = server.journey(&traveler.token, "Counted").await?["id"].as_str().unwrap_or_default().to_string();

    for _ in 0..3 {
        assert_eq!(server.get(&format!("/api/journeys/{}", id), None).await?.status(), StatusCode::OK);
    }
    // A bad token on a public route is ignored
    let (status, body) = read(server.get(&format!("/api/journeys/{}", id), Some("garbage")).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["journey"]["views"], 4);
    assert_eq!(body["data"]["journey"]["traveler"]["email"], "t@example.com");

    let (_, count) = read(server.get("/api/journeys/viewed/count", Some(&traveler.token)).await?).await?;
    assert_eq!(count["data"]["count"], 0);

    assert_eq!(server.get("/api/journeys/not-a-uuid", None).await?.status(), StatusCode::BAD_REQUEST);
    let unknown = format!("/api/journeys/{}", uuid::Uuid::new_v4());
    assert_eq!(server.get(&unknown, None).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_can_update_or_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.traveler("owner@example.com").await?;
    let other = server.traveler("other@example.com").await?;
    let id = server.journey(&owner.token, "Mine").await?["id"].as_str().unwrap_or_default().to_string();
    let path = format!("/api/journeys/{}", id);

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&other.token)
        .multipart(server.journey_form("Hijacked", &[]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.delete(server.url(&path)).bearer_auth(&other.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let form = multipart::Form::new()
        .text("title", "Mine, revised")
        .text("description", "Longer now")
        .text("startLocation", "Lisbon")
        .text("endLocation", "Faro")
        .text("startDate", "2024-01-01T12:00:00Z")
        .text("endDate", "2024-01-03T00:00:00Z")
        .text("budget", "luxury");
    let res = server.client.put(server.url(&path)).bearer_auth(&owner.token).multipart(form).send().await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["journey"]["title"], "Mine, revised");
    assert_eq!(body["data"]["journey"]["duration"], 2);
    assert_eq!(body["data"]["journey"]["budget"], "luxury");
    assert_eq!(body["data"]["journey"]["travelerId"], owner.id.as_str());

    let res = server.client.delete(server.url(&path)).bearer_auth(&owner.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.get(&path, None).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_only_retains_stored_media() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.traveler("owner@example.com").await?;

    let form = server
        .journey_form("Photos", &[])
        .part("files", multipart::Part::bytes(vec![1, 2, 3]).file_name("a.png").mime_str("image/png")?);
    let (_, created) = read(server.create_journey(&owner.token, form).await?).await?;
    let journey = &created["data"]["journey"];
    let path = format!("/api/journeys/{}", journey["id"].as_str().unwrap_or_default());
    let stored = journey["images"].to_string();

    let injected = server.journey_form("Photos", &[("existingImages", r#"["data:image/png;base64,ZXZpbA=="]"#)]);
    let res = server.client.put(server.url(&path)).bearer_auth(&owner.token).multipart(injected).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let kept = server
        .journey_form("Photos", &[("existingImages", stored.as_str())])
        .part("files", multipart::Part::bytes(vec![9]).file_name("b.gif").mime_str("image/gif")?);
    let res = server.client.put(server.url(&path)).bearer_auth(&owner.token).multipart(kept).send().await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::OK);
    let images = body["data"]["journey"]["images"].as_array().cloned().unwrap_or_default();
    assert_eq!(images.len(), 2);
    assert!(images[1].as_str().unwrap_or_default().starts_with("data:image/gif"));

    let dropped = server.journey_form("Photos", &[]);
    let res = server.client.put(server.url(&path)).bearer_auth(&owner.token).multipart(dropped).send().await?;
    let (_, body) = read(res).await?;
    assert_eq!(body["data"]["journey"]["images"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn my_journeys_lists_only_the_callers() -> Result<()> {
    let server = TestServer::spawn().await?;
    let a = server.traveler("a@example.com").await?;
    let b = server.traveler("b@example.com").await?;
    server.journey(&a.token, "A1").await?;
    server.journey(&a.token, "A2").await?;
    server.journey(&b.token, "B1").await?;

    let (status, body) = read(server.get("/api/journeys/my-journeys", Some(&a.token)).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(titles(&body), vec!["A2", "A1"]);
    Ok(())
}
