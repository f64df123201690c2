mod common;

use axum::http::Method;
use serde_json::json;

use common::{app_with, station};

fn two_stations() -> Vec<scavenger_hunt_back::dao::models::StationEntity> {
    vec![
        station("A", "Gate", &[("r1", "CAT", "B", "Head to the bench")]),
        station("B", "Bench", &[]),
    ]
}

#[tokio::test]
async fn correct_password_reveals_completion_message_at_sink() {
    let app = app_with(two_stations()).await;

    let (status, view) = app.send(Method::POST, "/hunt/sessions", None).await;
    assert_eq!(status, 201);
    assert_eq!(view["phase"], "unauthenticated");
    let id = view["session_id"].as_str().unwrap().to_owned();

    let (status, view) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/resolve"),
            Some(json!({"identifier": "A"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(view["phase"], "at_station");
    assert_eq!(view["station"]["id"], "A");
    assert!(view["station"].get("routes").is_none());

    let (status, view) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/password"),
            Some(json!({"password": "cat"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(view["phase"], "advanced");
    assert_eq!(view["station"]["id"], "B");
    assert_eq!(view["clue"]["text"], "Mission complete!");
}

#[tokio::test]
async fn wrong_password_is_unprocessable_and_keeps_station() {
    let app = app_with(two_stations()).await;
    let (_, view) = app.send(Method::POST, "/hunt/sessions?station=A", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/password"),
            Some(json!({"password": "DOG"})),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["message"], "incorrect password");

    let (_, view) = app
        .send(Method::GET, &format!("/hunt/sessions/{id}"), None)
        .await;
    assert_eq!(view["phase"], "at_station");
    assert_eq!(view["station"]["id"], "A");
}

#[tokio::test]
async fn clue_of_the_reached_station_is_revealed_with_its_video() {
    let mut reached = station(
        "B",
        "Bench",
        &[("A", "OWL", "C", "Look under the slide"), ("x", "y", "C", "ignored")],
    );
    reached.routes["A"].video_url =
        Some("https://drive.google.com/file/d/1a2B3c4D5e6F7g8H9i0JkLmNoPqRsTuV/view".into());
    let app = app_with(vec![
        station("A", "Gate", &[("START", "cat", "B", "")]),
        reached,
        station("C", "Slide", &[]),
    ])
    .await;

    let (_, view) = app.send(Method::POST, "/hunt/sessions?station=A", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();
    let (status, view) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/password"),
            Some(json!({"password": "CAT"})),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(view["clue"]["text"], "Look under the slide");
    assert_eq!(
        view["clue"]["video_embed_url"],
        "https://drive.google.com/file/d/1a2B3c4D5e6F7g8H9i0JkLmNoPqRsTuV/preview"
    );
}

#[tokio::test]
async fn scanning_a_generated_qr_payload_resolves_the_station() {
    let app = app_with(two_stations()).await;
    let (_, qr) = app
        .admin(Method::GET, "/admin/stations/B/qr", None)
        .await;
    let payload = qr["payload"].as_str().unwrap().to_owned();
    assert_eq!(payload, "https://hunt.example.com/?station=B");

    let (_, view) = app.send(Method::POST, "/hunt/sessions", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();
    let (status, view) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/scan"),
            Some(json!({"payload": payload})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(view["station"]["id"], "B");
}

#[tokio::test]
async fn bare_ids_and_unknown_codes_are_rejected() {
    let app = app_with(two_stations()).await;
    let (_, view) = app.send(Method::POST, "/hunt/sessions", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/scan"),
            Some(json!({"payload": "A"})),
        )
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/resolve"),
            Some(json!({"identifier": "ZZZ"})),
        )
        .await;
    assert_eq!(status, 404);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/resolve"),
            Some(json!({"identifier": "   "})),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn dangling_route_is_a_conflict_and_state_is_unchanged() {
    let app = app_with(vec![station("A", "Gate", &[("r1", "cat", "GHOST", "")])]).await;
    let (_, view) = app.send(Method::POST, "/hunt/sessions?station=A", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/password"),
            Some(json!({"password": "cat"})),
        )
        .await;
    assert_eq!(status, 409);

    let (_, view) = app
        .send(Method::GET, &format!("/hunt/sessions/{id}"), None)
        .await;
    assert_eq!(view["phase"], "at_station");
}

#[tokio::test]
async fn password_before_scan_is_a_conflict() {
    let app = app_with(two_stations()).await;
    let (_, view) = app.send(Method::POST, "/hunt/sessions", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/password"),
            Some(json!({"password": "CAT"})),
        )
        .await;
    assert_eq!(status, 409);
}

#[tokio::test]
async fn storage_outage_is_service_unavailable() {
    let app = app_with(two_stations()).await;
    let (_, view) = app.send(Method::POST, "/hunt/sessions", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();

    app.store.set_offline(true);
    let (status, _) = app
        .send(
            Method::POST,
            &format!("/hunt/sessions/{id}/resolve"),
            Some(json!({"identifier": "A"})),
        )
        .await;
    assert_eq!(status, 503);

    app.state.clear_station_store().await;
    let (status, health) = app.send(Method::GET, "/healthcheck", None).await;
    assert_eq!(status, 200);
    assert_eq!(health["status"], "degraded");
}

#[tokio::test]
async fn closed_session_is_not_found() {
    let app = app_with(two_stations()).await;
    let (_, view) = app.send(Method::POST, "/hunt/sessions", None).await;
    let id = view["session_id"].as_str().unwrap().to_owned();

    let (status, _) = app
        .send(Method::DELETE, &format!("/hunt/sessions/{id}"), None)
        .await;
    assert_eq!(status, 204);

    let (status, _) = app
        .send(Method::GET, &format!("/hunt/sessions/{id}"), None)
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn healthcheck_counts_open_sessions_and_docs_are_served() {
    let app = app_with(two_stations()).await;
    app.send(Method::POST, "/hunt/sessions", None).await;
    app.send(Method::POST, "/hunt/sessions", None).await;

    let (status, health) = app.send(Method::GET, "/healthcheck", None).await;
    assert_eq!(status, 200);
    assert_eq!(
        health,
        json!({"status": "ok", "store_reachable": true, "active_sessions": 2})
    );

    let (status, doc) = app.send(Method::GET, "/api-doc/openapi.json", None).await;
    assert_eq!(status, 200);
    assert!(doc["paths"].get("/hunt/sessions/{id}/password").is_some());
}
