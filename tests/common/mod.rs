#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response},
};
use indexmap::IndexMap;
use scavenger_hunt_back::{
    config::AppConfig,
    dao::{
        models::{RouteEntity, StationEntity},
        station_store::memory::MemoryStationStore,
    },
    routes,
    state::{AppState, SharedState},
};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "let-me-in";
pub const BASE_URL: &str = "https://hunt.example.com/";

pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
    pub store: MemoryStationStore,
}

pub async fn app_with(stations: Vec<StationEntity>) -> TestApp {
    let config = AppConfig::default()
        .with_public_base_url(BASE_URL)
        .with_admin_token(ADMIN_TOKEN);
    let state = AppState::new(config).unwrap();
    let store = MemoryStationStore::with_stations(stations);
    state.set_station_store(Arc::new(store.clone())).await;

    TestApp {
        router: routes::router(state.clone()),
        state,
        store,
    }
}

pub fn station(id: &str, name: &str, routes: &[(&str, &str, &str, &str)]) -> StationEntity {
    let routes: IndexMap<String, RouteEntity> = routes
        .iter()
        .map(|(key, password, next, clue)| {
            (
                (*key).to_owned(),
                RouteEntity {
                    next_station: (*next).into(),
                    password: (*password).into(),
                    next_clue: (*clue).into(),
                    video_url: None,
                },
            )
        })
        .collect();
    StationEntity {
        id: id.into(),
        name: name.into(),
        routes,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        self.send_with(method, uri, body, None).await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        self.send_with(method, uri, body, Some(("x-admin-token", ADMIN_TOKEN)))
            .await
    }

    pub async fn send_with(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        header: Option<(&str, &str)>,
    ) -> (u16, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        (status, json_body(response).await)
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}
