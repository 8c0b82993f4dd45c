use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use client_core::{Dashboard, FetchStatus, GatewaySettings, HttpGateway, RefreshOutcome};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

const API_KEY: &str = "flow-key";

#[derive(Clone)]
struct FakeGateway {
    rows: Arc<Vec<Value>>,
    fail_next: Arc<Mutex<bool>>,
}

fn fixture_rows() -> Vec<Value> {
    (0..25u64)
        .map(|i| {
            let (state, district) = match i % 5 {
                0 | 1 => ("StateA", "D1"),
                2 => ("StateA", "D2"),
                3 => ("StateB", "D3"),
                _ => ("StateB", "D4"),
            };
            json!({
                "date": format!("{:02}-03-2025", i + 1),
                "state": state,
                "district": district,
                "pincode": 400000 + i,
                "age_0_5": i,
                "age_5_17": i * 2,
                "age_18_greater": 1,
                "demo_age_5_17": 0,
                "demo_age_17_": 0,
                "bio_age_5_17": i % 3,
                "bio_age_17_": 0
            })
        })
        .collect()
}

async fn handle_records(
    State(gateway): State<FakeGateway>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("api-key").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "invalid api key" })),
        )
            .into_response();
    }
    {
        let mut fail = gateway.fail_next.lock().await;
        if *fail {
            *fail = false;
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": [{ "msg": "offset out of range" }] })),
            )
                .into_response();
        }
    }

    let offset: usize = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
    let state = query.get("filters[state]");
    let district = query.get("filters[district]");

    let matching = gateway
        .rows
        .iter()
        .filter(|row| state.map_or(true, |s| row["state"] == s.as_str()))
        .filter(|row| district.map_or(true, |d| row["district"] == d.as_str()))
        .cloned()
        .collect::<Vec<_>>();
    let data = matching
        .iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect::<Vec<_>>();

    Json(json!({
        "total": matching.len(),
        "offset": offset,
        "limit": limit,
        "data": data
    }))
    .into_response()
}

async fn handle_filters() -> Json<Value> {
    Json(json!({ "StateA": ["D1", "D2"], "StateB": ["D4", "D3"] }))
}

async fn spawn_fake_gateway() -> (String, FakeGateway) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let gateway = FakeGateway {
        rows: Arc::new(fixture_rows()),
        fail_next: Arc::new(Mutex::new(false)),
    };
    let app = Router::new()
        .route("/resource/records", get(handle_records))
        .route("/metadata/filters", get(handle_filters))
        .with_state(gateway.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), gateway)
}

fn dashboard_for(url: &str, api_key: &str) -> Arc<Dashboard> {
    let settings = GatewaySettings {
        gateway_url: url.to_string(),
        api_key: api_key.to_string(),
        records_path: "/resource/records".into(),
        filters_path: "/metadata/filters".into(),
        request_timeout_secs: Some(5),
    };
    let gateway = HttpGateway::new(&settings).expect("gateway");
    Dashboard::new(Arc::new(gateway))
}

#[tokio::test]
async fn browse_filter_and_paginate_against_gateway() {
    let (url, _) = spawn_fake_gateway().await;
    let dashboard = dashboard_for(&url, API_KEY);

    assert_eq!(dashboard.startup().await, RefreshOutcome::Committed);
    let view = dashboard.snapshot().await;
    assert_eq!(view.window_label(), "Showing 1 to 10 of 25 results");
    assert_eq!(view.state_options(), vec!["StateA", "StateB"]);
    assert_eq!(view.table_rows().len(), 10);
    assert!(view.can_go_next());
    assert!(!view.can_go_previous());

    assert_eq!(dashboard.next_page().await, RefreshOutcome::Committed);
    assert_eq!(dashboard.next_page().await, RefreshOutcome::Committed);
    let view = dashboard.snapshot().await;
    assert_eq!(view.window_label(), "Showing 21 to 25 of 25 results");
    assert_eq!(view.table_rows().len(), 5);
    assert_eq!(dashboard.next_page().await, RefreshOutcome::Ignored);

    dashboard.select_state("StateA").await;
    let view = dashboard.snapshot().await;
    assert_eq!(view.district_options(), vec!["D1", "D2"]);
    dashboard.select_district("D1").await.expect("district");
    assert_eq!(dashboard.apply_filters().await, RefreshOutcome::Committed);

    let view = dashboard.snapshot().await;
    assert_eq!(view.window_label(), "Showing 1 to 10 of 10 results");
    assert!(view
        .table_rows()
        .iter()
        .all(|row| row.location == "StateA › D1"));
    assert!(!view.can_go_next());
}

#[tokio::test]
async fn filter_with_no_matches_shows_empty_state() {
    let (url, _) = spawn_fake_gateway().await;
    let dashboard = dashboard_for(&url, API_KEY);

    dashboard.select_state("StateC").await;
    assert_eq!(dashboard.apply_filters().await, RefreshOutcome::Committed);

    let view = dashboard.snapshot().await;
    assert_eq!(view.window_label(), "No results");
    assert_eq!(
        view.empty_message(),
        Some("No records found matching your filters.")
    );
    assert!(!view.can_go_next());
    assert!(!view.can_go_previous());
}

#[tokio::test]
async fn gateway_error_keeps_previous_page_on_screen() {
    let (url, gateway) = spawn_fake_gateway().await;
    let dashboard = dashboard_for(&url, API_KEY);
    assert_eq!(dashboard.refresh(0).await, RefreshOutcome::Committed);
    let before = dashboard.page().await;

    *gateway.fail_next.lock().await = true;
    assert_eq!(
        dashboard.next_page().await,
        RefreshOutcome::Failed("offset out of range".into())
    );

    let view = dashboard.snapshot().await;
    assert_eq!(view.error_message(), Some("offset out of range"));
    assert_eq!(view.page, before);
    assert_eq!(view.query.offset(), 0);

    assert_eq!(dashboard.next_page().await, RefreshOutcome::Committed);
    assert_eq!(dashboard.status().await, FetchStatus::Success);
    assert_eq!(dashboard.query().await.offset(), 10);
}

#[tokio::test]
async fn wrong_api_key_surfaces_gateway_detail() {
    let (url, _) = spawn_fake_gateway().await;
    let dashboard = dashboard_for(&url, "wrong");

    assert_eq!(
        dashboard.refresh(0).await,
        RefreshOutcome::Failed("invalid api key".into())
    );
    assert_eq!(
        dashboard.status().await,
        FetchStatus::Error("invalid api key".into())
    );
}
