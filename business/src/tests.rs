//! Integration tests running commands against a mock backend.

use std::time::Duration;

use synctime_states::StateCtx;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::{AuthCompute, AuthStatus, LoginCommand, LoginInput};
use crate::categories::{CatalogCompute, CatalogStatus, LoadCatalogCommand};
use crate::config::AppConfig;
use crate::health::{ApiHealth, CheckHealthCommand, HealthCompute};
use crate::records::{
    ListRecordsCommand, RecordsCompute, RecordsQuery, RecordsStatus,
};
use crate::routines::{ListRoutinesCommand, RoutinesCompute, RoutinesStatus, RoutinesQuery};

const TOKEN: &str = "test-token";

fn signed_in_ctx(server: &MockServer) -> StateCtx {
    let mut ctx = StateCtx::new();
    ctx.add_state(AppConfig::new(server.uri()));
    ctx.record_compute(AuthCompute {
        status: AuthStatus::Authenticated {
            username: "ada".to_owned(),
            token: TOKEN.to_owned(),
        },
    });
    ctx
}

/// Pumps the sync cycle until `done` returns true or the deadline passes.
async fn settle(ctx: &mut StateCtx, done: impl Fn(&StateCtx) -> bool) {
    for _ in 0..100 {
        ctx.sync_computes();
        if done(ctx) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    ctx.sync_computes();
}

#[tokio::test(flavor = "multi_thread")]
async fn login_success_stores_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": TOKEN,
            "username": "ada",
        })))
        .mount(&server)
        .await;

    let mut ctx = StateCtx::new();
    ctx.add_state(AppConfig::new(server.uri()));
    ctx.add_state(LoginInput {
        username: "ada".to_owned(),
        password: "secret".to_owned(),
    });
    ctx.record_compute(AuthCompute::default());

    ctx.enqueue_command::<LoginCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<AuthCompute>().is_some_and(|a| a.is_authenticated())
    })
    .await;

    let auth = ctx.cached::<AuthCompute>().expect("registered");
    assert_eq!(auth.username(), Some("ada"));
    assert_eq!(auth.token(), Some(TOKEN));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_maps_401_to_a_friendly_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut ctx = StateCtx::new();
    ctx.add_state(AppConfig::new(server.uri()));
    ctx.add_state(LoginInput {
        username: "ada".to_owned(),
        password: "wrong".to_owned(),
    });
    ctx.record_compute(AuthCompute::default());

    ctx.enqueue_command::<LoginCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<AuthCompute>()
            .is_some_and(|a| matches!(a.status, AuthStatus::Failed(_)))
    })
    .await;

    let auth = ctx.cached::<AuthCompute>().expect("registered");
    match &auth.status {
        AuthStatus::Failed(message) => assert_eq!(message, "Invalid username or password"),
        other => panic!("unexpected status: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_records_sends_the_month_scope_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/records"))
        .and(query_param("month", "10"))
        .and(query_param("year", "2025"))
        .and(bearer_token(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": "r1",
                "title": "Groceries",
                "amount": 42.5,
                "date": "2025-10-03",
                "record_type": "expense",
                "category_id": "c1",
                "status": "active",
                "custom_fields": {"vendor": "corner shop"},
                "created_at": "2025-10-03T09:00:00Z",
                "updated_at": "2025-10-03T09:00:00Z",
            }],
            "total": 1,
        })))
        .mount(&server)
        .await;

    let mut ctx = signed_in_ctx(&server);
    ctx.add_state(RecordsQuery {
        month: 10,
        year: 2025,
        category: None,
    });
    ctx.record_compute(RecordsCompute::default());

    ctx.enqueue_command::<ListRecordsCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<RecordsCompute>()
            .is_some_and(|r| matches!(r.status, RecordsStatus::Success(_)))
    })
    .await;

    let records = ctx.cached::<RecordsCompute>().expect("registered");
    let items = records.records();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title.as_str(), "Groceries");
    assert_eq!(
        items[0].custom_field("vendor").map(|v| v.display()),
        Some("corner shop".to_owned())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_records_without_a_session_fails_fast() {
    let server = MockServer::start().await;

    let mut ctx = StateCtx::new();
    ctx.add_state(AppConfig::new(server.uri()));
    ctx.add_state(RecordsQuery::default());
    ctx.record_compute(AuthCompute::default());
    ctx.record_compute(RecordsCompute::default());

    ctx.enqueue_command::<ListRecordsCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<RecordsCompute>()
            .is_some_and(|r| matches!(r.status, RecordsStatus::Error(_)))
    })
    .await;

    let records = ctx.cached::<RecordsCompute>().expect("registered");
    match &records.status {
        RecordsStatus::Error(message) => assert_eq!(message, "Not authenticated"),
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn catalog_loads_all_three_endpoint_groups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "c1", "name": "Food", "color": "#ff0000"}],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/record-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "t1", "name": "expense"}],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/custom-fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "f1", "name": "vendor", "kind": "text", "options": []}],
        })))
        .mount(&server)
        .await;

    let mut ctx = signed_in_ctx(&server);
    ctx.record_compute(CatalogCompute::default());

    ctx.enqueue_command::<LoadCatalogCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<CatalogCompute>()
            .is_some_and(|c| matches!(c.status, CatalogStatus::Success(_)))
    })
    .await;

    let catalog = ctx.cached::<CatalogCompute>().expect("registered");
    assert_eq!(catalog.categories().len(), 1);
    assert_eq!(catalog.record_types().len(), 1);
    assert_eq!(catalog.custom_fields()[0].column_key(), "custom_vendor");
}

#[tokio::test(flavor = "multi_thread")]
async fn routines_listing_is_month_scoped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/routines"))
        .and(query_param("month", "2"))
        .and(query_param("year", "2026"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": "r1",
                "title": "Water plants",
                "date": "2026-02-07",
                "done": false,
            }],
        })))
        .mount(&server)
        .await;

    let mut ctx = signed_in_ctx(&server);
    ctx.add_state(RoutinesQuery { month: 2, year: 2026 });
    ctx.record_compute(RoutinesCompute::default());

    ctx.enqueue_command::<ListRoutinesCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<RoutinesCompute>()
            .is_some_and(|r| matches!(r.status, RoutinesStatus::Success(_)))
    })
    .await;

    let routines = ctx.cached::<RoutinesCompute>().expect("registered");
    assert_eq!(routines.routines().len(), 1);
    assert_eq!(routines.routines()[0].title.as_str(), "Water plants");
}

#[tokio::test(flavor = "multi_thread")]
async fn health_probe_reports_up_and_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut ctx = StateCtx::new();
    ctx.add_state(AppConfig::new(server.uri()));
    ctx.record_compute(HealthCompute::default());

    ctx.enqueue_command::<CheckHealthCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<HealthCompute>()
            .is_some_and(|h| h.health == ApiHealth::Up)
    })
    .await;
    assert_eq!(
        ctx.cached::<HealthCompute>().map(|h| h.health),
        Some(ApiHealth::Up)
    );

    // A dead server flips the probe to Down.
    let mut ctx = StateCtx::new();
    ctx.add_state(AppConfig::new("http://127.0.0.1:1".to_owned()));
    ctx.record_compute(HealthCompute::default());
    ctx.enqueue_command::<CheckHealthCommand>();
    ctx.flush_commands();
    settle(&mut ctx, |ctx| {
        ctx.cached::<HealthCompute>()
            .is_some_and(|h| h.health == ApiHealth::Down)
    })
    .await;
    assert_eq!(
        ctx.cached::<HealthCompute>().map(|h| h.health),
        Some(ApiHealth::Down)
    );
}
