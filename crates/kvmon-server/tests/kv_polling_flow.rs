mod common;

use axum::http::StatusCode;
use common::{build_test_context, request, FakeConsul};
use kvmon_collector::{Fetcher, HttpFetcher, Supervisor};
use kvmon_common::{Target, TargetSet};
use kvmon_server::config::KvmonConfig;
use kvmon_storage::MetricStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn loopback_fetcher(addr: std::net::SocketAddr) -> Arc<dyn Fetcher> {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client should build");
    Arc::new(HttpFetcher::with_client(&format!("http://{addr}/"), client))
}

async fn wait_for_series(store: &MetricStore, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while store.len() < expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("pollers should fill the store");
}

#[tokio::test]
async fn pollers_fetch_from_kv_endpoint_and_expose_metrics() {
    let consul = FakeConsul::default();
    consul.set_body(
        "dc1",
        r#"[{"Key":"app/x","ModifyIndex":101,"Value":"MQ=="},{"Key":"app/y","ModifyIndex":"oops"}]"#,
    );
    consul.set_body("dc2", r#"[{"Key":"app/x","ModifyIndex":202}]"#);
    let addr = consul.spawn().await;

    let config = KvmonConfig::from_yaml_str(
        "dc:\n  dc1:\n    directories: [app]\n  dc2:\n    directories: [app]\n",
    )
    .unwrap();
    let ctx = build_test_context(config.targets().len());
    let shutdown = CancellationToken::new();
    let supervisor = Supervisor::start_with_fetcher(
        config.targets(),
        loopback_fetcher(addr),
        ctx.store.clone(),
        POLL_INTERVAL,
        shutdown,
    );

    wait_for_series(&ctx.store, 2).await;
    let (status, body, _) = request(&ctx.app, "GET", "/metrics").await;
    supervisor.shutdown().await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("consul_kv_modify_index{dc=\"dc1\",key=\"app/x\"} 101"));
    assert!(body.contains("consul_kv_modify_index{dc=\"dc2\",key=\"app/x\"} 202"));
    assert!(!body.contains("app/y"));

    let requests = consul.requests();
    assert!(requests.contains(&"/v1/kv/app/?recurse&dc=dc1".to_string()));
    assert!(requests.contains(&"/v1/kv/app/?recurse&dc=dc2".to_string()));
}

#[tokio::test]
async fn updated_index_replaces_previous_value() {
    let consul = FakeConsul::default();
    consul.set_body("dc1", r#"[{"Key":"svc/flag","ModifyIndex":5}]"#);
    let addr = consul.spawn().await;

    let store = Arc::new(MetricStore::new().unwrap());
    let supervisor = Supervisor::start_with_fetcher(
        TargetSet::from(vec![Target::new("dc1", "svc")]),
        loopback_fetcher(addr),
        store.clone(),
        POLL_INTERVAL,
        CancellationToken::new(),
    );
    wait_for_series(&store, 1).await;

    consul.set_body("dc1", r#"[{"Key":"svc/flag","ModifyIndex":6}]"#);
    tokio::time::timeout(Duration::from_secs(5), async {
        while store.snapshot()[0].value != 6.0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("new modify index should be picked up");
    supervisor.shutdown().await;

    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn missing_prefix_keeps_polling_without_storing() {
    let consul = FakeConsul::default();
    let addr = consul.spawn().await;

    let store = Arc::new(MetricStore::new().unwrap());
    let supervisor = Supervisor::start_with_fetcher(
        TargetSet::from(vec![Target::new("dc-missing", "nothing")]),
        loopback_fetcher(addr),
        store.clone(),
        POLL_INTERVAL,
        CancellationToken::new(),
    );

    // 404 with an empty body fails decoding; the poller must keep cycling.
    tokio::time::timeout(Duration::from_secs(5), async {
        while consul.requests().len() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("poller should retry after decode failures");
    supervisor.shutdown().await;

    assert!(store.is_empty());
}

#[tokio::test]
async fn unreachable_consul_does_not_stop_pollers() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = Arc::new(MetricStore::new().unwrap());
    let supervisor = Supervisor::start_with_fetcher(
        TargetSet::from(vec![Target::new("dc1", "app")]),
        loopback_fetcher(addr),
        store.clone(),
        POLL_INTERVAL,
        CancellationToken::new(),
    );

    tokio::time::sleep(POLL_INTERVAL * 3).await;
    assert_eq!(supervisor.poller_count(), 1);
    supervisor.shutdown().await;

    assert!(store.is_empty());
}
