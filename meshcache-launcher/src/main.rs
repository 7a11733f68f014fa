//! Reference launcher for `meshcache`.
//!
//! Restates `original_source/cmd/gocache/main.go`: a demo `scores` group
//! backed by a fixed in-memory map (`Tom:630, Jack:589, Sam:567`), one
//! HTTP peer server per node, an optional HTTP API front-end, and a
//! `--self-addr`/`--peers` flag pair standing in for the original's
//! `--port`/hardcoded `addrMap`. `clap`'s derive API (as used in
//! `cache-simulator`'s CLI) replaces the original's `flag` package;
//! `axum` plus a multi-thread `tokio` runtime (as in
//! `examples/cyberlife-coder-velesdb`'s server crate) replaces
//! `net/http`'s `ListenAndServe`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use clap::Parser;

use meshcache::byteview::ByteView;
use meshcache::group::Group;
use meshcache::registry;
use meshcache::router::PeerRouter;
use meshcache::transport::http::{handle_peer_request, HttpPeerClient};
use meshcache::PeerClient;

const GROUP_NAME: &str = "scores";
const REPLICAS: usize = 50;

/// Launches a meshcache node serving the demo `scores` group.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// This node's own address, e.g. http://127.0.0.1:8001. Must also
    /// appear in `--peers`.
    #[arg(long)]
    self_addr: String,

    /// Every node's address in the cluster, including this one, separated
    /// by commas.
    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,

    /// Also serve a plain HTTP API (`GET /api?key=...`) in front of the group.
    #[arg(long)]
    api: bool,

    /// Address for the optional API server.
    #[arg(long, default_value = "127.0.0.1:9999")]
    api_addr: String,
}

fn demo_db() -> HashMap<&'static str, &'static str> {
    HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
}

fn create_group() -> Arc<Group> {
    let db = demo_db();
    let loader = Arc::new(move |key: &str| -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(key, "slow db lookup");
        db.get(key)
            .map(|v| ByteView::from_str(v))
            .ok_or_else(|| format!("{key} not exist").into())
    });
    registry::new_group(GROUP_NAME, 2 << 10, loader).expect("scores group registered exactly once")
}

async fn serve_peer_request(
    AxumPath((group, key)): AxumPath<(String, String)>,
) -> impl IntoResponse {
    let response = handle_peer_request(&group, &key);
    (
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        response.body,
    )
}

#[derive(serde::Deserialize)]
struct ApiQuery {
    key: String,
}

async fn serve_api_request(
    State(group): State<Arc<Group>>,
    Query(query): Query<ApiQuery>,
) -> impl IntoResponse {
    match group.get(&query.key) {
        Ok(value) => (StatusCode::OK, value.as_slice().to_vec()),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string().into_bytes()),
    }
}

fn build_router(self_addr: &str, peers: &[String]) -> PeerRouter {
    let mut router = PeerRouter::new(self_addr, REPLICAS);
    let clients: HashMap<String, Arc<dyn PeerClient>> = peers
        .iter()
        .filter(|peer| peer.as_str() != self_addr)
        .map(|peer| {
            let client = HttpPeerClient::new(peer.clone()).expect("peer client builds");
            (peer.clone(), Arc::new(client) as Arc<dyn PeerClient>)
        })
        .collect();
    router.set(peers, clients);
    router
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let group = create_group();
    let peer_router = Arc::new(build_router(&args.self_addr, &args.peers));
    group.set_router(Arc::clone(&peer_router));

    if args.api {
        let api_group = Arc::clone(&group);
        let api_addr = args.api_addr.clone();
        tokio::spawn(async move {
            let app = Router::new()
                .route("/api", get(serve_api_request))
                .with_state(api_group);
            tracing::info!(addr = %api_addr, "api server listening");
            let listener = tokio::net::TcpListener::bind(&api_addr)
                .await
                .expect("api address binds");
            axum::serve(listener, app).await.expect("api server runs");
        });
    }

    let bind_addr = args
        .self_addr
        .strip_prefix("http://")
        .unwrap_or(&args.self_addr);
    let app = Router::new().route(
        &format!("{}:group/:key", meshcache::transport::BASE_PATH),
        get(serve_peer_request),
    );
    tracing::info!(addr = %bind_addr, "cache server listening");
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("self address binds");
    axum::serve(listener, app).await.expect("cache server runs");
}
