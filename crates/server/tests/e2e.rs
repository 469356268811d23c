use std::net::SocketAddr;

use configs::PasswordHashing;
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use server::{routes, state::ServerState};
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::cors::CorsLayer;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_url("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await?;
    let state = ServerState::new(db, PasswordHashing::Argon2);

    let app = routes::build_router(state, CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_create_and_fetch_user_hashes_password() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/users", app.base_url))
        .json(&json!({"name": "Ann", "email": "a@x.com", "password": "secret"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["name"], "Ann");
    assert!(created.get("password").is_none(), "{created}");

    let res = client.get(format!("{}/users/{}", app.base_url, created["id"])).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);
    Ok(())
}

#[tokio::test]
async fn e2e_shutdown_signal_stops_server_cleanly() -> anyhow::Result<()> {
    let db = models::db::connect_url("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await?;
    let app = routes::build_router(ServerState::new(db, PasswordHashing::Plaintext), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(server::serve(listener, app, async move {
        stopped.await.ok();
    }));

    let res = reqwest::get(format!("{base_url}/health")).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    res.json::<Value>().await?;

    stop.send(()).ok();
    let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), server).await??;
    assert!(outcome.is_ok(), "{outcome:?}");
    assert!(reqwest::get(format!("{base_url}/health")).await.is_err());
    Ok(())
}
