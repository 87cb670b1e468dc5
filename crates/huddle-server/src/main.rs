use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use huddle_api::{AppStateInner, router};
use huddle_core::auth::LogMailer;
use huddle_core::scheduler::Scheduler;
use huddle_core::users::PassthroughImages;
use huddle_store::snapshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("HUDDLE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HUDDLE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let data_path = PathBuf::from(
        std::env::var("HUDDLE_DATA_PATH").unwrap_or_else(|_| "huddle.json".into()),
    );
    let checkpoint_secs: u64 = std::env::var("HUDDLE_CHECKPOINT_SECS")
        .unwrap_or_else(|_| "30".into())
        .parse()?;

    let store = snapshot::load(&data_path)?.shared();
    let state = Arc::new(AppStateInner {
        store: store.clone(),
        scheduler: Scheduler::new(),
        mailer: Arc::new(LogMailer),
        images: Arc::new(PassthroughImages),
    });

    // Periodic checkpoint. Mutations never write the snapshot themselves;
    // this task is the only writer while the server runs.
    {
        let store = store.clone();
        let path = data_path.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(checkpoint_secs));
            interval.tick().await;
            loop {
                interval.tick().await;
                let result = {
                    let store = store.lock().unwrap();
                    snapshot::save(&path, &store)
                };
                if let Err(err) = result {
                    error!(%err, "checkpoint failed");
                }
            }
        });
    }

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!("huddle server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
