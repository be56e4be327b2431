use mock_stack::{spawn_backend, spawn_gateway, BackendOptions, GatewayOptions};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let backend = spawn_backend(
        "0.0.0.0:7354".parse().unwrap(),
        BackendOptions {
            process_delay: Duration::from_millis(25),
            jitter: Duration::from_millis(5),
        },
    )
    .await;
    let gateway = spawn_gateway(
        "0.0.0.0:7355".parse().unwrap(),
        backend,
        GatewayOptions::default(),
    )
    .await;

    info!(%backend, %gateway, "mock stack listening");
    std::future::pending::<()>().await;
}
