use anyhow::Context;
use clap::Parser;
use mock_stack::{BackendOptions, GatewayOptions};
use orderbench::{
    render_table, Endpoint, Harness, HarnessConfig, HttpBackend, TrialConfig, TrialSummary,
};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Benchmark synchronous against asynchronous order submission.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Gateway base URL, serving the submission endpoints.
    #[arg(long, default_value = "http://127.0.0.1:7355/")]
    gateway: Url,

    /// Backend base URL, serving /ordercount.
    #[arg(long, default_value = "http://127.0.0.1:7354/")]
    backend: Url,

    /// Concurrent submissions per trial. Repeat the flag for several tiers.
    #[arg(short, long = "requests", default_values_t = [100])]
    requests: Vec<u32>,

    /// Trials to run and average per configuration.
    #[arg(long, default_value_t = 3)]
    repeats: u32,

    /// Pause between order-count polls, e.g. "100ms".
    #[arg(long, value_parser = humantime::parse_duration, default_value = "100ms")]
    poll_interval: Duration,

    /// Fail a trial when the backend has not caught up within this span.
    #[arg(long, value_parser = humantime::parse_duration, default_value = "60s")]
    completion_timeout: Duration,

    /// Wait for the backend indefinitely instead of applying
    /// --completion-timeout.
    #[arg(long)]
    no_completion_timeout: bool,

    /// Give up on an order after this many attempts instead of retrying
    /// until it is accepted.
    #[arg(long)]
    max_attempts: Option<NonZeroU32>,

    /// Spin up an in-process mock stack and benchmark against it.
    #[arg(long)]
    with_mock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = Args::parse();

    if args.with_mock {
        let stack = mock_stack::spawn_stack_with(
            BackendOptions {
                process_delay: Duration::from_millis(25),
                jitter: Duration::from_millis(5),
            },
            GatewayOptions::default(),
        )
        .await;
        info!(backend = %stack.backend_addr, gateway = %stack.gateway_addr, "mock stack up");
        args.gateway = stack.gateway_url();
        args.backend = stack.backend_url();
    }

    let config = HarnessConfig {
        poll_interval: args.poll_interval,
        completion_timeout: (!args.no_completion_timeout).then_some(args.completion_timeout),
        max_attempts: args.max_attempts,
    };
    let harness = Harness::new(
        HttpBackend::new(args.gateway.clone(), args.backend.clone()),
        config,
    );

    let count = harness
        .check_backend()
        .await
        .with_context(|| format!("backend unreachable at {}", args.backend))?;
    info!(count, "backend reachable");

    let mut summaries: Vec<TrialSummary> = Vec::new();
    for endpoint in [Endpoint::Sync, Endpoint::Async] {
        for &requests in &args.requests {
            info!(%endpoint, requests, repeats = args.repeats, "running configuration");
            let trial = TrialConfig::new(endpoint, requests, args.repeats);
            match harness.run_repeated(&trial).await {
                Ok(summary) => summaries.push(summary),
                Err(err) => {
                    error!(%endpoint, requests, "configuration failed, skipping: {err}")
                }
            }
        }
    }

    println!("{}", render_table(&summaries));
    Ok(())
}
