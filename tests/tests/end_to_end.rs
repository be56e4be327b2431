mod utils;
#[allow(unused)]
use utils::*;

use mock_stack::{spawn_stack, spawn_stack_with, BackendOptions, GatewayOptions, Stack};
use orderbench::{
    render_table, Endpoint, Error, Harness, HarnessConfig, HttpBackend, TrialConfig,
};
use std::collections::HashMap;
use std::time::Duration;

fn harness(stack: &Stack) -> Harness<HttpBackend> {
    harness_with(
        stack,
        HarnessConfig {
            poll_interval: Duration::from_millis(20),
            completion_timeout: Some(Duration::from_secs(10)),
            max_attempts: None,
        },
    )
}

fn harness_with(stack: &Stack, config: HarnessConfig) -> Harness<HttpBackend> {
    Harness::new(
        HttpBackend::new(stack.gateway_url(), stack.backend_url()),
        config,
    )
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn sync_wave_is_processed_exactly_once() {
    init();
    let stack = spawn_stack().await;
    let harness = harness(&stack);

    let result = harness.run_trial(Endpoint::Sync, 25).await.unwrap();

    assert_eq!(result.failures, 0);
    assert_eq!(harness.check_backend().await.unwrap(), 25);
    assert!(result.processed_elapsed >= result.sent_elapsed);
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn async_wave_is_processed_exactly_once() {
    init();
    let stack = spawn_stack().await;
    let harness = harness(&stack);

    let result = harness.run_trial(Endpoint::Async, 25).await.unwrap();

    assert_eq!(result.failures, 0);
    assert_eq!(harness.check_backend().await.unwrap(), 25);
    assert!(result.processed_elapsed >= result.sent_elapsed);
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn async_returns_before_processing_finishes() {
    init();
    let stack = spawn_stack_with(
        BackendOptions {
            process_delay: Duration::from_millis(30),
            ..Default::default()
        },
        GatewayOptions::default(),
    )
    .await;

    let result = harness(&stack).run_trial(Endpoint::Async, 10).await.unwrap();

    // Acceptance is quick, while the queue drains one 30ms order at a time.
    assert!(result.sent_elapsed < Duration::from_millis(200));
    assert!(result.processed_elapsed >= Duration::from_millis(250));
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn sync_blocks_until_each_order_is_processed() {
    init();
    let stack = spawn_stack_with(
        BackendOptions {
            process_delay: Duration::from_millis(30),
            ..Default::default()
        },
        GatewayOptions::default(),
    )
    .await;

    let result = harness(&stack).run_trial(Endpoint::Sync, 10).await.unwrap();

    // Every submission waited for its own processing, so by the time the
    // wave is sent the counter is already caught up.
    assert!(result.mean_latency >= Duration::from_millis(30));
    assert!(result.processed_elapsed - result.sent_elapsed <= Duration::from_millis(100));
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn rejected_submissions_are_retried_until_accepted() {
    init();
    let stack = spawn_stack_with(
        BackendOptions::default(),
        GatewayOptions {
            fail_plan: HashMap::from([(2, 2)]),
            ..Default::default()
        },
    )
    .await;
    let harness = harness(&stack);

    let result = harness.run_trial(Endpoint::Sync, 10).await.unwrap();

    assert_eq!(result.failures, 2);
    assert_eq!(harness.check_backend().await.unwrap(), 10);
}

#[tokio::test]
async fn duplicate_submissions_are_rejected() -> anyhow::Result<()> {
    init();
    let stack = spawn_stack().await;
    let client = reqwest::Client::new();

    let url = stack.gateway_url().join("submitordersync/7")?;
    assert_eq!(
        client.post(url.clone()).send().await?.status(),
        reqwest::StatusCode::OK
    );
    assert_eq!(
        client.post(url).send().await?.status(),
        reqwest::StatusCode::BAD_REQUEST
    );

    // The same order number is fine on the other endpoint.
    let url = stack.gateway_url().join("submitorderasync/7")?;
    assert_eq!(
        client.post(url.clone()).send().await?.status(),
        reqwest::StatusCode::ACCEPTED
    );
    assert_eq!(
        client.post(url).send().await?.status(),
        reqwest::StatusCode::BAD_REQUEST
    );
    Ok(())
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn lost_async_work_fails_the_trial_instead_of_hanging() {
    init();
    let stack = spawn_stack_with(
        BackendOptions::default(),
        GatewayOptions {
            drop_async: true,
            ..Default::default()
        },
    )
    .await;
    let harness = harness_with(
        &stack,
        HarnessConfig {
            poll_interval: Duration::from_millis(20),
            completion_timeout: Some(Duration::from_millis(400)),
            max_attempts: None,
        },
    );

    let err = harness.run_trial(Endpoint::Async, 5).await.unwrap_err();

    assert!(matches!(
        err,
        Error::CompletionTimeout {
            expected: 5,
            observed: 0,
            ..
        }
    ));
}

#[tokio::test]
async fn already_busy_backend_only_counts_its_own_wave() -> anyhow::Result<()> {
    init();
    let stack = spawn_stack().await;

    // Seed traffic before the harness shows up.
    let client = reqwest::Client::new();
    for order in [900, 901, 902] {
        let url = stack
            .gateway_url()
            .join(&format!("submitordersync/{order}"))?;
        client.post(url).send().await?.error_for_status()?;
    }

    let harness = harness(&stack);
    assert_eq!(harness.check_backend().await?, 3);

    let result = harness.run_trial(Endpoint::Sync, 5).await?;

    assert_eq!(result.failures, 0);
    assert_eq!(harness.check_backend().await?, 8);
    Ok(())
}

#[tokio::test]
#[ntest::timeout(60_000)]
async fn full_comparison_matrix_renders_one_row_per_configuration() {
    init();
    let stack = spawn_stack().await;
    let harness = harness(&stack);

    let mut summaries = Vec::new();
    for endpoint in [Endpoint::Sync, Endpoint::Async] {
        for requests in [5, 10] {
            let config = TrialConfig::new(endpoint, requests, 2);
            summaries.push(harness.run_repeated(&config).await.unwrap());
        }
    }

    for summary in &summaries {
        assert!(summary.throughput_per_min > 0.);
    }

    let table = render_table(&summaries);
    assert_eq!(table, render_table(&summaries));
    assert_eq!(table.lines().count(), 6);
    assert!(table.lines().nth(2).unwrap().starts_with("sync"));
    assert!(table.lines().nth(4).unwrap().starts_with("async"));
}
