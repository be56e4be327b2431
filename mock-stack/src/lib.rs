//! In-process stand-ins for the order gateway and backend.
//!
//! Same topology as the real pair: the gateway fronts the two submission
//! endpoints and the backend owns the processed-order counter. The sync
//! endpoint forwards an order and blocks until the backend is done with it;
//! the async endpoint queues the order to a consumer task and returns
//! immediately. Knobs exist for processing delay, per-order rejection and
//! message dropping, so failure paths can be driven deterministically.

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use rand_distr::{Distribution, Normal};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
#[allow(unused)]
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

/** Backend **/

/// Backend tuning.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    /// Simulated per-order processing time.
    pub process_delay: Duration,
    /// Standard deviation of the jitter added to `process_delay`.
    pub jitter: Duration,
}

impl BackendOptions {
    fn sample_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.process_delay;
        }
        let normal = Normal::new(self.process_delay.as_secs_f64(), self.jitter.as_secs_f64())
            .expect("delay and jitter must be finite");
        Duration::from_secs_f64(normal.sample(&mut rand::thread_rng()).max(0.))
    }
}

struct BackendState {
    counter: AtomicU64,
    opts: BackendOptions,
}

/// Spawn the backend on `addr` (use port 0 for an ephemeral port) and
/// return the address it actually bound.
pub async fn spawn_backend(addr: SocketAddr, opts: BackendOptions) -> SocketAddr {
    let state = Arc::new(BackendState {
        counter: AtomicU64::new(0),
        opts,
    });
    let app = Router::new()
        .route("/sendorder/:order", post(send_order))
        .route("/ordercount", get(order_count))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

#[debug_handler]
async fn send_order(State(state): State<Arc<BackendState>>, Path(order): Path<u64>) -> String {
    let delay = state.opts.sample_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    state.counter.fetch_add(1, Ordering::Relaxed);
    let id = Uuid::new_v4();
    debug!(order, %id, "order processed");
    id.to_string()
}

#[debug_handler]
async fn order_count(State(state): State<Arc<BackendState>>) -> String {
    state.counter.load(Ordering::Relaxed).to_string()
}

/** Gateway **/

/// Gateway tuning.
#[derive(Debug, Clone, Default)]
pub struct GatewayOptions {
    /// Reject the first N submission attempts of an order with a 500,
    /// keyed by order id.
    pub fail_plan: HashMap<u64, u64>,
    /// Accept async submissions but never deliver them to the backend.
    pub drop_async: bool,
}

struct GatewayState {
    client: reqwest::Client,
    backend: Url,
    seen: Mutex<HashSet<String>>,
    remaining_failures: Mutex<HashMap<u64, u64>>,
    queue: UnboundedSender<u64>,
}

impl GatewayState {
    /// Duplicate submissions are a client bug; surface them loudly.
    fn check_duplicate(&self, variant: &str, order: u64) -> Result<(), (StatusCode, String)> {
        let key = format!("{variant}_{order}");
        if self.seen.lock().unwrap().contains(&key) {
            warn!(order, variant, "duplicate submission");
            return Err((
                StatusCode::BAD_REQUEST,
                format!("order {order} already submitted"),
            ));
        }
        Ok(())
    }

    fn mark_seen(&self, variant: &str, order: u64) {
        self.seen
            .lock()
            .unwrap()
            .insert(format!("{variant}_{order}"));
    }

    fn check_fail_plan(&self, order: u64) -> Result<(), (StatusCode, String)> {
        let mut plan = self.remaining_failures.lock().unwrap();
        if let Some(remaining) = plan.get_mut(&order) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "injected failure".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Spawn the gateway on `addr`, forwarding to the backend at `backend`.
/// Returns the address it actually bound.
pub async fn spawn_gateway(
    addr: SocketAddr,
    backend: SocketAddr,
    opts: GatewayOptions,
) -> SocketAddr {
    let backend: Url = format!("http://{backend}/").parse().unwrap();
    let client = reqwest::Client::new();
    let (tx, rx) = mpsc::unbounded_channel();

    if opts.drop_async {
        tokio::spawn(black_hole(rx));
    } else {
        tokio::spawn(consume_queue(client.clone(), backend.clone(), rx));
    }

    let state = Arc::new(GatewayState {
        client,
        backend,
        seen: Mutex::new(HashSet::new()),
        remaining_failures: Mutex::new(opts.fail_plan),
        queue: tx,
    });
    let app = Router::new()
        .route("/submitordersync/:order", post(submit_sync))
        .route("/submitorderasync/:order", post(submit_async))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

#[debug_handler]
async fn submit_sync(
    State(state): State<Arc<GatewayState>>,
    Path(order): Path<u64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.check_duplicate("SYNC", order)?;
    state.check_fail_plan(order)?;

    match forward(&state.client, &state.backend, order).await {
        Ok(()) => {
            state.mark_seen("SYNC", order);
            debug!(order, "order processed synchronously");
            Ok(StatusCode::OK)
        }
        Err(err) => {
            warn!(order, "backend rejected order: {err}");
            Err((StatusCode::BAD_GATEWAY, "backend unavailable".to_string()))
        }
    }
}

#[debug_handler]
async fn submit_async(
    State(state): State<Arc<GatewayState>>,
    Path(order): Path<u64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.check_duplicate("ASYNC", order)?;
    state.check_fail_plan(order)?;

    // The receiver half lives for as long as the gateway does.
    let _ = state.queue.send(order);
    state.mark_seen("ASYNC", order);
    debug!(order, "order queued");
    Ok(StatusCode::ACCEPTED)
}

/// Drains the queue one order at a time, the way a single consumer on a
/// message bus would, retrying an order until the backend takes it.
async fn consume_queue(client: reqwest::Client, backend: Url, mut rx: UnboundedReceiver<u64>) {
    while let Some(order) = rx.recv().await {
        loop {
            match forward(&client, &backend, order).await {
                Ok(()) => break,
                Err(err) => {
                    warn!(order, "delivery failed, retrying: {err}");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

async fn black_hole(mut rx: UnboundedReceiver<u64>) {
    while rx.recv().await.is_some() {}
}

async fn forward(client: &reqwest::Client, backend: &Url, order: u64) -> Result<(), reqwest::Error> {
    let url = backend.join(&format!("sendorder/{order}")).unwrap();
    client.post(url).send().await?.error_for_status()?;
    Ok(())
}

/** Full stack **/

/// Addresses of a running gateway/backend pair.
#[derive(Debug, Copy, Clone)]
pub struct Stack {
    pub backend_addr: SocketAddr,
    pub gateway_addr: SocketAddr,
}

impl Stack {
    pub fn backend_url(&self) -> Url {
        format!("http://{}/", self.backend_addr).parse().unwrap()
    }

    pub fn gateway_url(&self) -> Url {
        format!("http://{}/", self.gateway_addr).parse().unwrap()
    }
}

/// Spawn both services on ephemeral loopback ports with default options.
pub async fn spawn_stack() -> Stack {
    spawn_stack_with(BackendOptions::default(), GatewayOptions::default()).await
}

/// Spawn both services on ephemeral loopback ports.
pub async fn spawn_stack_with(backend: BackendOptions, gateway: GatewayOptions) -> Stack {
    let backend_addr = spawn_backend(ephemeral(), backend).await;
    let gateway_addr = spawn_gateway(ephemeral(), backend_addr, gateway).await;
    Stack {
        backend_addr,
        gateway_addr,
    }
}

fn ephemeral() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}
