// system-tests/tests/helpers/stub_server.rs
// ============================================================================
// Module: Stub Server
// Description: Runs an axum router on a dedicated thread for system-tests.
// Purpose: Host in-process service stubs with graceful shutdown on drop.
// Dependencies: axum, tokio, url
// ============================================================================

use std::net::TcpListener as StdTcpListener;
use std::thread;

use axum::Router;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use url::Url;

/// Handle for a running stub; dropping it stops the server.
pub struct StubServer {
    base_url: Url,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubServer {
    /// Returns the stub base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Serves `app` on an ephemeral loopback port; `base_path` is appended to the
/// origin to form the base URL (for example `/` or `/tasks`).
pub fn spawn_router(app: Router, base_path: &str) -> Result<StubServer, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("stub listener nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("stub local addr failed: {err}"))?;
    let base_url = Url::parse(&format!("http://{addr}{base_path}"))
        .map_err(|err| format!("stub base url invalid: {err}"))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(StubServer {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

/// Returns a loopback URL with nothing listening behind it.
pub fn unreachable_url(base_path: &str) -> Result<Url, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("probe bind failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("probe local addr failed: {err}"))?;
    drop(listener);
    Url::parse(&format!("http://{addr}{base_path}")).map_err(|err| err.to_string())
}
