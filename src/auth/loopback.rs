//! Loopback redirect receiver
//!
//! Native apps receive the authorization code by letting the browser redirect
//! to a short-lived HTTP listener on 127.0.0.1. The listener answers the first
//! `/callback` request, hands its query parameters over and shuts down.

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::helpers::{build_loopback_redirect_uri, CallbackParams};
use super::provider::ProviderError;

type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

const CALLBACK_PAGE: &str = "<!doctype html><html><body>\
    <p>Login complete. You can return to the portal.</p>\
    </body></html>";

pub struct CallbackListener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl CallbackListener {
    /// Bind on 127.0.0.1; port 0 picks a free port
    pub async fn bind(port: u16) -> Result<Self, ProviderError> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn redirect_uri(&self) -> String {
        build_loopback_redirect_uri(self.addr.port())
    }

    /// Serve until the first callback arrives or `timeout` elapses
    pub async fn wait(self, timeout: Duration) -> Result<CallbackParams, ProviderError> {
        let Self { listener, addr } = self;
        let (tx, rx) = oneshot::channel();
        let slot: CallbackSlot = Arc::new(Mutex::new(Some(tx)));
        let app = Router::new()
            .route("/callback", get(callback_handler))
            .with_state(slot);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::debug!(addr = %addr, "Waiting for authorization callback");
        let received = tokio::time::timeout(timeout, rx).await;

        let _ = shutdown_tx.send(());
        // Give the browser its response before the listener goes away
        let _ = tokio::time::timeout(Duration::from_secs(2), server).await;

        match received {
            Ok(Ok(params)) => Ok(params),
            Ok(Err(_)) => Err(ProviderError::Cancelled),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "Timed out waiting for authorization callback"
                );
                Err(ProviderError::Timeout)
            }
        }
    }
}

async fn callback_handler(
    State(slot): State<CallbackSlot>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    tracing::info!(
        has_code = params.code.is_some(),
        has_error = params.error.is_some(),
        "OAuth callback received"
    );
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        let _ = sender.send(params);
    }
    Html(CALLBACK_PAGE)
}
