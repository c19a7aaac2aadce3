//! HTTP server for receiving UPnP event notifications.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};
use warp::http::StatusCode;
use warp::Filter;

use super::error::CallbackError;
use super::router::{EventRouter, NotificationPayload};

/// HTTP callback server for receiving UPnP event notifications.
///
/// Binds to the first free port of a range and accepts `NOTIFY` on any
/// path. Requests whose path is registered with the [`EventRouter`] are
/// forwarded to the channel and answered `200 OK`; all others get
/// `412 Precondition Failed`, which tells the device to drop the
/// subscription.
///
/// # Example
///
/// ```no_run
/// use tokio::sync::mpsc;
/// use callback_server::{CallbackServer, NotificationPayload};
///
/// #[tokio::main]
/// async fn main() {
///     let (tx, mut rx) = mpsc::unbounded_channel::<NotificationPayload>();
///     let server = CallbackServer::new((3400, 3500), tx).await.unwrap();
///     server.router().register("/avt/1");
///
///     while let Some(notification) = rx.recv().await {
///         println!("event on {}", notification.path);
///     }
/// }
/// ```
pub struct CallbackServer {
    /// The port the server is bound to
    port: u16,
    /// The base URL for callback registration
    base_url: String,
    event_router: EventRouter,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl CallbackServer {
    /// Create and start a callback server advertising the detected local IP.
    ///
    /// Falls back to the loopback address when no outbound route exists.
    pub async fn new(
        port_range: (u16, u16),
        event_sender: mpsc::UnboundedSender<NotificationPayload>,
    ) -> Result<Self, CallbackError> {
        let local_ip = Self::detect_local_ip().unwrap_or_else(|| {
            warn!("failed to detect local IP address, advertising loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        });
        Self::with_advertised_ip(port_range, event_sender, local_ip).await
    }

    /// Create and start a callback server whose URLs use `advertised_ip`.
    ///
    /// A range of `(0, 0)` binds an ephemeral port.
    pub async fn with_advertised_ip(
        port_range: (u16, u16),
        event_sender: mpsc::UnboundedSender<NotificationPayload>,
        advertised_ip: IpAddr,
    ) -> Result<Self, CallbackError> {
        let (start, end) = port_range;
        let event_router = EventRouter::new(event_sender);

        let router = event_router.clone();
        let routes = warp::method()
            .and(warp::path::full())
            .and(warp::header::optional::<String>("sid"))
            .and(warp::header::optional::<String>("nt"))
            .and(warp::header::optional::<String>("nts"))
            .and(warp::header::optional::<String>("seq"))
            .and(warp::body::bytes())
            .and_then(
                move |method: warp::http::Method,
                      path: warp::path::FullPath,
                      sid: Option<String>,
                      nt: Option<String>,
                      nts: Option<String>,
                      seq: Option<String>,
                      body: bytes::Bytes| {
                    let router = router.clone();
                    async move {
                        if method.as_str() != "NOTIFY" {
                            return Err(warp::reject::custom(NotNotify));
                        }

                        trace!(path = path.as_str(), bytes = body.len(), sid = ?sid, "incoming NOTIFY");

                        if !validate_upnp_headers(&nt, &nts) {
                            debug!(path = path.as_str(), "invalid NT/NTS headers");
                            return Err(warp::reject::custom(InvalidUpnpHeaders));
                        }

                        let subscription_id = sid.ok_or_else(|| warp::reject::custom(UnknownSubscription))?;

                        let payload = NotificationPayload {
                            path: path.as_str().to_string(),
                            subscription_id,
                            seq: seq.and_then(|s| s.trim().parse().ok()),
                            event_xml: String::from_utf8_lossy(&body).into_owned(),
                        };

                        if router.route(payload) {
                            Ok(warp::reply::with_status("", StatusCode::OK))
                        } else {
                            Err(warp::reject::custom(UnknownSubscription))
                        }
                    }
                },
            )
            .recover(handle_rejection);

        for port in start..=end {
            let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);

            let bound = warp::serve(routes.clone()).try_bind_with_graceful_shutdown(addr, async move {
                let _ = shutdown_rx.await;
            });

            match bound {
                Ok((addr, server)) => {
                    let port = addr.port();
                    let base_url = format!("http://{}:{}", advertised_ip, port);
                    let server_handle = tokio::spawn(server);
                    info!(%base_url, "callback server listening");

                    return Ok(Self {
                        port,
                        base_url,
                        event_router,
                        shutdown_tx: Some(shutdown_tx),
                        server_handle: Some(server_handle),
                    });
                }
                Err(e) => trace!(port, error = %e, "port unavailable"),
            }
        }

        Err(CallbackError::NoAvailablePort { start, end })
    }

    /// Base URL for callback registration, `http://<local_ip>:<port>`.
    ///
    /// Subscriptions append their own path to it.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the port the server is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the event router that decides which paths are accepted.
    pub fn router(&self) -> &EventRouter {
        &self.event_router
    }

    /// Stop accepting requests and wait for in-flight ones to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
        debug!(port = self.port, "callback server stopped");
    }

    /// Detect the local IP address for callback URLs.
    ///
    /// Uses a UDP socket "connection" to find the address the OS would route
    /// outbound traffic from. No data is sent.
    fn detect_local_ip() -> Option<IpAddr> {
        let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        let local_addr = socket.local_addr().ok()?;
        Some(local_addr.ip())
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// NT and NTS are optional, but when both are present they must announce a
/// property change event.
fn validate_upnp_headers(nt: &Option<String>, nts: &Option<String>) -> bool {
    match (nt, nts) {
        (Some(nt), Some(nts)) => nt == "upnp:event" && nts == "upnp:propchange",
        _ => true,
    }
}

#[derive(Debug)]
struct InvalidUpnpHeaders;

impl warp::reject::Reject for InvalidUpnpHeaders {}

#[derive(Debug)]
struct UnknownSubscription;

impl warp::reject::Reject for UnknownSubscription {}

#[derive(Debug)]
struct NotNotify;

impl warp::reject::Reject for NotNotify {}

/// Handle rejections and convert them to HTTP responses.
async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if err.find::<UnknownSubscription>().is_some() {
        (StatusCode::PRECONDITION_FAILED, "Unknown subscription")
    } else if err.find::<InvalidUpnpHeaders>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid UPnP headers")
    } else if err.find::<NotNotify>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Only NOTIFY is accepted")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(warp::reply::with_status(message, code))
}
