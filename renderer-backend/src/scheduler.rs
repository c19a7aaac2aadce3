//! Cooperative scheduling of renderer sessions
//!
//! Sessions are plain synchronous state machines. The scheduler owns them,
//! feeds them the notifications collected by the callback server and ticks
//! each one in turn. The callback server runs on a small tokio runtime owned
//! by the scheduler; nothing else is async.

use callback_server::{CallbackServer, EventRouter, NotificationPayload};
use player_state::StateSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::message::{CommandSender, SessionMessage};
use crate::session::RendererSession;

/// Where sessions register their event callback paths
#[derive(Debug, Clone)]
pub struct CallbackEndpoint {
    /// `http://<ip>:<port>` of the callback server
    pub base_url: String,
    pub router: EventRouter,
}

/// A unit of work driven by the [`Scheduler`]
pub trait Backend {
    fn name(&self) -> &str;

    /// Do whatever is due at `now`; returns whether any work was done
    fn on_tick(&mut self, now: Instant) -> bool;

    /// Handle a message outside of the backend's own queue
    fn on_event(&mut self, message: SessionMessage);

    /// Offer an inbound notification; returns `true` when it was consumed
    fn on_http(&mut self, notification: &NotificationPayload) -> bool;
}

/// Owns the callback server and every backend
pub struct Scheduler {
    backends: Vec<Box<dyn Backend>>,
    notifications: mpsc::UnboundedReceiver<NotificationPayload>,
    server: Option<CallbackServer>,
    callback: CallbackEndpoint,
    tick_interval: Duration,
    runtime: tokio::runtime::Runtime,
}

impl Scheduler {
    /// Start the callback server on the configured port range
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("renderer-callback")
            .enable_all()
            .build()
            .map_err(|e| BackendError::Config(format!("failed to start runtime: {}", e)))?;

        let (tx, notifications) = mpsc::unbounded_channel();
        let server = runtime.block_on(CallbackServer::new(config.callback_port_range, tx))?;
        let callback = CallbackEndpoint {
            base_url: server.base_url().to_string(),
            router: server.router().clone(),
        };
        info!(base_url = %callback.base_url, "scheduler started");

        Ok(Self {
            backends: Vec::new(),
            notifications,
            server: Some(server),
            callback,
            tick_interval: config.tick_interval,
            runtime,
        })
    }

    pub fn callback_endpoint(&self) -> &CallbackEndpoint {
        &self.callback
    }

    /// Bind a renderer and schedule it; returns its command handle
    pub fn connect(
        &mut self,
        location: &str,
        config: BackendConfig,
        sink: Box<dyn StateSink>,
    ) -> Result<CommandSender> {
        let session = RendererSession::connect(location, &self.callback, config, sink)?;
        let sender = session.command_sender();
        self.add(Box::new(session));
        Ok(sender)
    }

    pub fn add(&mut self, backend: Box<dyn Backend>) {
        debug!(backend = backend.name(), "backend added");
        self.backends.push(backend);
    }

    /// Remove the first backend called `name`
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Backend>> {
        let idx = self.backends.iter().position(|b| b.name() == name)?;
        debug!(backend = name, "backend removed");
        Some(self.backends.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Hand a notification to the first backend that consumes it
    pub fn deliver(&mut self, notification: &NotificationPayload) -> bool {
        let consumed = self.backends.iter_mut().any(|b| b.on_http(notification));
        if !consumed {
            trace!(path = %notification.path, "notification not claimed");
        }
        consumed
    }

    /// Deliver pending notifications, then tick every backend once
    pub fn run_once(&mut self, now: Instant) -> bool {
        let mut work = false;
        while let Ok(notification) = self.notifications.try_recv() {
            work |= self.deliver(&notification);
        }
        for backend in &mut self.backends {
            work |= backend.on_tick(now);
        }
        work
    }

    /// Run until `stop` is set, sleeping between idle rounds
    pub fn run_until(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            if !self.run_once(Instant::now()) {
                std::thread::sleep(self.tick_interval);
            }
        }
    }

    /// Drop every backend, then stop the callback server
    pub fn shutdown(mut self) {
        self.backends.clear();
        if let Some(server) = self.server.take() {
            self.runtime.block_on(server.shutdown());
        }
        info!("scheduler stopped");
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("backends", &self.backends.len())
            .field("callback", &self.callback.base_url)
            .finish()
    }
}
