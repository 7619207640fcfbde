// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process-wide session logger.
//!
//! Construct one [`SessionLogger`] at startup and hand clones to every
//! consumer; all clones share one buffer, one session id and one flush
//! cadence.
//!
//! ```rust,ignore
//! use session_logs::{Config, SessionLogger};
//!
//! let logger = SessionLogger::start(&Config::from_env()?);
//! logger.info("MatchCard", "rendered", None);
//! logger.error("api", "prediction submit failed", Some(json!({"status": 500})));
//!
//! // on cooperative shutdown
//! logger.shutdown().await;
//! ```
//!
//! # Delivery
//!
//! A batch leaves the buffer before it is sent. If the collector is down the
//! batch is reported on the `tracing` side channel and dropped; it is never
//! retried or re-queued. Entries logged while a send is in flight belong to
//! the next batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::field::display;
use tracing::{debug, error, info, warn};

use crate::buffer_service::{BufferHandle, BufferService};
use crate::config::Config;
use crate::entry::{ClearLogsRequest, Level, LogEntry, LogsRequest};
use crate::flusher::Flusher;
use crate::session::generate_session_id;
use crate::sink::LogSink;

/// Target of mirrored entries on the side channel.
pub const MIRROR_TARGET: &str = "session_logs::console";

/// Moves buffered entries to the sink.
#[derive(Clone)]
struct Shipper {
    handle: BufferHandle,
    sink: Arc<dyn LogSink>,
    session_id: Arc<str>,
}

impl Shipper {
    async fn flush(&self) {
        let batch = match self.handle.take().await {
            Ok(batch) => batch,
            Err(e) => {
                debug!("Skipping log flush: {}", e);
                return;
            }
        };
        if batch.is_empty() {
            return;
        }

        let count = batch.len();
        let request = LogsRequest {
            logs: batch,
            session_id: Some(self.session_id.to_string()),
        };
        match self.sink.ship(&request).await {
            Ok(()) => debug!("Shipped {} log entries", count),
            Err(e) => error!("Failed to ship {} log entries, batch dropped: {}", count, e),
        }
    }
}

async fn run_flush_loop(shipper: Shipper, period: Duration, cancel: CancellationToken) {
    let mut flush_interval = interval(period);
    flush_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    flush_interval.tick().await; // discard first tick, which is instantaneous

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = flush_interval.tick() => shipper.flush().await,
        }
    }
    debug!("Periodic log flush stopped");
}

/// Cheaply cloneable handle to the shared logger.
#[derive(Clone)]
pub struct SessionLogger {
    inner: Arc<Inner>,
}

struct Inner {
    shipper: Shipper,
    mirror_level: Option<Level>,
    cancel: CancellationToken,
    shut_down: AtomicBool,
    flush_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionLogger {
    /// Starts a logger shipping to the collector at `config.base_url`.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(config: &Config) -> Self {
        Self::with_sink(config, Arc::new(Flusher::new(config)))
    }

    /// Starts a logger delivering to an arbitrary sink.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_sink(config: &Config, sink: Arc<dyn LogSink>) -> Self {
        let (service, handle) = BufferService::new(config.capacity);
        tokio::spawn(service.run());

        let shipper = Shipper {
            handle,
            sink,
            session_id: Arc::from(generate_session_id(&config.session_prefix)),
        };
        let cancel = CancellationToken::new();
        let flush_task = tokio::spawn(run_flush_loop(
            shipper.clone(),
            config.flush_interval,
            cancel.clone(),
        ));

        debug!(
            "Session logger {} started, flushing every {} ms",
            shipper.session_id,
            config.flush_interval.as_millis()
        );

        SessionLogger {
            inner: Arc::new(Inner {
                shipper,
                mirror_level: config.mirror_level,
                cancel,
                shut_down: AtomicBool::new(false),
                flush_task: Mutex::new(Some(flush_task)),
            }),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.inner.shipper.session_id
    }

    pub fn info(
        &self,
        component: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        self.log(Level::Info, component, message, data);
    }

    pub fn warn(
        &self,
        component: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        self.log(Level::Warn, component, message, data);
    }

    pub fn error(
        &self,
        component: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        self.log(Level::Error, component, message, data);
    }

    pub fn debug(
        &self,
        component: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        self.log(Level::Debug, component, message, data);
    }

    /// Records an entry and returns immediately. Never fails.
    pub fn log(
        &self,
        level: Level,
        component: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        let entry =
            LogEntry::new(level, component, message, data).with_session_id(self.session_id());
        self.mirror(&entry);
        if self.inner.shipper.handle.append(entry).is_err() {
            debug!("Log buffer stopped, dropping entry");
        }
    }

    /// Ships everything buffered so far and waits for the attempt to finish.
    pub async fn flush(&self) {
        self.inner.shipper.flush().await;
    }

    /// Drops buffered entries and asks the collector to forget this session.
    pub async fn clear(&self) {
        if self.inner.shipper.handle.clear().is_err() {
            debug!("Log buffer stopped, nothing to clear");
        }
        let request = ClearLogsRequest {
            session_id: Some(self.session_id().to_string()),
        };
        if let Err(e) = self.inner.shipper.sink.clear(&request).await {
            error!("Failed to clear collector logs: {}", e);
        }
    }

    /// Number of entries waiting for the next flush.
    pub async fn pending(&self) -> usize {
        self.inner.shipper.handle.len().await.unwrap_or(0)
    }

    /// Stops the periodic flush, ships what is left and stops the buffer.
    ///
    /// Best effort: the final flush is a single attempt like any other.
    /// Subsequent calls do nothing, and entries logged afterwards are dropped.
    pub async fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        self.inner.cancel.cancel();
        let flush_task = self
            .inner
            .flush_task
            .lock()
            .ok()
            .and_then(|mut task| task.take());
        if let Some(task) = flush_task {
            if let Err(e) = task.await {
                debug!("Periodic log flush ended abnormally: {}", e);
            }
        }

        self.inner.shipper.flush().await;
        if self.inner.shipper.handle.shutdown().is_err() {
            debug!("Log buffer already stopped");
        }
        info!("Session logger {} shut down", self.session_id());
    }

    fn mirror(&self, entry: &LogEntry) {
        let Some(threshold) = self.inner.mirror_level else {
            return;
        };
        if entry.level() < threshold {
            return;
        }

        let data = entry.data().map(display);
        let marker = entry.level().marker();
        let (component, message) = (entry.component(), entry.message());
        match entry.level() {
            Level::Error => error!(target: MIRROR_TARGET, data, "{marker} [{component}] {message}"),
            Level::Warn => warn!(target: MIRROR_TARGET, data, "{marker} [{component}] {message}"),
            Level::Info => info!(target: MIRROR_TARGET, data, "{marker} [{component}] {message}"),
            Level::Debug => debug!(target: MIRROR_TARGET, data, "{marker} [{component}] {message}"),
        }
    }
}
