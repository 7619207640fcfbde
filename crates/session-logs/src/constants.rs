// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Defaults for buffering and delivery.

use std::time::Duration;

/// Maximum number of entries held in memory between flushes.
///
/// Past this count the oldest entries are evicted first.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cadence of the background flush.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Per-request timeout for calls to the collector.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Collector API prefix used when `SESSION_LOGS_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Prefix of generated session identifiers.
pub const DEFAULT_SESSION_PREFIX: &str = "frontend";

pub(crate) const LOGS_PATH: &str = "/logs";
pub(crate) const CLEAR_LOGS_PATH: &str = "/logs/clear";

// Idle connections to the collector are recycled before typical LB timeouts.
pub(crate) const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(270);
pub(crate) const TCP_KEEPALIVE: Duration = Duration::from_secs(120);
