// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client-side session log buffering and delivery.
//!
//! A [`SessionLogger`] accepts fire-and-forget log calls, keeps the most
//! recent entries in a bounded in-memory buffer and ships them in batches to
//! a remote collector on a fixed cadence, on demand, and at shutdown.
//!
//! ```text
//!   info/warn/error/debug
//!            │  (non-blocking append)
//!            v
//!   ┌─────────────────┐
//!   │  BufferService  │  (bounded FIFO, swap-out on take)
//!   └────────┬────────┘
//!            │  flush: timer / flush() / shutdown()
//!            v
//!   ┌─────────────────┐
//!   │     LogSink     │  (HTTP POST {logs, sessionId})
//!   └─────────────────┘
//! ```
//!
//! Delivery is at-most-once: a batch is removed from the buffer before it is
//! sent and is never re-queued.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod buffer_service;
pub mod config;
pub mod constants;
pub mod entry;
pub mod flusher;
pub mod http;
pub mod logger;
pub mod session;
pub mod session_logger;
pub mod sink;

pub use config::Config;
pub use entry::{Level, LogEntry};
pub use session_logger::SessionLogger;
