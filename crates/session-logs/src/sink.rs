// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Transport seam between the logger and the remote collector.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::entry::{ClearLogsRequest, LogsRequest};

#[derive(Debug, Error)]
pub enum ShippingError {
    /// The batch could not be turned into a request body. Data dropped.
    #[error("failed to prepare payload: {0}")]
    Payload(String),
    /// The collector was unreachable or answered with a non-success status.
    #[error("collector rejected request ({0:?}): {1}")]
    Destination(Option<StatusCode>, String),
}

impl ShippingError {
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ShippingError::Payload(_) => None,
            ShippingError::Destination(status, _) => *status,
        }
    }
}

/// Destination for flushed batches.
///
/// A call resolves once the delivery attempt is over. Implementations must
/// not retry: the caller treats every batch as delivered at most once.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn ship(&self, request: &LogsRequest) -> Result<(), ShippingError>;

    async fn clear(&self, request: &ClearLogsRequest) -> Result<(), ShippingError>;
}
