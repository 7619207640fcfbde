// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Actor owning the log buffer.
//!
//! Every mutation of the buffer runs on the single service task, one command
//! at a time, so a take is atomic with respect to appends:
//!
//! ```text
//!    ┌──────────────┐
//!    │ BufferHandle │ (cloned into every producer)
//!    └──────┬───────┘
//!           │ Append / Take / Clear via unbounded channel
//!           v
//!    ┌──────────────┐
//!    │BufferService │ (single consumer)
//!    └──────┬───────┘
//!           │ owns
//!           v
//!    ┌──────────────┐
//!    │  LogBuffer   │
//!    └──────────────┘
//! ```
//!
//! The channel is FIFO per sender: an entry appended before a `take` from the
//! same task is always part of that take.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::buffer::LogBuffer;
use crate::entry::LogEntry;

#[derive(Debug)]
pub enum BufferCommand {
    /// Append one entry, evicting the oldest if full.
    Append(LogEntry),
    /// Swap out every pending entry.
    Take(oneshot::Sender<Vec<LogEntry>>),
    /// Drop every pending entry.
    Clear,
    /// Report the number of pending entries.
    Len(oneshot::Sender<usize>),
    Shutdown,
}

/// Cloneable handle sending commands to the [`BufferService`].
#[derive(Clone, Debug)]
pub struct BufferHandle {
    tx: mpsc::UnboundedSender<BufferCommand>,
}

impl BufferHandle {
    /// Queues an entry without waiting.
    ///
    /// Fails only once the service has stopped.
    pub fn append(&self, entry: LogEntry) -> Result<(), mpsc::error::SendError<BufferCommand>> {
        self.tx.send(BufferCommand::Append(entry))
    }

    /// Removes and returns every pending entry in insertion order.
    pub async fn take(&self) -> Result<Vec<LogEntry>, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(BufferCommand::Take(response_tx))
            .map_err(|e| format!("Failed to send take command: {e}"))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive take response: {e}"))
    }

    pub fn clear(&self) -> Result<(), mpsc::error::SendError<BufferCommand>> {
        self.tx.send(BufferCommand::Clear)
    }

    pub async fn len(&self) -> Result<usize, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(BufferCommand::Len(response_tx))
            .map_err(|e| format!("Failed to send len command: {e}"))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive len response: {e}"))
    }

    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<BufferCommand>> {
        self.tx.send(BufferCommand::Shutdown)
    }
}

pub struct BufferService {
    buffer: LogBuffer,
    rx: mpsc::UnboundedReceiver<BufferCommand>,
}

impl BufferService {
    /// Returns the service (to be spawned) and a handle to it.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, BufferHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            buffer: LogBuffer::new(capacity),
            rx,
        };
        (service, BufferHandle { tx })
    }

    /// Processes commands until `Shutdown` or until every handle is dropped.
    pub async fn run(mut self) {
        debug!(
            "Log buffer service started with capacity {}",
            self.buffer.capacity()
        );

        while let Some(command) = self.rx.recv().await {
            match command {
                BufferCommand::Append(entry) => self.buffer.push(entry),
                BufferCommand::Take(response_tx) => {
                    let (entries, evicted) = self.buffer.take();
                    if evicted > 0 {
                        debug!(
                            "Log buffer full ({} entries), dropped {} oldest entries",
                            self.buffer.capacity(),
                            evicted
                        );
                    }
                    if response_tx.send(entries).is_err() {
                        error!("Failed to send take response - receiver dropped");
                    }
                }
                BufferCommand::Clear => self.buffer.clear(),
                BufferCommand::Len(response_tx) => {
                    if response_tx.send(self.buffer.len()).is_err() {
                        error!("Failed to send len response - receiver dropped");
                    }
                }
                BufferCommand::Shutdown => {
                    debug!("Log buffer service shutting down");
                    break;
                }
            }
        }

        debug!("Log buffer service stopped");
    }
}
