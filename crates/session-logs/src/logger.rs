// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tracing formatter for the side channel.
//!
//! Lines look like:
//!
//! ```text
//! SESSION_LOGS | WARN | ⚠️ [MatchCard] odds missing data={"matchId":42}
//! SESSION_LOGS | ERROR | Failed to ship 12 log entries, batch dropped: ...
//! ```
//!
//! so that diagnostics of the logger itself are easy to tell apart from the
//! host's own output.
//!
//! Two kinds of event reach it. Mirrored entries carry the target
//! `session_logs::console`, a level marker, the component in brackets and
//! the entry's `data` as a field. Everything else is the logger reporting on
//! itself: failed shipments, evictions, start and shutdown.
//!
//! # Usage
//!
//! ```rust,ignore
//! use session_logs::logger::Formatter;
//!
//! let subscriber = tracing_subscriber::fmt::Subscriber::builder()
//!     .event_format(Formatter)
//!     .with_writer(std::io::stderr)
//!     .finish();
//! tracing::subscriber::set_global_default(subscriber)?;
//! ```
//!
//! A host that filters on `SESSION_LOGS` sees only this crate's lines.

use std::fmt;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;

pub const PREFIX: &str = "SESSION_LOGS";

/// Formats `SESSION_LOGS | LEVEL | span{fields}: message fields`.
///
/// Parts, in order:
///
/// 1. **Prefix**: always [`PREFIX`]
/// 2. **Level**: the `tracing` level (`ERROR`, `WARN`, `INFO`, `DEBUG`, `TRACE`)
/// 3. **Spans**: every active span from the root, with its fields in braces
/// 4. **Message and fields**: the event itself
///
/// A mirrored warning and a failed flush inside a span render as:
///
/// ```text
/// SESSION_LOGS | WARN | ⚠️ [MatchCard] odds missing data={"matchId":42}
/// SESSION_LOGS | ERROR | flush{batch=12}: Failed to ship 12 log entries, batch dropped: ...
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(&mut writer, "{PREFIX} | {} | ", event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
