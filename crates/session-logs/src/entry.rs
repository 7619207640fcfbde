// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log records and the payloads exchanged with the collector.
//!
//! Entries serialize to the collector's camelCase shape:
//!
//! ```json
//! {
//!   "timestamp": "2025-03-01T12:00:00.000Z",
//!   "level": "warn",
//!   "component": "MatchCard",
//!   "message": "odds missing",
//!   "data": {"matchId": 42},
//!   "sessionId": "frontend-1740830400000-k3j9x0a1b"
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a [`LogEntry`].
///
/// Ordered from least to most severe so that a threshold can be compared
/// with `>=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl AsRef<str> for Level {
    fn as_ref(&self) -> &str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl Level {
    /// Marker prepended to console-mirrored lines.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Level::Error => "❌",
            Level::Warn => "⚠️",
            Level::Info | Level::Debug => "✅",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Case-insensitive parsing; `warning` is accepted as an alias of `warn`.
impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(format!(
                "Invalid log level: '{s}'. Valid levels are: debug, info, warn, error",
            )),
        }
    }
}

/// One diagnostic event.
///
/// Fields are private: an entry is fixed once built. The timestamp is taken
/// when the entry is created, not when it is flushed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(with = "iso_millis")]
    timestamp: DateTime<Utc>,
    level: Level,
    component: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

impl LogEntry {
    #[must_use]
    pub fn new(
        level: Level,
        component: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        LogEntry {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            data,
            session_id: None,
        }
    }

    /// Tags the entry with the session it belongs to.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

/// Body of `POST {base}/logs`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsRequest {
    pub logs: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Body of `POST {base}/logs/clear`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearLogsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// RFC 3339 in UTC with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level.as_ref().to_uppercase(),
            self.component,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_from_str() {
        assert_eq!(Level::from_str("info").unwrap(), Level::Info);
        assert_eq!(Level::from_str("WARN").unwrap(), Level::Warn);
        assert_eq!(Level::from_str("Warning").unwrap(), Level::Warn);
        assert_eq!(Level::from_str(" error ").unwrap(), Level::Error);
        assert_eq!(Level::from_str("debug").unwrap(), Level::Debug);
        assert!(Level::from_str("trace").is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_marker() {
        assert_eq!(Level::Error.marker(), "❌");
        assert_eq!(Level::Warn.marker(), "⚠️");
        assert_eq!(Level::Info.marker(), "✅");
    }

    #[test]
    fn test_entry_serializes_to_collector_shape() {
        let entry = LogEntry::new(
            Level::Warn,
            "MatchCard",
            "odds missing",
            Some(json!({"matchId": 42})),
        )
        .with_session_id("frontend-1-abc");

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["level"], "warn");
        assert_eq!(value["component"], "MatchCard");
        assert_eq!(value["message"], "odds missing");
        assert_eq!(value["data"], json!({"matchId": 42}));
        assert_eq!(value["sessionId"], "frontend-1-abc");

        let timestamp = value["timestamp"].as_str().unwrap();
        assert!(timestamp.ends_with('Z'));
        // 2025-03-01T12:00:00.000Z
        assert_eq!(timestamp.len(), 24);
    }

    #[test]
    fn test_entry_omits_absent_optionals() {
        let entry = LogEntry::new(Level::Info, "Navigation", "rendered", None);
        let value = serde_json::to_value(&entry).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("data"));
        assert!(!object.contains_key("sessionId"));
    }

    #[test]
    fn test_entry_deserializes_from_collector_shape() {
        let entry: LogEntry = serde_json::from_value(json!({
            "timestamp": "2025-03-01T12:00:00.123Z",
            "level": "error",
            "component": "api",
            "message": "request failed",
            "sessionId": "frontend-1-abc"
        }))
        .unwrap();

        assert_eq!(entry.level(), Level::Error);
        assert_eq!(entry.component(), "api");
        assert_eq!(entry.session_id(), Some("frontend-1-abc"));
        assert!(entry.data().is_none());
        assert_eq!(entry.timestamp().timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_timestamp_assigned_at_creation() {
        let before = Utc::now();
        let entry = LogEntry::new(Level::Debug, "c", "m", None);
        let after = Utc::now();
        assert!(entry.timestamp() >= before && entry.timestamp() <= after);
    }

    #[test]
    fn test_logs_request_shape() {
        let request = LogsRequest {
            logs: vec![LogEntry::new(Level::Info, "c", "m", None)],
            session_id: Some("s".to_string()),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["logs"].as_array().unwrap().len(), 1);
        assert_eq!(value["sessionId"], "s");

        let clear = serde_json::to_value(ClearLogsRequest { session_id: None }).unwrap();
        assert_eq!(clear, json!({}));
    }

    #[test]
    fn test_display() {
        let entry = LogEntry::new(Level::Warn, "Leaderboard", "empty page", None);
        let line = entry.to_string();
        assert!(line.ends_with("[WARN] [Leaderboard] empty page"));
    }
}
