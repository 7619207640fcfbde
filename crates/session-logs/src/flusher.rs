// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP delivery of log batches to the collector.
//!
//! ```text
//!   LogsRequest
//!       │
//!       v
//!   ┌─────────────┐
//!   │  Serialize  │ (JSON)
//!   └──────┬──────┘
//!          v
//!   ┌─────────────┐
//!   │  Compress   │ (optional zstd)
//!   └──────┬──────┘
//!          v
//!   ┌─────────────┐
//!   │  HTTP POST  │ (single attempt)
//!   └─────────────┘
//! ```
//!
//! There is no retry: a failed attempt is reported to the caller, which
//! drops the batch.

use std::io::Write;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;
use zstd::stream::write::Encoder;

use crate::config::Config;
use crate::entry::{ClearLogsRequest, LogsRequest};
use crate::http::get_client;
use crate::sink::{LogSink, ShippingError};

#[derive(Debug, Clone)]
pub struct Flusher {
    client: reqwest::Client,
    logs_url: String,
    clear_logs_url: String,
    compression_level: Option<i32>,
}

impl Flusher {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Flusher {
            client: get_client(config),
            logs_url: config.logs_url(),
            clear_logs_url: config.clear_logs_url(),
            compression_level: config.compression_level,
        }
    }

    fn create_request<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<reqwest::RequestBuilder, ShippingError> {
        let body = serde_json::to_vec(payload).map_err(|e| ShippingError::Payload(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = match self.compression_level {
            Some(level) => match encode(&body, level) {
                Ok(compressed) => {
                    headers.insert(CONTENT_ENCODING, HeaderValue::from_static("zstd"));
                    compressed
                }
                Err(e) => {
                    debug!("Failed to compress log batch, sending uncompressed: {}", e);
                    body
                }
            },
            None => body,
        };

        Ok(self.client.post(url).headers(headers).body(body))
    }

    async fn send(req: reqwest::RequestBuilder) -> Result<(), ShippingError> {
        let time = Instant::now();
        let resp = req.send().await;
        let elapsed = time.elapsed();

        match resp {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    debug!(
                        "Collector accepted request with {} in {} ms",
                        status,
                        elapsed.as_millis()
                    );
                    return Ok(());
                }
                let body = resp.text().await.unwrap_or_default();
                Err(ShippingError::Destination(Some(status), body))
            }
            Err(e) => Err(ShippingError::Destination(
                e.status(),
                format!("request failed after {} ms: {e}", elapsed.as_millis()),
            )),
        }
    }
}

#[async_trait]
impl LogSink for Flusher {
    async fn ship(&self, request: &LogsRequest) -> Result<(), ShippingError> {
        let req = self.create_request(&self.logs_url, request)?;
        Self::send(req).await
    }

    async fn clear(&self, request: &ClearLogsRequest) -> Result<(), ShippingError> {
        let req = self.create_request(&self.clear_logs_url, request)?;
        Self::send(req).await
    }
}

fn encode(data: &[u8], level: i32) -> std::io::Result<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::new(), level)?;
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Level, LogEntry};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::io::Read;

    fn config_for(url: String) -> Config {
        Config {
            base_url: url,
            ..Config::default()
        }
    }

    fn request(messages: &[&str]) -> LogsRequest {
        LogsRequest {
            logs: messages
                .iter()
                .map(|m| LogEntry::new(Level::Info, "test", *m, None).with_session_id("s-1"))
                .collect(),
            session_id: Some("s-1".to_string()),
        }
    }

    #[test]
    fn test_flusher_urls() {
        let flusher = Flusher::new(&config_for("http://collector:8000/api/v1".to_string()));
        assert_eq!(flusher.logs_url, "http://collector:8000/api/v1/logs");
        assert_eq!(flusher.clear_logs_url, "http://collector:8000/api/v1/logs/clear");
    }

    #[test]
    fn test_encode_round_trips() {
        let data = b"[{\"message\":\"log\"}]";
        let compressed = encode(data, 3).unwrap();
        assert!(!compressed.is_empty());

        let mut decoder = zstd::stream::read::Decoder::new(&compressed[..]).unwrap();
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[tokio::test]
    async fn test_ship_posts_json_batch() {
        let in_order = r#""level":"info","component":"test","message":"first".*"message":"second""#;
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/logs")
            .match_header("content-type", "application/json")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({"sessionId": "s-1"})),
                Matcher::Regex(in_order.to_string()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let flusher = Flusher::new(&config_for(server.url()));
        flusher.ship(&request(&["first", "second"])).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ship_reports_non_success_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/logs")
            .with_status(500)
            .with_body("disk full")
            .expect(1)
            .create_async()
            .await;

        let flusher = Flusher::new(&config_for(server.url()));
        let err = flusher.ship(&request(&["first"])).await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(err.to_string().contains("disk full"));
        // a single attempt, never retried
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ship_reports_unreachable_collector() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let flusher = Flusher::new(&config_for(format!("http://{addr}")));
        let err = flusher.ship(&request(&["first"])).await.unwrap_err();
        assert!(matches!(err, ShippingError::Destination(None, _)));
    }

    #[tokio::test]
    async fn test_ship_compressed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/logs")
            .match_header("content-encoding", "zstd")
            .match_header("content-type", "application/json")
            .with_status(202)
            .create_async()
            .await;

        let config = Config {
            compression_level: Some(3),
            ..config_for(server.url())
        };
        Flusher::new(&config)
            .ship(&request(&["first"]))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_clear_posts_session_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/logs/clear")
            .match_body(Matcher::Json(json!({"sessionId": "s-1"})))
            .with_status(200)
            .create_async()
            .await;

        let flusher = Flusher::new(&config_for(server.url()));
        flusher
            .clear(&ClearLogsRequest {
                session_id: Some("s-1".to_string()),
            })
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
