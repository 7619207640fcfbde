// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client construction for the collector.
//!
//! The client carries the request timeout, connection pooling settings and
//! the optional HTTPS proxy. A bad proxy never prevents logging: the client
//! falls back to a direct connection.

use tracing::error;

use crate::config::Config;
use crate::constants;

/// Builds the client used for every collector request.
#[must_use]
pub fn get_client(config: &Config) -> reqwest::Client {
    match build_client(config, true) {
        Ok(client) => client,
        Err(e) => {
            error!(
                "Unable to parse proxy configuration: {}, falling back to direct connection",
                e
            );
            match build_client(config, false) {
                Ok(client) => client,
                Err(inner) => {
                    error!(
                        "Failed to build HTTP client without proxy: {}, using reqwest defaults",
                        inner
                    );
                    reqwest::Client::new()
                }
            }
        }
    }
}

fn build_client(config: &Config, allow_proxy: bool) -> Result<reqwest::Client, reqwest::Error> {
    let mut client = reqwest::Client::builder()
        .timeout(config.timeout)
        .pool_idle_timeout(Some(constants::POOL_IDLE_TIMEOUT))
        .tcp_keepalive(Some(constants::TCP_KEEPALIVE));

    if allow_proxy {
        if let Some(https_uri) = &config.https_proxy {
            client = client.proxy(reqwest::Proxy::https(https_uri.as_str())?);
        }
    }

    client.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_direct() {
        assert!(build_client(&Config::default(), true).is_ok());
    }

    #[test]
    fn test_build_client_with_proxy() {
        let config = Config {
            https_proxy: Some("http://proxy.example.com:3128".to_string()),
            ..Config::default()
        };
        assert!(build_client(&config, true).is_ok());
    }

    #[test]
    fn test_invalid_proxy_falls_back() {
        let config = Config {
            https_proxy: Some("::not a proxy::".to_string()),
            ..Config::default()
        };
        assert!(build_client(&config, true).is_err());
        assert!(build_client(&config, false).is_ok());
        let _client = get_client(&config);
    }
}
