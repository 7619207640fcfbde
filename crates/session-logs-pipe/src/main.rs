// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::future::Future;
use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use session_logs::{logger::Formatter, Config, Level, SessionLogger};

const DEFAULT_COMPONENT: &str = "pipe";
const LINE_QUEUE_SIZE: usize = 1024;

#[tokio::main]
pub async fn main() {
    let log_level = env::var("SESSION_LOGS_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,reqwest=off,{log_level}");

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .event_format(Formatter)
        .with_writer(std::io::stderr)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error creating session logs config: {e}");
            return;
        }
    };
    let component = env::var("SESSION_LOGS_COMPONENT")
        .ok()
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COMPONENT.to_string());

    let logger = SessionLogger::start(&config);
    info!(
        "session-logs-pipe: shipping to {} as session {}",
        config.logs_url(),
        logger.session_id()
    );

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    };
    pump(&logger, &component, spawn_stdin_reader(), shutdown_signal).await;

    logger.shutdown().await;
}

/// Reads stdin on its own thread.
///
/// A blocking read cannot be cancelled, so the thread is left detached and
/// the process exits without waiting for it.
fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(LINE_QUEUE_SIZE);
    let spawned = thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        error!("Failed to start stdin reader: {e}");
    }
    rx
}

/// Feeds lines to the logger until input ends or `shutdown` resolves.
async fn pump(
    logger: &SessionLogger,
    component: &str,
    mut lines: mpsc::Receiver<io::Result<String>>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
            line = lines.recv() => match line {
                Some(Ok(line)) => {
                    if let Some((level, message)) = parse_line(&line) {
                        logger.log(level, component, message, None);
                    }
                }
                Some(Err(e)) => {
                    error!("Failed to read stdin: {e}");
                    break;
                }
                None => {
                    debug!("stdin closed");
                    break;
                }
            }
        }
    }
}

/// Splits an optional `level:` prefix off a line. Blank lines are skipped.
fn parse_line(line: &str) -> Option<(Level, &str)> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return None;
    }

    if let Some((prefix, rest)) = line.split_once(':') {
        if let Ok(level) = prefix.parse::<Level>() {
            return Some((level, rest.trim_start()));
        }
    }
    Some((Level::Info, line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn idle_logger() -> SessionLogger {
        SessionLogger::start(&Config {
            flush_interval: Duration::from_secs(3600),
            mirror_level: None,
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_pump_stops_at_end_of_input() {
        let logger = idle_logger();
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok("error: sync failed".to_string())).await.unwrap();
        tx.send(Ok("   ".to_string())).await.unwrap();
        tx.send(Ok("fetched 12 matches".to_string())).await.unwrap();
        drop(tx);

        timeout(
            Duration::from_secs(2),
            pump(&logger, "pipe", rx, std::future::pending()),
        )
        .await
        .expect("pump kept running after end of input");

        assert_eq!(logger.pending().await, 2);
    }

    #[tokio::test]
    async fn test_pump_stops_on_shutdown_while_input_open() {
        let logger = idle_logger();
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok("warn: slow".to_string())).await.unwrap();

        // tx stays alive: input is still open when the signal arrives
        timeout(
            Duration::from_secs(2),
            pump(&logger, "pipe", rx, sleep(Duration::from_millis(50))),
        )
        .await
        .expect("pump ignored shutdown while input was open");

        assert_eq!(logger.pending().await, 1);
        drop(tx);
    }

    #[test]
    fn test_parse_line_with_level() {
        assert_eq!(
            parse_line("error: sync failed"),
            Some((Level::Error, "sync failed"))
        );
        assert_eq!(parse_line("WARN:slow"), Some((Level::Warn, "slow")));
        assert_eq!(parse_line("debug: x=1"), Some((Level::Debug, "x=1")));
    }

    #[test]
    fn test_parse_line_defaults_to_info() {
        assert_eq!(
            parse_line("fetched 12 matches"),
            Some((Level::Info, "fetched 12 matches"))
        );
        assert_eq!(
            parse_line("kickoff: 20:45"),
            Some((Level::Info, "kickoff: 20:45"))
        );
    }

    #[test]
    fn test_parse_line_skips_blank() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   \r"), None);
    }
}
