// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Session identifiers correlating every entry of one running instance.

use chrono::Utc;
use rand::Rng;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates `{prefix}-{unix_millis}-{9 base36 chars}`.
///
/// ```
/// use session_logs::session::generate_session_id;
///
/// let id = generate_session_id("frontend");
/// assert!(id.starts_with("frontend-"));
/// ```
#[must_use]
pub fn generate_session_id(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("{prefix}-{}-{suffix}", Utc::now().timestamp_millis())
}
