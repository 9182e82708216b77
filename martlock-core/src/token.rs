//! Opaque receipt identifying one successful acquisition of a lock set.

use crate::scope::LockScope;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, UdpSocket};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Process-wide, monotonically increasing source of `token_id`s. Never
/// reset; its lifetime is the host process's, so token identity survives
/// a locking service being destroyed and re-created within the process.
static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a held set of resource locks, scoped to a
/// process/host/cluster reach. Tokens are produced by
/// [`crate::ServiceState`]-gated services on successful acquisition and
/// exist only between that acquisition and the matching release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockToken {
    scope: LockScope,
    token_id: u64,
    timestamp_millis: u128,
    process_key: String,
    host_key: String,
    token_key: String,
}

impl LockToken {
    /// Allocates a new token id from the process-wide counter and captures
    /// the current instant, process identity, and host identity.
    pub fn new(scope: LockScope) -> Self {
        let token_id = TOKEN_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let process_key = process_key().to_string();
        let host_key = host_key().to_string();
        let token_key = format_token_key(scope, token_id, timestamp_millis, &process_key, &host_key);
        Self {
            scope,
            token_id,
            timestamp_millis,
            process_key,
            host_key,
            token_key,
        }
    }

    pub fn scope(&self) -> LockScope {
        self.scope
    }

    pub fn token_id(&self) -> u64 {
        self.token_id
    }

    pub fn timestamp_millis(&self) -> u128 {
        self.timestamp_millis
    }

    pub fn process_key(&self) -> &str {
        &self.process_key
    }

    pub fn host_key(&self) -> &str {
        &self.host_key
    }

    /// The formatted diagnostic key; `to_string(token) == token.token_key()`.
    pub fn token_key(&self) -> &str {
        &self.token_key
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token_key)
    }
}

fn process_key() -> &'static str {
    static PROCESS_KEY: OnceLock<String> = OnceLock::new();
    PROCESS_KEY.get_or_init(|| format!("pid-{}", process::id()))
}

fn host_key() -> &'static str {
    static HOST_KEY: OnceLock<String> = OnceLock::new();
    HOST_KEY.get_or_init(|| match local_non_loopback_ip() {
        Some(ip) => format!("host-{ip}"),
        None => "host-unknown".to_string(),
    })
}

/// Best-effort discovery of the first non-loopback address reachable from
/// this host, via the classic UDP-connect trick: connecting a UDP socket
/// never actually sends a packet, it only asks the kernel which local
/// interface would be used to route to the target. Stable across tokens
/// produced on the same host in the same process because it is memoized
/// in a `OnceLock`.
fn local_non_loopback_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

fn format_token_key(
    scope: LockScope,
    token_id: u64,
    timestamp_millis: u128,
    process_key: &str,
    host_key: &str,
) -> String {
    format!("[{scope}:{token_id}:{timestamp_millis}]@{process_key}@{host_key}")
}
