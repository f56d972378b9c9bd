use std::time::Duration;

/// Seconds until the first (and only) fictitious announce, same as qBittorrent's default interval.
pub const ANNOUNCE_DELAY_SECS: u64 = 18_000;

/// Number of ticks kept around for rendering.
pub const HISTORY_CAPACITY: usize = 10;

/// Bound, in pieces, of the random perturbation applied on every advance.
pub const JITTER_PIECES: i64 = 10;

pub const BYTES_PER_KB: i64 = 1024;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Azureus-style client prefix, we pretend to be qBittorrent 4.3.0
pub const PEER_ID_PREFIX: &str = "-qB4030-";

pub const PEER_ID_LEN: usize = 20;

pub const INFO_HASH_LEN: usize = 20;
