use crate::domain_knowledge::{PEER_ID_LEN, PEER_ID_PREFIX};
use rand::Rng;
use std::fmt;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct PeerId(pub String);

impl PeerId {
    /// Client prefix followed by 12 url safe base64 characters of random bytes, the shape
    /// qBittorrent peer ids have
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::rng().random();
        let mut id = String::with_capacity(PEER_ID_LEN);
        id.push_str(PEER_ID_PREFIX);
        id.push_str(&base64_url_enc(bytes)[..PEER_ID_LEN - PEER_ID_PREFIX.len()]);
        PeerId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn base64_url_enc<T: AsRef<[u8]>>(data: T) -> String {
    use base64::prelude::*;

    BASE64_URL_SAFE.encode(data)
}

/// `H:MM:SS`, with a `N day(s), ` prefix past 24 hours
pub fn format_countdown(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3600;
    let minutes = seconds % 3600 / 60;
    let secs = seconds % 60;

    let clock = format!("{hours}:{minutes:02}:{secs:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}
