use crate::advancer::{Jitter, ProgressAdvancer};
use crate::countdown::CountdownTimer;
use crate::domain_knowledge::{ANNOUNCE_DELAY_SECS, TICK_INTERVAL};
use crate::estimator::estimate;
use crate::history::{SessionHistory, Tick};
use crate::our_error::{OurError, Result};
use crate::presenter::Presenter;
use crate::torrent::{ContentMetadata, InfoHash};
use crate::utils::PeerId;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// What the user asked for on one direction of traffic
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LaneConfig {
    /// Starting completion, in percent of the total size
    pub percent: i64,
    pub rate_kbs: i64,
}

impl LaneConfig {
    /// Rejects a starting completion outside `0..=100`, rates are taken as given
    pub fn checked(percent: i64, rate_kbs: i64) -> Result<Self> {
        if !(0..=100).contains(&percent) {
            return Err(OurError::InvalidConfig(format!(
                "completion must be between 0 and 100, got {percent}"
            )));
        }

        Ok(Self { percent, rate_kbs })
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub download: LaneConfig,
    pub upload: LaneConfig,
    pub announce_delay_secs: u64,
    pub peer_id: PeerId,
}

impl SessionConfig {
    pub fn new(download: LaneConfig, upload: LaneConfig, peer_id: PeerId) -> Self {
        Self {
            download,
            upload,
            announce_delay_secs: ANNOUNCE_DELAY_SECS,
            peer_id,
        }
    }
}

/// One simulated traffic counter
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Lane {
    pub current: u64,
    pub rate_kbs: i64,
    /// Only the download lane has one, the whole torrent
    pub ceiling: Option<u64>,
}

impl Lane {
    /// A lane that reached its ceiling is never advanced again
    pub fn finished(&self) -> bool {
        self.ceiling.is_some_and(|ceiling| self.current >= ceiling)
    }
}

/// Everything a presenter needs to draw one tick
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Snapshot {
    pub name: String,
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub download_percent: i64,
    pub download_rate_kbs: i64,
    pub upload_rate_kbs: i64,
    pub total_size: u64,
    pub file_count: usize,
    pub history: Vec<Tick>,
    pub seconds_to_announce: u64,
}

impl Snapshot {
    /// Bytes a tracker would be told are still missing
    pub fn left(&self) -> u64 {
        let downloaded = self.history.last().map_or(0, |t| t.downloaded_bytes);
        self.total_size.saturating_sub(downloaded)
    }
}

/// Decides how long to wait between two ticks
#[async_trait]
pub trait Pacer: Send {
    async fn pause(&mut self);
}

/// Waits a fixed amount of wall clock time
#[derive(Debug, Clone, Copy)]
pub struct IntervalPacer {
    interval: Duration,
}

impl IntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for IntervalPacer {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn pause(&mut self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Runs ticks back to back, for harnesses that don't care about real time
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

#[async_trait]
impl Pacer for NoPause {
    async fn pause(&mut self) {}
}

pub struct SimulationLoop<J> {
    metadata: ContentMetadata,
    config: SessionConfig,
    download: Lane,
    upload: Lane,
    advancer: ProgressAdvancer<J>,
    countdown: CountdownTimer,
    history: SessionHistory,
    next_sequence: u64,
}

impl<J: Jitter> SimulationLoop<J> {
    pub fn new(config: SessionConfig, metadata: ContentMetadata, jitter: J) -> Self {
        let total = metadata.total_size;
        let piece = metadata.piece_size;

        let download = Lane {
            current: estimate(total, piece, config.download.percent),
            rate_kbs: config.download.rate_kbs,
            ceiling: Some(total),
        };
        let upload = Lane {
            current: estimate(total, piece, config.upload.percent),
            rate_kbs: config.upload.rate_kbs,
            ceiling: None,
        };
        info!(
            name = %metadata.name,
            piece_size = piece.get(),
            total_size = total,
            download = download.current,
            upload = upload.current,
            "starting session"
        );

        Self {
            countdown: CountdownTimer::new(config.announce_delay_secs),
            metadata,
            config,
            download,
            upload,
            advancer: ProgressAdvancer::new(jitter),
            history: SessionHistory::default(),
            next_sequence: 1,
        }
    }

    pub fn download(&self) -> &Lane {
        &self.download
    }

    pub fn upload(&self) -> &Lane {
        &self.upload
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Advances both lanes once and returns what should be shown for this tick.
    ///
    /// The elapsed time handed to the advancer is the countdown's value before it ticks, so the
    /// drift shrinks as the announce draws near.
    pub fn tick(&mut self) -> Snapshot {
        let piece = self.metadata.piece_size;
        let elapsed = self.countdown.value();

        if !self.download.finished() {
            self.download.current = self.advancer.advance(
                self.download.current,
                self.download.rate_kbs,
                piece,
                elapsed,
                self.download.ceiling,
            );
            if self.download.finished() {
                info!("download lane hit {} bytes, no longer advancing", self.metadata.total_size);
            }
        }
        self.upload.current = self.advancer.advance(
            self.upload.current,
            self.upload.rate_kbs,
            piece,
            elapsed,
            self.upload.ceiling,
        );

        let tick = Tick {
            sequence_number: self.next_sequence,
            downloaded_bytes: self.download.current,
            uploaded_bytes: self.upload.current,
        };
        self.next_sequence += 1;
        self.history.append(tick);
        debug!(?tick, elapsed, "tick");

        let snapshot = self.snapshot();

        self.countdown.tick();
        if elapsed == 1 {
            info!("announce countdown reached zero");
        }

        snapshot
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            name: self.metadata.name.clone(),
            info_hash: self.metadata.info_hash,
            peer_id: self.config.peer_id.clone(),
            download_percent: self.config.download.percent,
            download_rate_kbs: self.config.download.rate_kbs,
            upload_rate_kbs: self.config.upload.rate_kbs,
            total_size: self.metadata.total_size,
            file_count: self.metadata.file_count,
            history: self.history.snapshot(),
            seconds_to_announce: self.countdown.value(),
        }
    }

    /// Ticks, presents, pauses. Forever unless `limit` is given, returns the number of ticks run.
    #[tracing::instrument(skip_all, fields(torrent = %self.metadata.name))]
    pub async fn run<P, C>(&mut self, presenter: &mut P, pacer: &mut C, limit: Option<u64>) -> Result<u64>
    where
        P: Presenter + ?Sized,
        C: Pacer + ?Sized,
    {
        let mut ran = 0;
        while limit.is_none_or(|limit| ran < limit) {
            let snapshot = self.tick();
            presenter.present(&snapshot)?;
            ran += 1;

            if limit.is_none_or(|limit| ran < limit) {
                pacer.pause().await;
            }
        }

        info!("stopping after {ran} ticks");
        Ok(ran)
    }
}
