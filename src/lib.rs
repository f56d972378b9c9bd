//! # ratio_spoof
//!
//! Ratio spoof fabricates the progress feed of a single torrent session: how much has been
//! downloaded, how much has been uploaded, and how long until the next announce. Nothing is ever
//! transferred and no tracker or peer is ever contacted, the numbers are only meant to look right
//! to whoever is watching the screen.
//!
//! ## how does it look right?
//! Each tick, both the download and the upload counter ("lanes") head towards where a steady
//! transfer at the configured rate would be, then get nudged by up to 10 pieces in either
//! direction. Everything stays aligned to piece boundaries, and the download lane never goes past
//! the size of the torrent.
//!
//! ## roadmap
//! - [x] read name, piece size and total size from a `.torrent`
//! - [x] seedable jitter
//! - [x] terminal output
//! - [ ] re-announce once the countdown hits zero
//!
//! # TL;DR
//!
//! ``` rust
//! use ratio_spoof::advancer::RngJitter;
//! use ratio_spoof::session::{LaneConfig, NoPause, SessionConfig, SimulationLoop};
//! use ratio_spoof::presenter::TerminalPresenter;
//! use ratio_spoof::torrent::parse_torrent;
//! use ratio_spoof::utils::PeerId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ratio_spoof::our_error::OurError> {
//!     let torrent = b"d4:infod6:lengthi163840e4:name3:iso12:piece lengthi16384e6:pieces0:ee";
//!     let metadata = parse_torrent(torrent)?;
//!
//!     let config = SessionConfig::new(
//!         LaneConfig { percent: 10, rate_kbs: 100 },
//!         LaneConfig { percent: 0, rate_kbs: 30 },
//!         PeerId::generate(),
//!     );
//!     let mut session = SimulationLoop::new(config, metadata, RngJitter::from_seed(1));
//!     let mut presenter = TerminalPresenter::new(std::io::sink());
//!
//!     session.run(&mut presenter, &mut NoPause, Some(3)).await?;
//!     Ok(())
//! }
//! ```

pub mod advancer;
pub mod countdown;
pub mod domain_knowledge;
pub mod estimator;
pub mod history;
pub mod our_error;
pub mod presenter;
pub mod session;
pub mod torrent;
pub mod utils;
