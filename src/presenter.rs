use crate::our_error::Result;
use crate::session::Snapshot;
use crate::utils::format_countdown;
use std::io::Write;

/// One way sink for the snapshot of every tick
pub trait Presenter {
    fn present(&mut self, snapshot: &Snapshot) -> Result<()>;
}

const RULE: &str = "###########################################################################";

/// Redraws the whole screen each tick
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
    clear_screen: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: true,
        }
    }

    /// Appends frames instead of clearing the screen in between, for when stdout is not a tty
    pub fn without_clearing(mut self) -> Self {
        self.clear_screen = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn header(&mut self, snapshot: &Snapshot) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "    Torrent: {} - {}% ", snapshot.name, snapshot.download_percent)?;
        writeln!(
            self.out,
            "    info_hash: {} ({})",
            snapshot.info_hash,
            snapshot.info_hash.url_encoded()
        )?;
        writeln!(
            self.out,
            "    size: {} bytes in {} file(s), left: {} bytes",
            snapshot.total_size,
            snapshot.file_count,
            snapshot.left()
        )?;
        writeln!(self.out, "    peer_id: {}", snapshot.peer_id)?;
        writeln!(self.out, "    download_speed: {}KB/s ", snapshot.download_rate_kbs)?;
        writeln!(self.out, "    upload_speed: {}KB/s", snapshot.upload_rate_kbs)?;
        writeln!(self.out, "{RULE}")?;
        Ok(())
    }

    fn body(&mut self, snapshot: &Snapshot) -> Result<()> {
        let Some((latest, announced)) = snapshot.history.split_last() else {
            return Ok(());
        };

        for tick in announced {
            writeln!(
                self.out,
                "#{} downloaded: {}  | uploaded: {} | announced",
                tick.sequence_number, tick.downloaded_bytes, tick.uploaded_bytes
            )?;
        }
        writeln!(
            self.out,
            "#{} downloaded: {}  | uploaded: {} | next announce in :{}",
            latest.sequence_number,
            latest.downloaded_bytes,
            latest.uploaded_bytes,
            format_countdown(snapshot.seconds_to_announce)
        )?;
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, snapshot: &Snapshot) -> Result<()> {
        if self.clear_screen {
            // full terminal reset, works on anything vt100-ish
            write!(self.out, "\x1bc")?;
        }
        self.header(snapshot)?;
        self.body(snapshot)?;
        self.out.flush()?;
        Ok(())
    }
}
