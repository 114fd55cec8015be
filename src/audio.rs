use anyhow::Result;
use std::io::{self, Write};

/// Completion cue played when a focus countdown reaches zero.
pub trait Chime {
    fn play(&self) -> Result<()>;
}

/// Rings the terminal bell.
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Used when the chime is muted.
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self) -> Result<()> {
        log::debug!("Chime muted");
        Ok(())
    }
}
