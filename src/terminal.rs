//! Terminal session management
//!
//! [`TerminalSession`] owns raw mode and the alternate screen for its
//! lifetime and restores both on drop, and from a panic hook so a crash
//! does not leave the shell unusable.

use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, Command};
use tracing::{debug, info};

use crate::ui::render::RenderBuffer;

/// Escape sequence for one full frame: home, grid rows, then cursor state
pub fn frame(buffer: &RenderBuffer, cursor: Option<(u16, u16)>) -> String {
    let mut out = String::new();
    let _ = MoveTo(0, 0).write_ansi(&mut out);
    out.push_str(&buffer.to_ansi());
    match cursor {
        Some((x, y)) => {
            let _ = MoveTo(x, y).write_ansi(&mut out);
            let _ = Show.write_ansi(&mut out);
        }
        None => {
            let _ = Hide.write_ansi(&mut out);
        }
    }
    out
}

fn restore(out: &mut impl Write) {
    let _ = disable_raw_mode();
    let _ = execute!(out, Show, LeaveAlternateScreen);
}

/// RAII guard for raw mode + alternate screen
pub struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore(&mut io::stdout());
            previous(panic_info);
        }));

        enable_raw_mode().context("failed to enable raw mode")?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e).context("failed to enter alternate screen");
        }

        info!("terminal session started");
        Ok(Self { out })
    }

    /// Current terminal size as (cols, rows)
    pub fn size() -> Result<(u16, u16)> {
        crossterm::terminal::size().context("failed to query terminal size")
    }

    /// Flush a full frame to the terminal
    pub fn draw(&mut self, buffer: &RenderBuffer, cursor: Option<(u16, u16)>) -> Result<()> {
        self.out
            .write_all(frame(buffer, cursor).as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush terminal")?;
        debug!(
            width = buffer.width(),
            height = buffer.height(),
            cursor = ?cursor,
            "frame flushed"
        );
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore(&mut self.out);
        info!("terminal session restored");
    }
}
