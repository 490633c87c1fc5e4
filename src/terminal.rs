//! Terminal mode for the lifetime of a game.
//!
//! `TerminalGuard` is created right after raw mode is switched on and puts
//! the screen back when dropped, so an early `?` in setup still leaves a
//! usable shell.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    style::ResetColor,
    terminal, ExecutableCommand,
};

pub struct TerminalGuard<W: Write> {
    out: W,
    keyboard_enhanced: bool,
    restored: bool,
}

impl<W: Write> TerminalGuard<W> {
    /// Take ownership of a writer whose terminal is already in raw mode.
    pub fn new(out: W) -> Self {
        Self {
            out,
            keyboard_enhanced: false,
            restored: false,
        }
    }

    /// Alternate screen, cleared, cursor hidden.
    pub fn setup(&mut self) -> io::Result<()> {
        self.out.execute(terminal::EnterAlternateScreen)?;
        self.out.execute(terminal::Clear(terminal::ClearType::All))?;
        self.out.execute(cursor::Hide)?;

        // Release events let held keys drop out immediately; terminals
        // without the protocol fall back to the hold window.
        self.keyboard_enhanced = self
            .out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
        Ok(())
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Undo `setup` and leave raw mode.  Runs at most once; later calls and
    /// the drop are no-ops.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;

        if self.keyboard_enhanced {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(ResetColor);
        let _ = self.out.execute(terminal::Clear(terminal::ClearType::All));
        let _ = self.out.execute(cursor::MoveTo(0, 0));
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("failed to disable raw mode: {}", e);
        }
        let _ = self.out.flush();
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_CURSOR: &str = "\x1b[?25h";
    const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";

    /// Accepts `budget` writes, then fails every write after that.
    struct FailAfter {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.budget -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn drop_restores_after_full_setup() {
        let mut out = Vec::new();
        {
            let mut guard = TerminalGuard::new(&mut out);
            guard.setup().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let show = text.rfind(SHOW_CURSOR).unwrap();
        let leave = text.rfind(LEAVE_ALT_SCREEN).unwrap();
        assert!(show < leave);
    }

    #[test]
    fn drop_restores_when_setup_never_ran() {
        let mut out = Vec::new();
        drop(TerminalGuard::new(&mut out));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(SHOW_CURSOR));
        assert!(text.contains(LEAVE_ALT_SCREEN));
    }

    #[test]
    fn failed_setup_still_restores_on_drop() {
        let mut out = FailAfter {
            budget: 1,
            written: Vec::new(),
        };
        {
            let mut guard = TerminalGuard::new(&mut out);
            assert!(guard.setup().is_err());
            // Writer recovers before the guard goes out of scope.
            guard.writer().budget = usize::MAX;
        }
        let text = String::from_utf8(out.written).unwrap();
        assert!(text.contains(SHOW_CURSOR));
        assert!(text.contains(LEAVE_ALT_SCREEN));
    }

    #[test]
    fn restore_runs_once() {
        let mut out = Vec::new();
        {
            let mut guard = TerminalGuard::new(&mut out);
            guard.restore();
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(LEAVE_ALT_SCREEN).count(), 1);
    }
}
