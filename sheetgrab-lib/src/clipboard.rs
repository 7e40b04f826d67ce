//! Clipboard access.
//!
//! Uses the arboard crate; a fresh `Clipboard` handle is opened per write.

use crate::error::ClipboardError;
use std::time::Duration;

pub trait ClipboardSink: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard {
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    hold: Option<Duration>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep serving the clipboard contents for `hold` after writing.
    ///
    /// On X11 and Wayland the contents vanish with the process that owns
    /// them, so a short-lived CLI has to stay around until a clipboard
    /// manager or another program has picked them up. Ignored elsewhere.
    pub fn holding_for(hold: Duration) -> Self {
        SystemClipboard { hold: Some(hold) }
    }
}

impl ClipboardSink for SystemClipboard {
    #[cfg(target_os = "linux")]
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        use arboard::SetExtLinux;

        let mut clipboard = arboard::Clipboard::new()?;
        match self.hold {
            Some(hold) => clipboard
                .set()
                .wait_until(std::time::Instant::now() + hold)
                .text(text.to_owned())?,
            None => clipboard.set_text(text.to_owned())?,
        }
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_owned())?;
        Ok(())
    }
}
