//! System clipboard access for `/copy`
//!
//! On X11 and Wayland the copied text is served by the process that owns the
//! clipboard, so the handle is opened once and kept for the whole shell session.

use arboard::Clipboard;
use tracing::warn;

#[derive(Default)]
pub struct ClipboardHandle {
    inner: Option<Clipboard>,
}

impl ClipboardHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the system clipboard has been opened yet
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Copies text to the system clipboard, returning a displayable error on failure
    pub fn copy(&mut self, text: &str) -> Result<(), String> {
        if self.inner.is_none() {
            let clipboard = Clipboard::new().map_err(|e| {
                let msg = format!("Failed to initialize clipboard: {}", e);
                warn!("{}", msg);
                msg
            })?;
            self.inner = Some(clipboard);
        }

        let Some(clipboard) = self.inner.as_mut() else {
            return Err("Clipboard unavailable".to_string());
        };
        clipboard.set_text(text).map_err(|e| {
            let msg = format!("Failed to set clipboard text: {}", e);
            warn!("{}", msg);
            msg
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opened_lazily() {
        let handle = ClipboardHandle::new();
        assert!(!handle.is_open());
    }
}
