//! Inline Edit Draft
//!
//! Transient state of a row being renamed. Lives only in the view; the
//! confirmed title stays in the synchronized collection.

#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    original: String,
    text: String,
}

impl EditDraft {
    /// Start editing from the last confirmed title
    pub fn begin(confirmed_title: &str) -> Self {
        Self {
            original: confirmed_title.to_string(),
            text: confirmed_title.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Abandon the draft; returns the title to show again
    pub fn cancel(self) -> String {
        self.original
    }

    /// Finish editing. `Some(title)` means the rename callback should run
    /// with the trimmed title; `None` means the draft was blank and the
    /// row reverts to its confirmed title.
    pub fn commit(self) -> Option<String> {
        let title = self.text.trim();
        if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        }
    }
}
