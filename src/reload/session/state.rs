use crate::freshness::ModTime;
use crate::reload::poller::{BuildResult, Poll};

/// Poll bookkeeping for one session, owned by its writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    last_mod: ModTime,
    last_error: Option<String>,
}

impl SessionState {
    pub fn new(last_mod: ModTime) -> Self {
        Self {
            last_mod,
            last_error: None,
        }
    }

    pub fn last_mod(&self) -> ModTime {
        self.last_mod
    }

    /// Fold one poll into the state and return the text to push, if any.
    ///
    /// Artifacts are always pushed. Compile diagnostics never are. Errors are
    /// pushed once until their text changes or a poll succeeds.
    pub fn apply(&mut self, poll: Poll) -> Option<String> {
        self.last_mod = poll.mod_time;

        match poll.result {
            Ok(result) => {
                self.last_error = None;
                match result {
                    BuildResult::Artifact(bytes) => {
                        Some(String::from_utf8_lossy(&bytes).into_owned())
                    }
                    BuildResult::Diagnostic(_) | BuildResult::Unchanged => None,
                }
            }
            Err(e) => {
                let text = e.to_string();
                if self.last_error.as_deref() == Some(text.as_str()) {
                    return None;
                }
                self.last_error = Some(text.clone());
                Some(text)
            }
        }
    }
}
