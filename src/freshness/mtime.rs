//! Modification-time stamps exchanged with the browser.
//!
//! A [`ModTime`] is the watched file's mtime in nanoseconds since the Unix
//! epoch. The bootstrap page embeds it as lowercase hex and the client hands
//! it back as `/ws?lastMod=<hex>` when opening a session, so the stamp must
//! survive that round trip exactly.

use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// File modification time with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ModTime(u64);

impl ModTime {
    /// "Never seen anything": every existing file is newer than this.
    pub const ZERO: Self = Self(0);

    #[cfg(test)]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Convert a filesystem timestamp. Times before the epoch clamp to zero.
    pub fn from_system_time(time: SystemTime) -> Self {
        let nanos = time
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(nanos)
    }

    #[cfg(test)]
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + std::time::Duration::from_nanos(self.0)
    }

    /// Read the modification time of a file.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let modified = path.metadata()?.modified()?;
        Ok(Self::from_system_time(modified))
    }

    /// Strictly newer than `other`.
    pub fn is_after(self, other: Self) -> bool {
        self.0 > other.0
    }

    /// Lowercase hex nanoseconds, as embedded in the bootstrap page.
    pub fn to_hex(self) -> String {
        format!("{:x}", self.0)
    }

    /// Parse the `lastMod` query value. `None` when absent or malformed.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        u64::from_str_radix(s, 16).ok().map(Self)
    }
}

impl fmt::Display for ModTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_zero_is_before_everything() {
        assert!(ModTime::from_nanos(1).is_after(ModTime::ZERO));
        assert!(!ModTime::ZERO.is_after(ModTime::ZERO));
    }

    #[test]
    fn test_is_after_is_strict() {
        let t = ModTime::from_nanos(1_700_000_000_123_456_789);
        assert!(!t.is_after(t));
        assert!(t.is_after(ModTime::from_nanos(t.0 - 1)));
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(ModTime::ZERO.to_hex(), "0");
        assert_eq!(ModTime::from_nanos(255).to_hex(), "ff");
        assert_eq!(
            ModTime::from_nanos(1_700_000_000_000_000_000).to_hex(),
            "17979cfe362a0000"
        );
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(ModTime::from_hex("ff"), Some(ModTime::from_nanos(255)));
        assert_eq!(ModTime::from_hex("FF"), Some(ModTime::from_nanos(255)));
        assert_eq!(ModTime::from_hex(""), None);
        assert_eq!(ModTime::from_hex("xyz"), None);
        assert_eq!(ModTime::from_hex("-1"), None);
    }

    #[test]
    fn test_file_stamp_survives_hex() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Main.elm");
        fs::write(&path, "main = text \"hi\"").unwrap();

        let stamp = ModTime::of(&path).unwrap();
        assert_eq!(ModTime::from_hex(&stamp.to_hex()), Some(stamp));
        assert!(stamp.is_after(ModTime::ZERO));
    }

    #[test]
    fn test_system_time_conversion() {
        let t = ModTime::from_nanos(1_234_567_890);
        assert_eq!(ModTime::from_system_time(t.to_system_time()), t);
        assert_eq!(
            ModTime::from_system_time(UNIX_EPOCH - Duration::from_secs(1)),
            ModTime::ZERO
        );
    }
}
