//! Watch cursor.

/// The last checksum observed by a `watch` loop.
///
/// Held in memory only. A restarted process begins with an empty cursor
/// and rewrites the local file on its first successful poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchCursor {
    checksum: String,
}

impl WatchCursor {
    /// Creates an empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last observed checksum, if any.
    pub fn checksum(&self) -> Option<&str> {
        (!self.checksum.is_empty()).then_some(self.checksum.as_str())
    }

    /// Returns true if `checksum` is what this cursor last saw.
    ///
    /// An empty checksum (missing key) matches an empty cursor.
    pub fn is_current(&self, checksum: &str) -> bool {
        self.checksum == checksum
    }

    /// Records `checksum` as observed.
    pub fn advance(&mut self, checksum: impl Into<String>) {
        self.checksum = checksum.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_matches_missing_key() {
        let cursor = WatchCursor::new();
        assert!(cursor.checksum().is_none());
        assert!(cursor.is_current(""));
        assert!(!cursor.is_current("abc"));
    }

    #[test]
    fn advance_moves_cursor() {
        let mut cursor = WatchCursor::new();
        cursor.advance("abc");
        assert_eq!(cursor.checksum(), Some("abc"));
        assert!(cursor.is_current("abc"));
        assert!(!cursor.is_current(""));
    }
}
