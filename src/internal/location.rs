/// Browser-style location service: a current query string plus a back/forward
/// history. Injected into the list controller so state-sync logic is testable
/// without any real address bar behind it.
pub trait Location {
    /// The current entry's query string (may carry a leading `?`, may be empty).
    fn search(&self) -> String;

    /// Overwrite the current entry in place. This is the only write the list
    /// controller performs: state changes never grow the back stack.
    fn replace(&mut self, search: &str);

    /// Step back one entry, returning the now-current search, or `None` at
    /// the start of history.
    fn back(&mut self) -> Option<String>;

    /// Step forward one entry, returning the now-current search, or `None` at
    /// the end of history.
    fn forward(&mut self) -> Option<String>;
}

/// In-memory history. Entry 0 is seeded at construction (e.g. from a
/// deep-link argument); further entries only appear through [`push`].
///
/// [`push`]: MemoryLocation::push
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryLocation {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    /// Append a new entry after the cursor, dropping any forward entries,
    /// exactly as a browser's pushState would.
    pub fn push(&mut self, search: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(search.to_string());
        self.cursor += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for MemoryLocation {
    fn search(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn replace(&mut self, search: &str) {
        self.entries[self.cursor] = search.to_string();
    }

    fn back(&mut self) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    fn forward(&mut self) -> Option<String> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_overwrites_current_entry() {
        let mut loc = MemoryLocation::new("?page=1");
        loc.replace("?page=2");
        assert_eq!(loc.search(), "?page=2");
        assert_eq!(loc.len(), 1);
        assert_eq!(loc.back(), None);
    }

    #[test]
    fn test_back_and_forward() {
        let mut loc = MemoryLocation::new("?page=1");
        loc.push("?page=2");
        loc.push("?page=3");

        assert_eq!(loc.back(), Some("?page=2".to_string()));
        assert_eq!(loc.back(), Some("?page=1".to_string()));
        assert_eq!(loc.back(), None);

        assert_eq!(loc.forward(), Some("?page=2".to_string()));
        assert_eq!(loc.forward(), Some("?page=3".to_string()));
        assert_eq!(loc.forward(), None);
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut loc = MemoryLocation::new("a");
        loc.push("b");
        loc.push("c");
        loc.back();
        loc.back();
        // Cursor at "a"; pushing drops "b" and "c"
        loc.push("d");
        assert_eq!(loc.search(), "d");
        assert_eq!(loc.forward(), None);
        assert_eq!(loc.len(), 2);
    }

    #[test]
    fn test_replace_after_back_keeps_forward_entries() {
        let mut loc = MemoryLocation::new("a");
        loc.push("b");
        loc.back();
        loc.replace("a2");
        assert_eq!(loc.search(), "a2");
        assert_eq!(loc.forward(), Some("b".to_string()));
    }
}
