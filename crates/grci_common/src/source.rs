//! Storage for compiled source text and byte-offset to line resolution.
//!
//! The [`SourceDb`] owns every source string of a compilation session and
//! answers the one question error reporting needs: which 1-indexed line a
//! [`Span`] starts on.

use crate::span::{SourceId, Span};

/// One source string with a prebuilt index of its line starts.
///
/// Sources are ASCII with LF line termination; a CR before the LF is
/// tolerated and counts toward the line it ends.
pub struct SourceText {
    id: SourceId,
    name: String,
    text: String,
    line_starts: Vec<u32>,
}

impl SourceText {
    fn new(id: SourceId, name: String, text: String) -> Self {
        let mut line_starts = vec![0u32];
        for (i, _) in text.match_indices('\n') {
            line_starts.push((i + 1) as u32);
        }
        Self {
            id,
            name,
            text,
            line_starts,
        }
    }

    /// The id this source was registered under.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// The name the source was registered under (shown in diagnostics).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The 1-indexed (line, column) containing the given byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line = line_idx as u32 + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }
}

/// Owns every source string of a compilation session.
///
/// Sources are only ever added; ids stay valid for the session's lifetime.
pub struct SourceDb {
    sources: Vec<SourceText>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registers a source string under `name` and returns its id.
    pub fn add_source(&mut self, name: impl Into<String>, text: String) -> SourceId {
        let id = SourceId::from_raw(self.sources.len() as u32);
        self.sources.push(SourceText::new(id, name.into(), text));
        id
    }

    /// The source registered under `id`.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this database.
    pub fn get(&self, id: SourceId) -> &SourceText {
        &self.sources[id.as_raw() as usize]
    }

    /// The 1-indexed line the span starts on.
    pub fn line_of(&self, span: Span) -> u32 {
        self.get(span.source).line_col(span.start).0
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_count_up_per_call() {
        let mut db = SourceDb::new();
        let a = db.add_source("gates.hdl", String::new());
        let b = db.add_source("cpu.hdl", String::new());
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(db.get(b).name(), "cpu.hdl");
    }

    #[test]
    fn line_of_picks_the_starting_line() {
        let mut db = SourceDb::new();
        let id = db.add_source(
            "test.hdl",
            "module Not(in) -> out {\nNand(in, in) -> out\n}\n".to_string(),
        );
        // The part statement begins at byte 24, on line 2
        assert_eq!(db.line_of(Span::new(id, 24, 43)), 2);
        // A span covering the whole module reports its first line
        assert_eq!(db.line_of(Span::new(id, 0, 45)), 1);
        assert_eq!(db.line_of(Span::new(id, 44, 45)), 3);
    }

    #[test]
    fn columns_restart_per_line() {
        let mut db = SourceDb::new();
        let id = db.add_source("t.hdl", "ab\ncdef\ng".to_string());
        let text = db.get(id);
        assert_eq!(text.line_col(0), (1, 1));
        assert_eq!(text.line_col(3), (2, 1));
        assert_eq!(text.line_col(6), (2, 4));
        assert_eq!(text.line_col(8), (3, 1));
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let mut db = SourceDb::new();
        let id = db.add_source("t.hdl", "ab\r\ncd".to_string());
        assert_eq!(db.get(id).line_col(4), (2, 1));
    }

    #[test]
    fn empty_source_is_line_one() {
        let mut db = SourceDb::new();
        let id = db.add_source("t.hdl", String::new());
        assert_eq!(db.get(id).line_col(0), (1, 1));
    }

    #[test]
    fn trailing_text_without_newline() {
        let mut db = SourceDb::new();
        let id = db.add_source("t.hdl", "one\ntwo".to_string());
        assert_eq!(db.get(id).line_col(5), (2, 2));
        assert_eq!(db.get(id).text(), "one\ntwo");
    }
}
