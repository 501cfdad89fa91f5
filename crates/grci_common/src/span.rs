//! Source identifiers and byte ranges for locating compile errors.

use serde::{Deserialize, Serialize};

/// Identifies one source string handed to the compiler.
///
/// Compilation is additive: every compile call registers its text under a
/// fresh `SourceId`, and spans carry the id so an error can be resolved to a
/// line of the right source.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SourceId(u32);

impl SourceId {
    /// Creates an id from its raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw index of this id.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A half-open byte range `start..end` within one source string.
///
/// Tokens, AST nodes, and lowered descriptions all keep a span so
/// diagnostics can point back at the text they came from. Entities with no
/// source text of their own — the built-in module descriptions — carry the
/// [synthetic](Span::SYNTHETIC) span instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The source this range lies in.
    pub source: SourceId,
    /// First byte of the range.
    pub start: u32,
    /// One past the last byte of the range.
    pub end: u32,
}

impl Span {
    /// The span of entities without source text, such as the built-ins.
    pub const SYNTHETIC: Span = Span {
        source: SourceId(u32::MAX),
        start: 0,
        end: 0,
    };

    /// Creates a span over `start..end` in the given source.
    pub fn new(source: SourceId, start: u32, end: u32) -> Self {
        Self { source, start, end }
    }

    /// The smallest span containing both `self` and `other`.
    ///
    /// # Panics
    ///
    /// Panics if the spans lie in different sources.
    pub fn join(self, other: Span) -> Span {
        assert_eq!(self.source, other.source, "joined spans must share a source");
        Span {
            source: self.source,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether this is the synthetic no-source span.
    pub fn is_synthetic(self) -> bool {
        self.source == Span::SYNTHETIC.source
    }
}
