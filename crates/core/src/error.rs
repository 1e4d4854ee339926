use serde::Serialize;
use thiserror::Error;

/// Source location information for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors raised by caller-supplied configuration.
///
/// Parsing and rendering never fail; see [`Diagnostics`] for the non-fatal
/// findings they report instead.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Render options could not be decoded from JSON.
    #[error("Invalid render options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
    /// Root container class contains characters outside `[A-Za-z0-9_-]`.
    #[error("Invalid root class name: {0:?}")]
    InvalidClassName(String),
}

/// Kind of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// Bracket tags present but the payload does not match the provider pattern,
    /// or the closing tag names a different provider.
    MalformedDirective,
    /// Opening tag with no matching closing tag.
    UnterminatedDirective,
}

/// A degraded construct that was kept as literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Human readable explanation.
    pub message: String,
    /// Position of the opening tag.
    pub location: SourceLocation,
}

impl Diagnostic {
    /// Create a malformed-directive diagnostic
    pub fn malformed(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind: DiagnosticKind::MalformedDirective,
            message: message.into(),
            location,
        }
    }

    /// Create an unterminated-directive diagnostic
    pub fn unterminated(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind: DiagnosticKind::UnterminatedDirective,
            message: message.into(),
            location,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::MalformedDirective => "malformed directive",
            DiagnosticKind::UnterminatedDirective => "unterminated directive",
        };
        write!(f, "{} at {}: {}", kind, self.location, self.message)
    }
}

/// Collection of parse diagnostics, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Iterate over diagnostics in source order
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Check if there are any diagnostics
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Count diagnostics of one kind
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Maps byte offsets to line/column positions.
///
/// Offsets must be queried in non-decreasing order; each query only scans the
/// text between the previous offset and the new one.
pub(crate) struct LocationTracker<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> LocationTracker<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn locate(&mut self, offset: usize) -> SourceLocation {
        debug_assert!(offset >= self.offset, "offsets must not go backwards");
        if offset > self.offset {
            for ch in self.source[self.offset..offset].chars() {
                if ch == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
            self.offset = offset;
        }
        SourceLocation::new(self.line, self.column)
    }
}
