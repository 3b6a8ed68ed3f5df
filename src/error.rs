use thiserror::Error;

/// Compact byte-span used across the scanner.
///
/// Lexer and scanner positions are `usize`; we convert to `u32` for
/// compactness. If you need >4GiB inputs, change to `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32, // exclusive
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        // Production choice: clamp rather than panic.
        let s = if start > u32::MAX as usize {
            u32::MAX
        } else {
            start as u32
        };
        let e = if end > u32::MAX as usize {
            u32::MAX
        } else {
            end as u32
        };
        Self { start: s, end: e }
    }

    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        let p = if pos > u32::MAX as usize {
            u32::MAX
        } else {
            pos as u32
        };
        Self { start: p, end: p }
    }

    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn cover(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One entry of the diagnostics channel produced alongside the tree.
///
/// Consumed by the editor's problem list; the core itself never reads it
/// back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub span: Span,
    pub severity: Severity,
    pub message: String,
}

impl Diag {
    #[inline]
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    #[inline]
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[error("invalid token")]
    #[default]
    InvalidToken,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated raw string literal")]
    UnterminatedRawString,
    #[error("unterminated block comment")]
    UnterminatedComment,
}

impl LexErrorKind {
    #[inline]
    pub fn diag(self, span: Span) -> Diag {
        Diag::error(span, self.to_string())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    #[error("malformed package clause")]
    MalformedPackageClause,
    #[error("malformed import declaration")]
    MalformedImport,
    #[error("malformed field or method")]
    MalformedFieldOrMethod,
    #[error("unbalanced delimiters")]
    UnbalancedDelimiters,
}

impl ScanErrorKind {
    #[inline]
    pub fn diag(self, span: Span) -> Diag {
        Diag::error(span, self.to_string())
    }

    /// Only `UnbalancedDelimiters` truncates a scan; everything else is
    /// recovered locally.
    #[inline]
    pub const fn is_fatal(self) -> bool {
        matches!(self, ScanErrorKind::UnbalancedDelimiters)
    }
}

/// Byte offset -> 1-based line/column conversion for diagnostics display.
///
/// Built once per buffer from newline positions; columns are byte columns
/// within the line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut line_starts = Vec::with_capacity(64);
        line_starts.push(0);
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// (line, column), both 1-based; columns count bytes.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col + 1)
    }
}
