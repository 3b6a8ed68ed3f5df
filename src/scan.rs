//! Single-pass declaration scanner.
//!
//! Recognizes `package`, `import`, `type` and `func` at top level and
//! assembles a [`SymbolTree`] in source order. Everything else — function
//! bodies, const/var blocks, anything unrecognized — is stepped over with
//! delimiter-balance tracking, never parsed. Malformed constructs are
//! recorded as diagnostics and scanning resumes at the next plausible
//! declaration boundary; the scanner never refuses to produce a partial
//! tree. The one fatal case is running out of input while a delimiter skip
//! is still open.

use crate::error::{Diag, ScanErrorKind, Span};
use crate::lexer::{Lexer, Tok};
use crate::outline::{
    Decl, FuncDecl, ImportBinding, ImportSpec, SymbolTree, TypeDecl, TypeKind,
};
use crate::shape;

pub(crate) type Spanned<'src> = (usize, Tok<'src>, usize);

/// Everything a caller gets back from one parse request: the tree plus the
/// ordered diagnostics channel. Both are plain data; the scanner keeps no
/// state between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub tree: SymbolTree,
    pub diags: Vec<Diag>,
}

/// Scan one source buffer into a symbol tree.
///
/// `path` only identifies the tree; the core never touches the file system.
/// Pure function of its inputs: scanning the same buffer twice yields
/// structurally identical results.
pub fn scan_file(path: &str, src: &str) -> ScanResult {
    let mut lx = Lexer::new(src);
    let toks: Vec<Spanned<'_>> = lx.by_ref().collect();
    let diags = lx.take_diags();

    let mut scanner = Scanner {
        src,
        cur: Cursor::new(toks),
        diags,
        tree: SymbolTree::new(path),
        fatal: false,
        missing_pkg_reported: false,
        pending_doc: None,
    };
    scanner.run();

    let Scanner { tree, mut diags, .. } = scanner;
    diags.sort_by_key(|d| (d.span.start, d.span.end));
    ScanResult { tree, diags }
}

// =============================================================================
// Token cursor
// =============================================================================

pub(crate) struct Cursor<'src> {
    toks: Vec<Spanned<'src>>,
    pos: usize,
}

impl<'src> Cursor<'src> {
    fn new(toks: Vec<Spanned<'src>>) -> Self {
        Self { toks, pos: 0 }
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<&Spanned<'src>> {
        self.toks.get(self.pos)
    }

    #[inline]
    pub(crate) fn peek_tok(&self) -> Option<Tok<'src>> {
        self.peek().map(|&(_, t, _)| t)
    }

    #[inline]
    pub(crate) fn bump(&mut self) -> Option<Spanned<'src>> {
        let item = self.toks.get(self.pos).copied();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    #[inline]
    pub(crate) fn eat(&mut self, tok: Tok<'src>) -> bool {
        if self.peek_tok() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Start offset of the next token, or the end of input.
    #[inline]
    pub(crate) fn next_start(&self, src_len: usize) -> usize {
        self.peek().map_or(src_len, |&(s, _, _)| s)
    }
}

#[inline]
pub(crate) const fn is_opener(t: Tok<'_>) -> bool {
    matches!(t, Tok::LParen | Tok::LBrack | Tok::LBrace)
}

#[inline]
pub(crate) const fn is_closer(t: Tok<'_>) -> bool {
    matches!(t, Tok::RParen | Tok::RBrack | Tok::RBrace)
}

/// Strip comment markers for doc metadata: `// x` and `/* x */` both
/// become `x`.
pub(crate) fn comment_text(raw: &str) -> &str {
    let body = if let Some(rest) = raw.strip_prefix("//") {
        rest
    } else if let Some(rest) = raw.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest)
    } else {
        raw
    };
    body.trim()
}

// =============================================================================
// Scanner
// =============================================================================

pub(crate) struct Scanner<'src> {
    pub(crate) src: &'src str,
    pub(crate) cur: Cursor<'src>,
    pub(crate) diags: Vec<Diag>,
    tree: SymbolTree,
    fatal: bool,
    missing_pkg_reported: bool,
    /// Most recent contiguous comment block (text, end offset); candidate
    /// doc comment for the next declaration.
    pending_doc: Option<(String, usize)>,
}

impl<'src> Scanner<'src> {
    fn run(&mut self) {
        while !self.fatal {
            match self.cur.peek_tok() {
                None => break,
                Some(Tok::Comment(c)) => {
                    let (_, _, end) = self.cur.bump().unwrap_or_default();
                    self.push_doc(c, end);
                }
                Some(Tok::Semi) => {
                    self.cur.bump();
                }
                Some(Tok::KwPackage) => {
                    self.pending_doc = None;
                    self.package_clause();
                }
                Some(Tok::KwImport) => {
                    self.pending_doc = None;
                    self.import_decl();
                }
                Some(Tok::KwType) => {
                    let doc = self.take_doc();
                    self.type_decl(doc);
                }
                Some(Tok::KwFunc) => {
                    let doc = self.take_doc();
                    self.func_decl(doc);
                }
                Some(_) => {
                    self.pending_doc = None;
                    self.skip_unknown();
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Doc comment accumulation
    // -------------------------------------------------------------------------

    fn push_doc(&mut self, raw: &str, end: usize) {
        let line = comment_text(raw);
        match &mut self.pending_doc {
            // Contiguous comment lines merge; a gap starts a new block.
            Some((text, prev_end)) if at_most_one_newline(self.src, *prev_end, end) => {
                if !line.is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(line);
                }
                *prev_end = end;
            }
            _ => self.pending_doc = Some((line.to_string(), end)),
        }
    }

    /// Pending doc block, if it directly precedes the token at the cursor.
    fn take_doc(&mut self) -> Option<String> {
        let decl_start = self.cur.next_start(self.src.len());
        let (text, end) = self.pending_doc.take()?;
        if at_most_one_newline(self.src, end, decl_start) && !text.is_empty() {
            Some(text)
        } else {
            None
        }
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn package_clause(&mut self) {
        let (kw_start, _, kw_end) = self.cur.bump().unwrap_or_default();

        match self.cur.peek_tok() {
            Some(Tok::Ident(name)) => {
                let (s, _, e) = self.cur.bump().unwrap_or_default();
                if self.tree.package.is_some() {
                    self.diag(ScanErrorKind::MalformedPackageClause, Span::new(kw_start, e));
                } else {
                    self.tree.package = Some(name.to_string());
                    self.tree.package_span = Span::new(s, e);
                }
            }
            _ => {
                // A clause was present, just broken; don't report the file
                // as missing one on top.
                self.missing_pkg_reported = true;
                self.diag(
                    ScanErrorKind::MalformedPackageClause,
                    Span::new(kw_start, kw_end),
                );
            }
        }
        self.finish_line();
    }

    /// Records `MalformedPackageClause` once if a declaration shows up
    /// before any package clause did.
    fn require_package(&mut self, at: Span) {
        if self.tree.package.is_none() && !self.missing_pkg_reported {
            self.missing_pkg_reported = true;
            self.diag(ScanErrorKind::MalformedPackageClause, at);
        }
    }

    fn import_decl(&mut self) {
        let (kw_start, _, kw_end) = self.cur.bump().unwrap_or_default();
        self.require_package(Span::new(kw_start, kw_end));

        if self.cur.eat(Tok::LParen) {
            loop {
                match self.cur.peek_tok() {
                    None => {
                        self.fatal_unbalanced(Span::new(kw_start, kw_end));
                        return;
                    }
                    Some(Tok::RParen) => {
                        self.cur.bump();
                        break;
                    }
                    Some(Tok::Semi) | Some(Tok::Comment(_)) => {
                        self.cur.bump();
                    }
                    // A stray `]`/`}` would stall recovery; step over it.
                    Some(t) if is_closer(t) => {
                        self.cur.bump();
                    }
                    Some(_) => self.import_spec(),
                }
            }
        } else {
            self.import_spec();
        }
        self.finish_line();
    }

    /// One import line: optional binding token, then the path literal.
    fn import_spec(&mut self) {
        let line_start = self.cur.next_start(self.src.len());

        let binding = match self.cur.peek_tok() {
            Some(Tok::Ident("_")) => {
                self.cur.bump();
                ImportBinding::Blank
            }
            Some(Tok::Dot) => {
                self.cur.bump();
                ImportBinding::Dot
            }
            Some(Tok::Ident(alias)) => {
                self.cur.bump();
                ImportBinding::Alias(alias.to_string())
            }
            Some(Tok::Str(_)) | Some(Tok::RawStr(_)) => ImportBinding::Default,
            _ => {
                let span = self.skip_to_line_end(line_start);
                self.diag(ScanErrorKind::MalformedImport, span);
                return;
            }
        };

        let path = match self.cur.peek_tok() {
            Some(Tok::Str(lit)) | Some(Tok::RawStr(lit)) => {
                self.cur.bump();
                strip_quotes(lit).to_string()
            }
            _ => {
                let span = self.skip_to_line_end(line_start);
                self.diag(ScanErrorKind::MalformedImport, span);
                return;
            }
        };

        let end = self.prev_end(line_start);
        self.tree.imports.push(ImportSpec {
            path,
            binding,
            span: Span::new(line_start, end),
        });
    }

    fn type_decl(&mut self, doc: Option<String>) {
        let (kw_start, _, kw_end) = self.cur.bump().unwrap_or_default();
        self.require_package(Span::new(kw_start, kw_end));

        if self.cur.eat(Tok::LParen) {
            let mut group_doc: Option<String> = None;
            loop {
                match self.cur.peek_tok() {
                    None => {
                        self.fatal_unbalanced(Span::new(kw_start, kw_end));
                        return;
                    }
                    Some(Tok::RParen) => {
                        self.cur.bump();
                        break;
                    }
                    Some(Tok::Semi) => {
                        self.cur.bump();
                    }
                    Some(Tok::Comment(c)) => {
                        let (_, _, end) = self.cur.bump().unwrap_or_default();
                        self.push_doc(c, end);
                        group_doc = self.pending_doc.as_ref().map(|(t, _)| t.clone());
                    }
                    Some(t) if is_closer(t) => {
                        self.cur.bump();
                    }
                    Some(_) => {
                        let d = group_doc.take();
                        self.type_spec(kw_start, d);
                    }
                }
                if self.fatal {
                    return;
                }
            }
        } else {
            self.type_spec(kw_start, doc);
        }
        self.finish_line();
    }

    /// `Name [type params] (= Alias | struct{...} | interface{...} | Expr)`
    fn type_spec(&mut self, decl_start: usize, doc: Option<String>) {
        let name = match self.cur.peek_tok() {
            Some(Tok::Ident(name)) => {
                self.cur.bump();
                name.to_string()
            }
            _ => {
                // No error kind covers a broken type header; recover
                // silently at the next line.
                self.skip_to_line_end(decl_start);
                return;
            }
        };

        // Generic type parameters are stepped over, not modeled.
        if self.cur.peek_tok() == Some(Tok::LBrack) && !self.skip_balanced() {
            return;
        }

        let kind = match self.cur.peek_tok() {
            Some(Tok::Assign) => {
                self.cur.bump();
                let text = self.capture_type_expr().unwrap_or_default();
                TypeKind::Alias(text)
            }
            Some(Tok::KwStruct) => {
                self.cur.bump();
                if self.cur.peek_tok() == Some(Tok::LBrace) {
                    let (bs, _, be) = self.cur.bump().unwrap_or_default();
                    TypeKind::Struct(shape::struct_body(self, Span::new(bs, be)))
                } else {
                    self.skip_to_line_end(decl_start);
                    TypeKind::Struct(Vec::new())
                }
            }
            Some(Tok::KwInterface) => {
                self.cur.bump();
                if self.cur.peek_tok() == Some(Tok::LBrace) {
                    let (bs, _, be) = self.cur.bump().unwrap_or_default();
                    TypeKind::Interface(shape::interface_body(self, Span::new(bs, be)))
                } else {
                    self.skip_to_line_end(decl_start);
                    TypeKind::Interface(Vec::new())
                }
            }
            _ => {
                let text = self.capture_type_expr().unwrap_or_default();
                TypeKind::Other(text)
            }
        };

        let end = self.prev_end(decl_start);
        self.tree.decls.push(Decl::Type(TypeDecl {
            name,
            kind,
            doc,
            span: Span::new(decl_start, end),
        }));

        // Trailing comment / line terminator of a single-form decl; inside
        // a grouped decl the group loop owns the semis.
        while let Some(Tok::Comment(_)) = self.cur.peek_tok() {
            self.cur.bump();
        }
        self.cur.eat(Tok::Semi);
    }

    fn func_decl(&mut self, doc: Option<String>) {
        let (kw_start, _, kw_end) = self.cur.bump().unwrap_or_default();
        self.require_package(Span::new(kw_start, kw_end));

        let receiver = if self.cur.peek_tok() == Some(Tok::LParen) {
            match self.collect_group() {
                Some(group) => receiver_base(&group),
                None => return, // fatal
            }
        } else {
            None
        };

        let name = match self.cur.peek_tok() {
            Some(Tok::Ident(name)) => {
                self.cur.bump();
                name.to_string()
            }
            _ => {
                self.skip_to_line_end(kw_start);
                return;
            }
        };

        // Generic type parameters: stepped over.
        if self.cur.peek_tok() == Some(Tok::LBrack) && !self.skip_balanced() {
            return;
        }

        let params = if self.cur.peek_tok() == Some(Tok::LParen) {
            match self.collect_group() {
                Some(group) => shape::param_types(self.src, &group),
                None => return,
            }
        } else {
            Vec::new()
        };

        let results = match self.cur.peek_tok() {
            Some(Tok::LParen) => match self.collect_group() {
                Some(group) => shape::param_types(self.src, &group),
                None => return,
            },
            Some(Tok::LBrace) | Some(Tok::Semi) | Some(Tok::Comment(_)) | None => Vec::new(),
            Some(t) if is_closer(t) => Vec::new(),
            Some(_) => self.capture_type_expr().map_or_else(Vec::new, |t| vec![t]),
        };

        // Body is an opaque token span; only the braces are balanced. Even
        // when the body never closes, the already-scanned header stays in
        // the tree next to the fatal diagnostic.
        let body_ok = match self.cur.peek_tok() {
            Some(Tok::LBrace) => self.skip_balanced(),
            _ => true,
        };

        let end = self.prev_end(kw_start);
        self.tree.decls.push(Decl::Func(FuncDecl {
            name,
            receiver,
            params,
            results,
            doc,
            span: Span::new(kw_start, end),
        }));
        if body_ok {
            self.finish_line();
        }
    }

    // -------------------------------------------------------------------------
    // Skipping / recovery
    // -------------------------------------------------------------------------

    /// Skip an unrecognized top-level construct (const/var blocks, stray
    /// tokens) to the next declaration keyword or line end. Always makes
    /// progress, so the scan stays O(tokens) on malformed input.
    fn skip_unknown(&mut self) {
        if self.cur.bump().is_none() {
            return;
        }
        loop {
            match self.cur.peek_tok() {
                None => return,
                Some(t) if t.starts_decl() => return,
                Some(Tok::Semi) => {
                    self.cur.bump();
                    return;
                }
                Some(t) if is_opener(t) => {
                    if !self.skip_balanced() {
                        return;
                    }
                }
                Some(_) => {
                    self.cur.bump();
                }
            }
        }
    }

    /// Cursor is at an opening delimiter; consume through its match.
    /// Returns false (and records the fatal diagnostic) if the input ends
    /// first.
    pub(crate) fn skip_balanced(&mut self) -> bool {
        let Some((open_start, _, open_end)) = self.cur.bump() else {
            return true;
        };
        let mut depth = 1usize;
        while depth > 0 {
            match self.cur.bump() {
                None => {
                    self.fatal_unbalanced(Span::new(open_start, open_end));
                    return false;
                }
                Some((_, t, _)) if is_opener(t) => depth += 1,
                Some((_, t, _)) if is_closer(t) => depth -= 1,
                Some(_) => {}
            }
        }
        true
    }

    /// Cursor is at `(`; consume the group and return the tokens strictly
    /// inside it. `None` means the input ended inside the group (fatal
    /// already recorded).
    fn collect_group(&mut self) -> Option<Vec<Spanned<'src>>> {
        let (open_start, _, open_end) = self.cur.bump()?;
        let mut depth = 1usize;
        let mut out = Vec::new();
        loop {
            match self.cur.bump() {
                None => {
                    self.fatal_unbalanced(Span::new(open_start, open_end));
                    return None;
                }
                Some(item @ (_, t, _)) => {
                    if is_opener(t) {
                        depth += 1;
                    } else if is_closer(t) {
                        depth -= 1;
                        if depth == 0 {
                            return Some(out);
                        }
                    }
                    out.push(item);
                }
            }
        }
    }

    /// Consume to the end of the current line (past the `;`), leaving a
    /// closing delimiter for the caller. Returns the span skipped.
    fn skip_to_line_end(&mut self, from: usize) -> Span {
        loop {
            match self.cur.peek_tok() {
                None => break,
                Some(Tok::Semi) => {
                    self.cur.bump();
                    break;
                }
                Some(t) if is_closer(t) => break,
                Some(t) if is_opener(t) => {
                    if !self.skip_balanced() {
                        break;
                    }
                }
                Some(_) => {
                    self.cur.bump();
                }
            }
        }
        Span::new(from, self.prev_end(from))
    }

    /// Capture one type expression as source text. Stops at a line or list
    /// boundary at delimiter depth zero; a `{` only continues the
    /// expression directly after `struct` / `interface` (anonymous type
    /// literals stay one opaque expression).
    pub(crate) fn capture_type_expr(&mut self) -> Option<String> {
        let mut depth = 0usize;
        let mut first: Option<usize> = None;
        let mut last_end = 0usize;
        let mut prev: Option<Tok<'src>> = None;

        while let Some(t) = self.cur.peek_tok() {
            if depth == 0 {
                match t {
                    Tok::Semi | Tok::Comma | Tok::Comment(_) | Tok::Assign => break,
                    Tok::RParen | Tok::RBrace | Tok::RBrack => break,
                    Tok::LBrace
                        if !matches!(prev, Some(Tok::KwStruct) | Some(Tok::KwInterface)) =>
                    {
                        break
                    }
                    _ => {}
                }
            }
            if is_opener(t) {
                depth += 1;
            } else if is_closer(t) {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            let (s, tok, e) = self.cur.bump().unwrap_or_default();
            first.get_or_insert(s);
            last_end = e;
            prev = Some(tok);
        }

        first.map(|s| self.src[s..last_end].trim().to_string())
    }

    /// Consume trailing comments and the line-terminating semi, if present.
    fn finish_line(&mut self) {
        loop {
            match self.cur.peek_tok() {
                Some(Tok::Comment(_)) => {
                    self.cur.bump();
                }
                Some(Tok::Semi) => {
                    self.cur.bump();
                    break;
                }
                _ => break,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Small helpers
    // -------------------------------------------------------------------------

    pub(crate) fn diag(&mut self, kind: ScanErrorKind, span: Span) {
        self.diags.push(kind.diag(span));
    }

    pub(crate) fn fatal_unbalanced(&mut self, span: Span) {
        if !self.fatal {
            self.fatal = true;
            self.diag(ScanErrorKind::UnbalancedDelimiters, span);
        }
    }

    /// End offset of the last consumed token (fallback for empty runs).
    fn prev_end(&self, fallback: usize) -> usize {
        if self.cur.pos == 0 {
            fallback
        } else {
            self.cur.toks[self.cur.pos - 1].2.max(fallback)
        }
    }
}

/// Receiver base type name: `(p *Point)` -> `Point`, `(*List[T])` -> `List`,
/// `(r io.Reader)` -> `io.Reader`.
fn receiver_base(group: &[Spanned<'_>]) -> Option<String> {
    let toks: Vec<Tok<'_>> = group
        .iter()
        .map(|&(_, t, _)| t)
        .filter(|t| !t.is_comment())
        .collect();
    if toks.is_empty() {
        return None;
    }

    let mut i = 0;
    // Leading receiver name, if any: an identifier followed by more tokens
    // that do not qualify it.
    if toks.len() > 1 && matches!(toks[0], Tok::Ident(_)) && toks[1] != Tok::Dot {
        i = 1;
    }
    if toks.get(i) == Some(&Tok::Star) {
        i += 1;
    }

    let mut name = String::new();
    while let Some(t) = toks.get(i) {
        match t {
            Tok::Ident(part) => {
                name.push_str(part);
                i += 1;
                if toks.get(i) == Some(&Tok::Dot) {
                    name.push('.');
                    i += 1;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[inline]
pub(crate) fn strip_quotes(lit: &str) -> &str {
    let b = lit.as_bytes();
    if b.len() >= 2 && (b[0] == b'"' || b[0] == b'`') {
        &lit[1..lit.len() - 1]
    } else {
        lit
    }
}

/// True if the source between two offsets crosses at most one line break
/// (i.e. the regions are on the same or adjacent lines).
fn at_most_one_newline(src: &str, from: usize, to: usize) -> bool {
    if from >= to || to > src.len() {
        return true;
    }
    src[from..to].bytes().filter(|&b| b == b'\n').count() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_quotes_handles_both_literal_forms() {
        assert_eq!(strip_quotes("\"a/b\""), "a/b");
        assert_eq!(strip_quotes("`raw`"), "raw");
        assert_eq!(strip_quotes("x"), "x");
    }

    #[test]
    fn receiver_base_variants() {
        fn toks(src: &str) -> Vec<Spanned<'_>> {
            Lexer::new(src).collect()
        }
        // Trailing injected semi is harmless for receiver_base.
        assert_eq!(receiver_base(&toks("p Point")), Some("Point".into()));
        assert_eq!(receiver_base(&toks("p *Point")), Some("Point".into()));
        assert_eq!(receiver_base(&toks("*Point")), Some("Point".into()));
        assert_eq!(receiver_base(&toks("r io.Reader")), Some("io.Reader".into()));
        assert_eq!(receiver_base(&toks("p *List[T]")), Some("List".into()));
        assert_eq!(receiver_base(&toks("")), None);
    }
}
