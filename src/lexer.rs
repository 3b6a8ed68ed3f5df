use crate::error::{Diag, LexErrorKind, Span};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

#[inline(always)]
const fn first_newline_offset(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'\n' | b'\r') {
            return Some(i);
        }
        i += 1;
    }

    None
}

// =============================================================================
// Literal / comment scanners (manual; recover instead of aborting)
// =============================================================================

/// `/*` has been consumed; find `*/` or flag the comment as unterminated.
/// Either way the token covers everything consumed, so the caller can keep
/// lexing after it.
#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    use memchr::memchr;

    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;

        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }

        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

/// Opening backtick consumed. Raw strings may span lines, so an unterminated
/// one runs to end of file.
#[inline]
fn lex_raw_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    use memchr::memchr;

    let rem = lex.remainder().as_bytes();
    match memchr(b'`', rem) {
        Some(i) => {
            lex.bump(i + 1);
            Ok(())
        }
        None => {
            lex.bump(rem.len());
            Err(LexErrorKind::UnterminatedRawString)
        }
    }
}

/// Opening quote consumed. Escapes are carried through verbatim, never
/// interpreted; an interpreted string cannot contain a raw newline, so the
/// error token stops at end of line and the rest of the file still lexes.
#[inline]
fn lex_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut i = 0;

    while i < rem.len() {
        match rem[i] {
            b'"' => {
                lex.bump(i + 1);
                return Ok(());
            }
            b'\n' | b'\r' => {
                lex.bump(i);
                return Err(LexErrorKind::UnterminatedString);
            }
            b'\\' => {
                if i + 1 >= rem.len() || matches!(rem[i + 1], b'\n' | b'\r') {
                    lex.bump(i + 1);
                    return Err(LexErrorKind::UnterminatedString);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedString)
}

/// Maximal munch for numeric literals. The outline never interprets values,
/// so there is no validity classification; the only jobs are to not split a
/// literal in two and to not steal `..` or a `+`/`-` that is really an
/// operator (hex `e` is a digit, so only `p` opens a hex exponent).
#[inline]
fn lex_number(lex: &mut LogosLexer<'_, RawTok>) {
    let src = lex.source().as_bytes();
    let n = src.len();
    let start = lex.span().start;
    let mut i = lex.span().end;

    let is_hex = src[start] == b'0' && start + 1 < n && (src[start + 1] | 0x20) == b'x';
    let exp = if is_hex { b'p' } else { b'e' };

    while i < n {
        let b = src[i];
        if b.is_ascii_alphanumeric() || b == b'_' {
            let signed_exp =
                (b | 0x20) == exp && i + 1 < n && matches!(src[i + 1], b'+' | b'-');
            i += if signed_exp { 2 } else { 1 };
        } else if b == b'.' && !(i + 1 < n && src[i + 1] == b'.') {
            i += 1;
        } else {
            break;
        }
    }

    let already = lex.span().end;
    if i > already {
        lex.bump(i - already);
    }
}

// =============================================================================
// Raw token definition (logos DFA)
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia / comments (comments are real tokens: they become doc metadata)
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*")] LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Keywords (before Ident)
    #[token("break")] KwBreak,
    #[token("case")] KwCase,
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("continue")] KwContinue,
    #[token("default")] KwDefault,
    #[token("defer")] KwDefer,
    #[token("else")] KwElse,
    #[token("fallthrough")] KwFallthrough,
    #[token("for")] KwFor,
    #[token("func")] KwFunc,
    #[token("go")] KwGo,
    #[token("goto")] KwGoto,
    #[token("if")] KwIf,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("range")] KwRange,
    #[token("return")] KwReturn,
    #[token("select")] KwSelect,
    #[token("struct")] KwStruct,
    #[token("switch")] KwSwitch,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    // Identifiers (`_` is identifier-class)
    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    // Literals (maximal munch / manual scans; no value validation)
    #[regex(r"[0-9]|\.[0-9]", lex_number)] Number,
    #[token("`", lex_raw_string)] RawString,
    #[token("\"", lex_string)] String,
    #[regex(r"'([^'\\\n\r]|\\.)+'")] Rune,

    // Operators the scanner inspects
    #[token("...")] Ellipsis,
    #[token("=")] Assign,
    #[token("*")] Star,
    #[token(".")] Dot,

    // Remaining Go operators; the scanner only ever steps over these, so
    // they all surface as `Tok::Op`, but each one must lex as a unit to
    // keep spans honest inside skipped bodies.
    #[token("<<=")] #[token(">>=")] #[token("&^=")]
    #[token("+=")] #[token("-=")] #[token("*=")] #[token("/=")] #[token("%=")]
    #[token("&=")] #[token("|=")] #[token("^=")]
    #[token("<<")] #[token(">>")] #[token("&^")]
    #[token("&&")] #[token("||")] #[token("==")] #[token("!=")]
    #[token("<=")] #[token(">=")] #[token("++")] #[token("--")]
    #[token(":=")] #[token("<-")]
    #[token("+")] #[token("-")] #[token("/")] #[token("%")]
    #[token("&")] #[token("|")] #[token("^")] #[token("~")] #[token("!")]
    #[token("<")] #[token(">")] #[token(":")]
    Op,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

impl RawTok {
    /// Go automatic-semicolon-insertion rule: these token kinds allow a
    /// following newline to terminate the line.
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        matches!(
            self,
            RawTok::Ident
                | RawTok::Number
                | RawTok::Rune
                | RawTok::String
                | RawTok::RawString
                | RawTok::KwBreak
                | RawTok::KwContinue
                | RawTok::KwFallthrough
                | RawTok::KwReturn
                | RawTok::RParen
                | RawTok::RBrack
                | RawTok::RBrace
        )
    }
}

// =============================================================================
// Public token definition (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tok<'src> {
    Ident(&'src str),
    Number(&'src str),
    Str(&'src str),
    RawStr(&'src str),
    Rune(&'src str),
    Comment(&'src str),

    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,

    Ellipsis,
    Assign,
    Star,
    Dot,
    /// Any operator the declaration scanner never inspects individually.
    Op(&'src str),

    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,

    #[default]
    Error,
}

impl<'src> Tok<'src> {
    #[inline]
    pub const fn is_comment(&self) -> bool {
        matches!(self, Tok::Comment(_))
    }

    /// True for the keywords that can start a top-level declaration.
    #[inline]
    pub const fn starts_decl(&self) -> bool {
        matches!(
            self,
            Tok::KwPackage | Tok::KwImport | Tok::KwType | Tok::KwFunc
        )
    }
}

impl std::fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[inline]
fn to_token(raw: RawTok, slice: &str) -> Tok<'_> {
    match raw {
        RawTok::Ident => Tok::Ident(slice),
        RawTok::Number => Tok::Number(slice),
        RawTok::String => Tok::Str(slice),
        RawTok::RawString => Tok::RawStr(slice),
        RawTok::Rune => Tok::Rune(slice),
        RawTok::LineComment | RawTok::BlockComment => Tok::Comment(slice),

        RawTok::KwBreak => Tok::KwBreak,
        RawTok::KwCase => Tok::KwCase,
        RawTok::KwChan => Tok::KwChan,
        RawTok::KwConst => Tok::KwConst,
        RawTok::KwContinue => Tok::KwContinue,
        RawTok::KwDefault => Tok::KwDefault,
        RawTok::KwDefer => Tok::KwDefer,
        RawTok::KwElse => Tok::KwElse,
        RawTok::KwFallthrough => Tok::KwFallthrough,
        RawTok::KwFor => Tok::KwFor,
        RawTok::KwFunc => Tok::KwFunc,
        RawTok::KwGo => Tok::KwGo,
        RawTok::KwGoto => Tok::KwGoto,
        RawTok::KwIf => Tok::KwIf,
        RawTok::KwImport => Tok::KwImport,
        RawTok::KwInterface => Tok::KwInterface,
        RawTok::KwMap => Tok::KwMap,
        RawTok::KwPackage => Tok::KwPackage,
        RawTok::KwRange => Tok::KwRange,
        RawTok::KwReturn => Tok::KwReturn,
        RawTok::KwSelect => Tok::KwSelect,
        RawTok::KwStruct => Tok::KwStruct,
        RawTok::KwSwitch => Tok::KwSwitch,
        RawTok::KwType => Tok::KwType,
        RawTok::KwVar => Tok::KwVar,

        RawTok::Ellipsis => Tok::Ellipsis,
        RawTok::Assign => Tok::Assign,
        RawTok::Star => Tok::Star,
        RawTok::Dot => Tok::Dot,
        RawTok::Op => Tok::Op(slice),

        RawTok::LParen => Tok::LParen,
        RawTok::RParen => Tok::RParen,
        RawTok::LBrack => Tok::LBrack,
        RawTok::RBrack => Tok::RBrack,
        RawTok::LBrace => Tok::LBrace,
        RawTok::RBrace => Tok::RBrace,
        RawTok::Comma => Tok::Comma,
        RawTok::Semi => Tok::Semi,

        RawTok::Newline | RawTok::Bom | RawTok::Error => Tok::Error,
    }
}

// =============================================================================
// Lexer wrapper: semicolon insertion + comment pass-through + diags
// =============================================================================

/// Lazy token stream over one source buffer.
///
/// Yields `(start, token, end)` triples with byte offsets. Restartable by
/// construction: `Lexer::new` on the same input always yields the same
/// stream. Lexical problems are recorded as diagnostics and never stop the
/// stream.
pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::with_capacity(8),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        self.diags.push(kind.diag(Span::from_range(span)));
    }

    #[inline]
    fn handle_eof(&mut self) {
        self.eof_done = true;

        if self.last_can_insert_semi {
            self.last_can_insert_semi = false;
            self.pending = Some((self.src_len, Tok::Semi, self.src_len));
        }
    }

    #[inline]
    fn handle_lex_error(&mut self, kind: LexErrorKind) -> (usize, Tok<'src>, usize) {
        let span = self.logos.span();
        self.push_lex_diag(kind, span.clone());
        self.last_can_insert_semi = false;
        (span.start, Tok::Error, span.end)
    }

    /// Returns `None` when the raw token produced nothing (skipped trivia)
    /// and the caller should pull the next one.
    #[inline]
    fn handle_raw_token(&mut self, raw: RawTok) -> Option<(usize, Tok<'src>, usize)> {
        let span = self.logos.span();
        let slice = self.logos.slice();

        match raw {
            // BOM is only valid at the very start of the buffer.
            RawTok::Bom => {
                if span.start == 0 {
                    None
                } else {
                    self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
                    self.last_can_insert_semi = false;
                    Some((span.start, Tok::Error, span.end))
                }
            }

            RawTok::Newline => {
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    Some((span.start, Tok::Semi, span.start))
                } else {
                    None
                }
            }

            // Line comments pass through without touching the semi flag;
            // the newline after them still terminates the line.
            RawTok::LineComment => Some((span.start, Tok::Comment(slice), span.end)),

            // A block comment containing a newline acts as a newline.
            // The injected semi comes first, the comment follows via the
            // pending slot.
            RawTok::BlockComment => {
                let item = (span.start, Tok::Comment(slice), span.end);
                if self.last_can_insert_semi {
                    if let Some(off) = first_newline_offset(slice) {
                        self.last_can_insert_semi = false;
                        self.pending = Some(item);
                        let at = span.start + off;
                        return Some((at, Tok::Semi, at));
                    }
                }
                Some(item)
            }

            RawTok::Error => {
                self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
                self.last_can_insert_semi = false;
                Some((span.start, Tok::Error, span.end))
            }

            _ => {
                self.last_can_insert_semi = raw.can_insert_semicolon();
                Some((span.start, to_token(raw, slice), span.end))
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            if self.eof_done {
                return None;
            }

            match self.logos.next() {
                // Don't return yet: EOF may enqueue a pending ';'.
                None => {
                    self.handle_eof();
                    continue;
                }

                Some(Err(kind)) => return Some(self.handle_lex_error(kind)),

                Some(Ok(raw)) => match self.handle_raw_token(raw) {
                    None => continue,
                    Some(item) => return Some(item),
                },
            }
        }
    }
}
