//! Type-shape parsing for `struct` and `interface` bodies.
//!
//! Works line by line: semicolon insertion in the lexer makes every field
//! or method declaration a semi-delimited token run, so the shape parser
//! never needs lookahead across lines. An unparseable line becomes a
//! `Malformed` entry carrying its span; the rest of the type still parses.

use smallvec::SmallVec;

use crate::error::{ScanErrorKind, Span};
use crate::lexer::Tok;
use crate::outline::{FieldEntry, InterfaceEntry, MethodSig};
use crate::scan::{comment_text, is_closer, is_opener, strip_quotes, Scanner, Spanned};

// =============================================================================
// Struct bodies
// =============================================================================

/// Cursor is just past the `{` (whose span is `open`); consumes through the
/// matching `}`. Field order is preserved exactly as declared.
pub(crate) fn struct_body(s: &mut Scanner<'_>, open: Span) -> Vec<FieldEntry> {
    let mut fields = Vec::new();
    let mut pending_doc: Option<String> = None;

    loop {
        match s.cur.peek_tok() {
            None => {
                s.fatal_unbalanced(open);
                break;
            }
            Some(Tok::RBrace) => {
                s.cur.bump();
                break;
            }
            Some(Tok::Semi) => {
                s.cur.bump();
            }
            Some(Tok::Comment(c)) => {
                s.cur.bump();
                append_doc(&mut pending_doc, comment_text(c));
            }
            Some(_) => {
                let line = collect_line(s);
                if line.is_empty() {
                    // Stray closer: consume it or the body loop stalls.
                    s.cur.bump();
                    continue;
                }
                let doc = pending_doc.take();
                field_line(s, &line, doc, &mut fields);
            }
        }
    }
    fields
}

/// Classify one struct field line.
fn field_line(
    s: &mut Scanner<'_>,
    line: &[Spanned<'_>],
    own_line_doc: Option<String>,
    fields: &mut Vec<FieldEntry>,
) {
    // A trailing same-line comment wins over a preceding own-line one.
    let mut doc = own_line_doc;
    if let Some((_, Tok::Comment(c), _)) = line.last() {
        doc = Some(comment_text(c).to_string());
    }

    let toks: Vec<Spanned<'_>> = line
        .iter()
        .filter(|(_, t, _)| !t.is_comment())
        .copied()
        .collect();
    let Some(span) = tokens_span(&toks) else {
        return;
    };

    // Optional struct tag: a final string literal after the type.
    let mut toks = &toks[..];
    let mut tag = None;
    if toks.len() >= 2 {
        if let (_, Tok::Str(lit) | Tok::RawStr(lit), _) = toks[toks.len() - 1] {
            tag = Some(strip_quotes(lit).to_string());
            toks = &toks[..toks.len() - 1];
        }
    }

    match toks[0].1 {
        // `*T` / `*pkg.T`: pointer-to-embedded.
        Tok::Star if toks.len() >= 2 => {
            fields.push(FieldEntry::Embedded {
                ty: text(s.src, &toks[1..]),
                pointer: true,
                tag,
                doc,
                span,
            });
        }

        Tok::Ident(first) => {
            let mut names: SmallVec<[&str; 2]> = SmallVec::new();
            names.push(first);
            let mut i = 1;
            while i + 1 < toks.len() && toks[i].1 == Tok::Comma {
                match toks[i + 1].1 {
                    Tok::Ident(n) => {
                        names.push(n);
                        i += 2;
                    }
                    _ => break,
                }
            }

            if i >= toks.len() {
                // Bare type expression: embedded field.
                if names.len() == 1 {
                    fields.push(FieldEntry::Embedded {
                        ty: first.to_string(),
                        pointer: false,
                        tag,
                        doc,
                        span,
                    });
                } else {
                    malformed_field(s, fields, span);
                }
            } else if toks[i].1 == Tok::Dot {
                // Package-qualified embedded field (`pkg.Type`).
                if names.len() == 1 {
                    fields.push(FieldEntry::Embedded {
                        ty: text(s.src, toks),
                        pointer: false,
                        tag,
                        doc,
                        span,
                    });
                } else {
                    malformed_field(s, fields, span);
                }
            } else {
                // Named field(s): every name shares the one type expression.
                let ty = text(s.src, &toks[i..]);
                for name in names {
                    if name == "_" {
                        fields.push(FieldEntry::Blank {
                            ty: ty.clone(),
                            doc: doc.clone(),
                            span,
                        });
                    } else {
                        fields.push(FieldEntry::Named {
                            name: name.to_string(),
                            ty: ty.clone(),
                            tag: tag.clone(),
                            doc: doc.clone(),
                            span,
                        });
                    }
                }
            }
        }

        _ => malformed_field(s, fields, span),
    }
}

fn malformed_field(s: &mut Scanner<'_>, fields: &mut Vec<FieldEntry>, span: Span) {
    s.diag(ScanErrorKind::MalformedFieldOrMethod, span);
    fields.push(FieldEntry::Malformed { span });
}

// =============================================================================
// Interface bodies
// =============================================================================

/// Cursor is just past the `{`; consumes through the matching `}`. Embeds
/// and method signatures stay interleaved in declaration order.
pub(crate) fn interface_body(s: &mut Scanner<'_>, open: Span) -> Vec<InterfaceEntry> {
    let mut entries = Vec::new();
    let mut pending_doc: Option<String> = None;

    loop {
        match s.cur.peek_tok() {
            None => {
                s.fatal_unbalanced(open);
                break;
            }
            Some(Tok::RBrace) => {
                s.cur.bump();
                break;
            }
            Some(Tok::Semi) => {
                s.cur.bump();
            }
            Some(Tok::Comment(c)) => {
                s.cur.bump();
                append_doc(&mut pending_doc, comment_text(c));
            }
            Some(_) => {
                let line = collect_line(s);
                if line.is_empty() {
                    s.cur.bump();
                    continue;
                }
                let doc = pending_doc.take();
                interface_line(s, &line, doc, &mut entries);
            }
        }
    }
    entries
}

fn interface_line(
    s: &mut Scanner<'_>,
    line: &[Spanned<'_>],
    own_line_doc: Option<String>,
    entries: &mut Vec<InterfaceEntry>,
) {
    let mut doc = own_line_doc;
    if let Some((_, Tok::Comment(c), _)) = line.last() {
        doc = Some(comment_text(c).to_string());
    }

    let toks: Vec<Spanned<'_>> = line
        .iter()
        .filter(|(_, t, _)| !t.is_comment())
        .copied()
        .collect();
    let Some(span) = tokens_span(&toks) else {
        return;
    };

    if is_type_ref(&toks) {
        // Bare (possibly qualified) type name: embedded interface. The
        // referenced method set is recorded, never resolved here.
        entries.push(InterfaceEntry::Embed {
            name: text(s.src, &toks),
            span,
        });
        return;
    }

    match (toks.first(), toks.get(1)) {
        (Some(&(_, Tok::Ident(name), _)), Some(&(_, Tok::LParen, _))) => {
            match method_sig(s.src, name, &toks, doc, span) {
                Some(sig) => entries.push(InterfaceEntry::Method(sig)),
                None => {
                    s.diag(ScanErrorKind::MalformedFieldOrMethod, span);
                    entries.push(InterfaceEntry::Malformed { span });
                }
            }
        }
        _ => {
            s.diag(ScanErrorKind::MalformedFieldOrMethod, span);
            entries.push(InterfaceEntry::Malformed { span });
        }
    }
}

/// `Ident (Dot Ident)*` and nothing else.
fn is_type_ref(toks: &[Spanned<'_>]) -> bool {
    let mut i = 0;
    loop {
        match toks.get(i) {
            Some((_, Tok::Ident(_), _)) => i += 1,
            _ => return false,
        }
        match toks.get(i) {
            None => return true,
            Some((_, Tok::Dot, _)) => i += 1,
            Some(_) => return false,
        }
    }
}

/// `Name(params) results?` — parameter and result arity/type texts.
fn method_sig(
    src: &str,
    name: &str,
    toks: &[Spanned<'_>],
    doc: Option<String>,
    span: Span,
) -> Option<MethodSig> {
    let close = matching_close(toks, 1)?;
    let params = param_types(src, &toks[2..close]);

    let rest = &toks[close + 1..];
    let results = if rest.is_empty() {
        Vec::new()
    } else if rest[0].1 == Tok::LParen && matching_close(rest, 0) == Some(rest.len() - 1) {
        param_types(src, &rest[1..rest.len() - 1])
    } else {
        vec![text(src, rest)]
    };

    Some(MethodSig {
        name: name.to_string(),
        params,
        results,
        doc,
        span,
    })
}

/// Index of the delimiter that closes the opener at `open_idx`.
fn matching_close(toks: &[Spanned<'_>], open_idx: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &(_, t, _)) in toks.iter().enumerate().skip(open_idx) {
        if is_opener(t) {
            depth += 1;
        } else if is_closer(t) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

// =============================================================================
// Parameter / result lists
// =============================================================================

/// Type texts of a parameter (or named-result) list, multi-name groups
/// expanded: `a, b int, c string` -> `[int, int, string]`.
///
/// Comma groups that are a single identifier are held back until a later
/// group settles whether they are names sharing its type or stand-alone
/// unnamed types; leftovers at the end are types.
pub(crate) fn param_types(src: &str, toks: &[Spanned<'_>]) -> Vec<String> {
    let structural: Vec<Spanned<'_>> = toks
        .iter()
        .filter(|(_, t, _)| !t.is_comment())
        .copied()
        .collect();

    let mut groups: Vec<&[Spanned<'_>]> = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, &(_, t, _)) in structural.iter().enumerate() {
        if is_opener(t) {
            depth += 1;
        } else if is_closer(t) {
            depth = depth.saturating_sub(1);
        } else if t == Tok::Comma && depth == 0 {
            groups.push(&structural[start..i]);
            start = i + 1;
        }
    }
    if start < structural.len() {
        groups.push(&structural[start..]);
    }

    let mut out = Vec::new();
    let mut pending: SmallVec<[&str; 4]> = SmallVec::new();
    for g in groups {
        match g {
            [] => {}
            [(_, Tok::Ident(n), _)] => pending.push(*n),
            _ if g.len() > 1 && matches!(g[0].1, Tok::Ident(_)) && g[1].1 != Tok::Dot => {
                // Name followed by its type; pendings were names too.
                let ty = text(src, &g[1..]);
                for _ in pending.drain(..) {
                    out.push(ty.clone());
                }
                out.push(ty);
            }
            _ => {
                // Unnamed type; pendings were types as well.
                for p in pending.drain(..) {
                    out.push((*p).to_string());
                }
                out.push(text(src, g));
            }
        }
    }
    for p in pending {
        out.push(p.to_string());
    }
    out
}

// =============================================================================
// Line collection / helpers
// =============================================================================

/// Tokens up to the end of the current line: a `;` at depth zero (consumed,
/// excluded) or a closing delimiter at depth zero (left for the caller).
fn collect_line<'src>(s: &mut Scanner<'src>) -> Vec<Spanned<'src>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    loop {
        match s.cur.peek_tok() {
            None => break,
            Some(Tok::Semi) if depth == 0 => {
                s.cur.bump();
                break;
            }
            Some(t) => {
                if is_opener(t) {
                    depth += 1;
                } else if is_closer(t) {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                if let Some(item) = s.cur.bump() {
                    out.push(item);
                }
            }
        }
    }
    out
}

fn tokens_span(toks: &[Spanned<'_>]) -> Option<Span> {
    let first = toks.first()?;
    let last = toks.last()?;
    Some(Span::new(first.0, last.2))
}

fn text(src: &str, toks: &[Spanned<'_>]) -> String {
    match (toks.first(), toks.last()) {
        (Some(&(start, _, _)), Some(&(_, _, end))) => src[start..end].to_string(),
        _ => String::new(),
    }
}

fn append_doc(doc: &mut Option<String>, line: &str) {
    if line.is_empty() {
        return;
    }
    match doc {
        Some(text) => {
            text.push('\n');
            text.push_str(line);
        }
        None => *doc = Some(line.to_string()),
    }
}
