//! Symbol outline model.
//!
//! One `SymbolTree` per scanned file: package, imports and top-level
//! declarations in source order. The tree is a fully-owned snapshot — it
//! borrows nothing from the source buffer, is never mutated after
//! construction, and is discarded wholesale when the file is re-scanned.
//! That makes it safe to hand to an editor thread while the buffer keeps
//! changing underneath.

use crate::error::Span;

/// How an import is bound in the importing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// No binding token: the package's own declared name applies. Resolving
    /// it requires loading the imported package, which is out of scope here,
    /// so it stays "unknown, resolve later".
    Default,
    /// `import z "b"`
    Alias(String),
    /// `import . "d"` — exported names injected unqualified into file scope.
    Dot,
    /// `import _ "x"` — side effects only, no usable binding.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Path exactly as declared, quotes stripped.
    pub path: String,
    pub binding: ImportBinding,
    pub span: Span,
}

impl ImportSpec {
    /// Whether this import contributes a named entry to the symbol table.
    /// Blank and dot imports are retained for completeness and diagnostics
    /// but expose no name.
    #[inline]
    pub fn is_resolvable(&self) -> bool {
        matches!(self.binding, ImportBinding::Default | ImportBinding::Alias(_))
    }
}

/// One entry of a struct's field list. Order is semantically significant
/// (embedding precedence) and always preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEntry {
    Named {
        name: String,
        ty: String,
        tag: Option<String>,
        doc: Option<String>,
        span: Span,
    },
    /// Field declared by type alone; its members are promoted into the
    /// enclosing type. Only the reference is recorded — promotion is a
    /// later resolution pass's job.
    Embedded {
        ty: String,
        pointer: bool,
        tag: Option<String>,
        doc: Option<String>,
        span: Span,
    },
    /// `_ T`: occupies the type's space but is never addressable. Kept so
    /// padding/alignment documentation survives into the outline.
    Blank {
        ty: String,
        doc: Option<String>,
        span: Span,
    },
    /// Unparseable field line, kept in place so the outline loses nothing.
    Malformed { span: Span },
}

impl FieldEntry {
    pub fn span(&self) -> Span {
        match self {
            FieldEntry::Named { span, .. }
            | FieldEntry::Embedded { span, .. }
            | FieldEntry::Blank { span, .. }
            | FieldEntry::Malformed { span } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    /// Parameter type texts; arity is the length.
    pub params: Vec<String>,
    /// Result type texts; arity is the length.
    pub results: Vec<String>,
    pub doc: Option<String>,
    pub span: Span,
}

/// One line of an interface body, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceEntry {
    Method(MethodSig),
    /// Embedded interface, possibly package-qualified. The referenced
    /// method set is not resolved here, only recorded.
    Embed { name: String, span: Span },
    Malformed { span: Span },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Struct(Vec<FieldEntry>),
    Interface(Vec<InterfaceEntry>),
    /// `type X = T`
    Alias(String),
    /// Any other definition: `type X T`, with the type expression text.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver base type for methods (`(p *Point)` -> `Point`).
    pub receiver: Option<String>,
    pub params: Vec<String>,
    pub results: Vec<String>,
    pub doc: Option<String>,
    pub span: Span,
}

/// Top-level declaration, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Type(t) => &t.name,
            Decl::Func(f) => &f.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Type(t) => t.span,
            Decl::Func(f) => f.span,
        }
    }
}

/// The navigable outline of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolTree {
    /// Identifying path supplied by the caller; never read by the core.
    pub path: String,
    pub package: Option<String>,
    pub package_span: Span,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl SymbolTree {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Imports that expose a name in file scope.
    pub fn named_imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.imports.iter().filter(|i| i.is_resolvable())
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.iter().find_map(|d| match d {
            Decl::Type(t) if t.name == name => Some(t),
            _ => None,
        })
    }

    /// First plain function (not method) with the given name.
    pub fn find_func(&self, name: &str) -> Option<&FuncDecl> {
        self.decls.iter().find_map(|d| match d {
            Decl::Func(f) if f.receiver.is_none() && f.name == name => Some(f),
            _ => None,
        })
    }

    /// Methods declared on the given receiver base type, in source order.
    pub fn methods_of<'a>(&'a self, recv: &'a str) -> impl Iterator<Item = &'a FuncDecl> {
        self.decls.iter().filter_map(move |d| match d {
            Decl::Func(f) if f.receiver.as_deref() == Some(recv) => Some(f),
            _ => None,
        })
    }

    /// Innermost declaration covering a byte offset ("which symbol is the
    /// cursor in"). Declarations do not nest at top level, so the first hit
    /// wins.
    pub fn decl_at(&self, offset: u32) -> Option<&Decl> {
        self.decls.iter().find(|d| d.span().contains(offset))
    }
}
