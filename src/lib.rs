//! Declaration-level Go symbol scanner (Logos lexer + hand-written scanner).
//!
//! Extracts a symbol outline — package, imports, types with their field and
//! method shapes, functions — from a single source buffer, for editor
//! outline views and jump-to-definition indexes. Function bodies are opaque
//! token spans, never parsed; malformed constructs become diagnostics while
//! the rest of the file still produces symbols.
//!
//! ```
//! let out = go_outline::scan_file("pt.go", "package pt\n\ntype P struct { X, Y int }\n");
//! assert_eq!(out.tree.package.as_deref(), Some("pt"));
//! assert!(out.diags.is_empty());
//! ```

pub mod error;
pub mod lexer;
pub mod outline;
pub mod scan;
mod shape;

// Re-exports for convenience
pub use error::{Diag, LineIndex, Severity, Span};
pub use lexer::{Lexer, Tok};
pub use outline::SymbolTree;
pub use scan::{scan_file, ScanResult};
