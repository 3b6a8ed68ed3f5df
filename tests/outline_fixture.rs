//! End-to-end scan of a representative source file: every import binding
//! form, struct embedding with and without pointers, blank fields, and an
//! interface mixing embeds with method signatures.

use go_outline::outline::{FieldEntry, ImportBinding, InterfaceEntry, TypeKind};
use go_outline::{scan_file, ScanResult};

const FIXTURE: &str = r#"package c

import (
	"a"
	z "b"
	. "d"
	_ "x"
)

type C1 struct {
	x, y int
	_    float32
}

type C2 struct {
	C1
	a.A1
	z.B1
	x, y int
	_    float32
	F    func()
	*a.A2
}

type c3 interface {
	a.A2
	Read([]byte) (int, error)
	Write([]byte) (int, error)
	Close() error
	z.B3
	D1
}
"#;

fn scan_fixture() -> ScanResult {
    scan_file("c.go", FIXTURE)
}

fn struct_fields<'t>(res: &'t ScanResult, name: &str) -> &'t [FieldEntry] {
    let decl = res
        .tree
        .find_type(name)
        .unwrap_or_else(|| panic!("type {name} missing from tree: {:#?}", res.tree));
    match &decl.kind {
        TypeKind::Struct(fields) => fields,
        other => panic!("expected {name} to be a struct, got {other:?}"),
    }
}

fn assert_named(f: &FieldEntry, name: &str, ty: &str) {
    match f {
        FieldEntry::Named { name: n, ty: t, .. } => {
            assert_eq!((n.as_str(), t.as_str()), (name, ty));
        }
        other => panic!("expected Named {name} {ty}, got {other:?}"),
    }
}

fn assert_embedded(f: &FieldEntry, ty: &str, pointer: bool) {
    match f {
        FieldEntry::Embedded {
            ty: t, pointer: p, ..
        } => {
            assert_eq!((t.as_str(), *p), (ty, pointer));
        }
        other => panic!("expected Embedded {ty} (pointer={pointer}), got {other:?}"),
    }
}

fn assert_blank(f: &FieldEntry, ty: &str) {
    match f {
        FieldEntry::Blank { ty: t, .. } => assert_eq!(t, ty),
        other => panic!("expected Blank {ty}, got {other:?}"),
    }
}

#[test]
fn fixture_scans_clean() {
    let res = scan_fixture();
    assert!(res.diags.is_empty(), "unexpected diags: {:#?}", res.diags);
    assert_eq!(res.tree.package.as_deref(), Some("c"));
    assert_eq!(res.tree.decls.len(), 3);
}

#[test]
fn fixture_import_bindings() {
    let res = scan_fixture();
    let got: Vec<(&str, &ImportBinding)> = res
        .tree
        .imports
        .iter()
        .map(|i| (i.path.as_str(), &i.binding))
        .collect();
    assert_eq!(
        got,
        vec![
            ("a", &ImportBinding::Default),
            ("b", &ImportBinding::Alias("z".to_string())),
            ("d", &ImportBinding::Dot),
            ("x", &ImportBinding::Blank),
        ]
    );
    // Only the default and aliased imports expose a name in file scope.
    assert_eq!(res.tree.named_imports().count(), 2);
}

#[test]
fn fixture_struct_c1() {
    let res = scan_fixture();
    let fields = struct_fields(&res, "C1");
    assert_eq!(fields.len(), 3, "{fields:#?}");
    assert_named(&fields[0], "x", "int");
    assert_named(&fields[1], "y", "int");
    assert_blank(&fields[2], "float32");
}

#[test]
fn fixture_struct_c2() {
    let res = scan_fixture();
    let fields = struct_fields(&res, "C2");
    assert_eq!(fields.len(), 8, "{fields:#?}");
    assert_embedded(&fields[0], "C1", false);
    assert_embedded(&fields[1], "a.A1", false);
    assert_embedded(&fields[2], "z.B1", false);
    assert_named(&fields[3], "x", "int");
    assert_named(&fields[4], "y", "int");
    assert_blank(&fields[5], "float32");
    assert_named(&fields[6], "F", "func()");
    assert_embedded(&fields[7], "a.A2", true);
}

#[test]
fn fixture_interface_c3() {
    let res = scan_fixture();
    let decl = res.tree.find_type("c3").expect("c3 missing");
    let entries = match &decl.kind {
        TypeKind::Interface(entries) => entries,
        other => panic!("expected interface, got {other:?}"),
    };
    assert_eq!(entries.len(), 6, "{entries:#?}");

    let expect_embed = |e: &InterfaceEntry, want: &str| match e {
        InterfaceEntry::Embed { name, .. } => assert_eq!(name, want),
        other => panic!("expected Embed {want}, got {other:?}"),
    };
    let expect_method = |e: &InterfaceEntry, want: &str, params: usize, results: usize| match e {
        InterfaceEntry::Method(sig) => {
            assert_eq!(sig.name, want);
            assert_eq!(
                (sig.params.len(), sig.results.len()),
                (params, results),
                "arity of {want}: {sig:#?}"
            );
        }
        other => panic!("expected Method {want}, got {other:?}"),
    };

    expect_embed(&entries[0], "a.A2");
    expect_method(&entries[1], "Read", 1, 2);
    expect_method(&entries[2], "Write", 1, 2);
    expect_method(&entries[3], "Close", 0, 1);
    expect_embed(&entries[4], "z.B3");
    expect_embed(&entries[5], "D1");
}

#[test]
fn fixture_method_signature_texts() {
    let res = scan_fixture();
    let decl = res.tree.find_type("c3").expect("c3 missing");
    let TypeKind::Interface(entries) = &decl.kind else {
        panic!("expected interface");
    };
    let InterfaceEntry::Method(read) = &entries[1] else {
        panic!("expected Read method");
    };
    assert_eq!(read.params, vec!["[]byte"]);
    assert_eq!(read.results, vec!["int", "error"]);
}

#[test]
fn fixture_scan_is_idempotent() {
    let first = scan_fixture();
    let second = scan_fixture();
    assert_eq!(first, second);
}

#[test]
fn fixture_decl_at_cursor_offsets() {
    let res = scan_fixture();
    let c2_body = FIXTURE.find("a.A1").expect("fixture text") as u32;
    let between = FIXTURE.find("\n\ntype C2").expect("fixture text") as u32 + 1;

    assert_eq!(res.tree.decl_at(c2_body).map(|d| d.name()), Some("C2"));
    assert_eq!(res.tree.decl_at(between), None);
}
