use go_outline::outline::{InterfaceEntry, MethodSig, TypeKind};
use go_outline::{scan_file, ScanResult};

fn scan(src: &str) -> ScanResult {
    scan_file("t.go", src)
}

fn entries(res: &ScanResult, name: &str) -> Vec<InterfaceEntry> {
    match &res.tree.find_type(name).expect("type missing").kind {
        TypeKind::Interface(entries) => entries.clone(),
        other => panic!("expected interface, got {other:?}"),
    }
}

fn method(e: &InterfaceEntry) -> &MethodSig {
    match e {
        InterfaceEntry::Method(sig) => sig,
        other => panic!("expected method, got {other:?}"),
    }
}

#[test]
fn embeds_and_methods_stay_distinct_and_ordered() {
    let res = scan(
        r#"package p

type RW interface {
	io.Closer
	Read(p []byte) (n int, err error)
	Local
}
"#,
    );
    assert!(res.diags.is_empty(), "{:#?}", res.diags);
    let es = entries(&res, "RW");
    assert_eq!(es.len(), 3, "{es:#?}");
    assert!(matches!(&es[0], InterfaceEntry::Embed { name, .. } if name == "io.Closer"));
    assert_eq!(method(&es[1]).name, "Read");
    assert!(matches!(&es[2], InterfaceEntry::Embed { name, .. } if name == "Local"));
}

#[test]
fn method_arity_named_and_unnamed_params() {
    let res = scan(
        r#"package p

type S interface {
	Seek(offset int64, whence int) (int64, error)
	ReadAt([]byte, int64) (int, error)
	Reset()
	Len() int
}
"#,
    );
    assert!(res.diags.is_empty(), "{:#?}", res.diags);
    let es = entries(&res, "S");

    let seek = method(&es[0]);
    assert_eq!(seek.params, vec!["int64", "int"]);
    assert_eq!(seek.results, vec!["int64", "error"]);

    let read_at = method(&es[1]);
    assert_eq!(read_at.params, vec!["[]byte", "int64"]);
    assert_eq!(read_at.results, vec!["int", "error"]);

    let reset = method(&es[2]);
    assert!(reset.params.is_empty());
    assert!(reset.results.is_empty());

    let len = method(&es[3]);
    assert!(len.params.is_empty());
    assert_eq!(len.results, vec!["int"]);
}

#[test]
fn shared_param_type_expands_to_each_name() {
    let res = scan("package p\n\ntype M interface {\n\tMin(a, b int) int\n}\n");
    let es = entries(&res, "M");
    assert_eq!(method(&es[0]).params, vec!["int", "int"]);
}

#[test]
fn variadic_parameter_counts_once() {
    let res = scan(
        "package p\n\ntype L interface {\n\tPrintf(format string, args ...any) (int, error)\n}\n",
    );
    let es = entries(&res, "L");
    let printf = method(&es[0]);
    assert_eq!(printf.params, vec!["string", "...any"]);
    assert_eq!(printf.results, vec!["int", "error"]);
}

#[test]
fn method_docs_attach() {
    let res = scan(
        "package p\n\ntype C interface {\n\t// Close releases the handle.\n\tClose() error\n}\n",
    );
    let es = entries(&res, "C");
    assert_eq!(
        method(&es[0]).doc.as_deref(),
        Some("Close releases the handle.")
    );
}

#[test]
fn unrecognized_entry_becomes_malformed() {
    let res = scan("package p\n\ntype U interface {\n\t~int | ~string\n\tDo()\n}\n");
    let es = entries(&res, "U");
    assert_eq!(es.len(), 2, "{es:#?}");
    assert!(matches!(&es[0], InterfaceEntry::Malformed { .. }));
    assert_eq!(method(&es[1]).name, "Do");
    assert_eq!(res.diags.len(), 1, "{:#?}", res.diags);
}

#[test]
fn empty_interface() {
    let res = scan("package p\n\ntype Any interface{}\n");
    assert!(entries(&res, "Any").is_empty());
    assert!(res.diags.is_empty());
}
