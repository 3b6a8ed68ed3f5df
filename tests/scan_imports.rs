use go_outline::outline::ImportBinding;
use go_outline::scan_file;

#[test]
fn single_import_forms() {
    let cases = vec![
        (r#"import "a""#, ImportBinding::Default, "a"),
        (r#"import z "b""#, ImportBinding::Alias("z".to_string()), "b"),
        (r#"import . "d""#, ImportBinding::Dot, "d"),
        (r#"import _ "x""#, ImportBinding::Blank, "x"),
    ];
    for (line, binding, path) in cases {
        let src = format!("package p\n\n{line}\n");
        let res = scan_file("t.go", &src);
        assert!(res.diags.is_empty(), "{line}: {:#?}", res.diags);
        assert_eq!(res.tree.imports.len(), 1, "{line}");
        assert_eq!(res.tree.imports[0].binding, binding, "{line}");
        assert_eq!(res.tree.imports[0].path, path, "{line}");
    }
}

#[test]
fn grouped_imports_keep_source_order() {
    let res = scan_file(
        "t.go",
        r#"package p

import (
	"net/http"
	enc "encoding/json"
	_ "embed"
)
"#,
    );
    assert!(res.diags.is_empty(), "{:#?}", res.diags);
    let paths: Vec<&str> = res.tree.imports.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["net/http", "encoding/json", "embed"]);
    assert_eq!(
        res.tree.imports[1].binding,
        ImportBinding::Alias("enc".to_string())
    );
}

#[test]
fn raw_string_import_path() {
    let res = scan_file("t.go", "package p\n\nimport `a/b`\n");
    assert!(res.diags.is_empty(), "{:#?}", res.diags);
    assert_eq!(res.tree.imports[0].path, "a/b");
}

#[test]
fn empty_import_group() {
    let res = scan_file("t.go", "package p\n\nimport ()\n");
    assert!(res.diags.is_empty(), "{:#?}", res.diags);
    assert!(res.tree.imports.is_empty());
}

#[test]
fn malformed_import_is_diagnosed_and_skipped() {
    let res = scan_file(
        "t.go",
        r#"package p

import (
	42
	"fmt"
)

type T struct{}
"#,
    );
    // The bad line produces exactly one diagnostic; the good line and the
    // following declaration still land in the tree.
    assert_eq!(res.diags.len(), 1, "{:#?}", res.diags);
    assert!(res.diags[0].message.contains("import"), "{:#?}", res.diags);
    let paths: Vec<&str> = res.tree.imports.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["fmt"]);
    assert!(res.tree.find_type("T").is_some());
}

#[test]
fn import_spans_cover_their_lines() {
    let src = "package p\n\nimport (\n\tz \"b\"\n)\n";
    let res = scan_file("t.go", src);
    let spec = &res.tree.imports[0];
    let start = src.find("z \"b\"").expect("import line") as u32;
    assert_eq!(spec.span.start, start);
    assert_eq!(spec.span.end, start + "z \"b\"".len() as u32);
}
