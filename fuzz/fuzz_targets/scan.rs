#![no_main]

use go_outline::scan_file;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let first = scan_file("fuzz.go", &s);
    let second = scan_file("fuzz.go", &s);

    // Same buffer, same result: no hidden state between scans.
    assert_eq!(first, second);

    // Diagnostic spans stay inside the buffer and ordered.
    let mut prev = (0u32, 0u32);
    for d in &first.diags {
        assert!(d.span.start <= d.span.end);
        assert!(d.span.end as usize <= s.len());
        let key = (d.span.start, d.span.end);
        assert!(prev <= key);
        prev = key;
    }

    // Declaration spans stay inside the buffer too.
    for decl in &first.tree.decls {
        assert!(decl.span().end as usize <= s.len());
    }
});
