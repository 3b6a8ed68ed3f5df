use go_outline::{scan_file, Lexer, Tok};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]
    #[test]
    fn lexer_never_panics_and_progresses(s in ".*") {
        let lx = Lexer::new(&s);

        // Max progress we have seen in the stream (end positions).
        let mut max_end = 0usize;

        // End position of the last *real* (non-injected) token.
        let mut last_real_end = 0usize;

        let max_steps = s.len().saturating_mul(4) + 64;

        for (steps, (start, tok, end)) in lx.enumerate() {
            // 1) spans must be in-bounds
            prop_assert!(start <= end, "start>end: ({start},{end}) tok={tok:?} input={s:?}");
            prop_assert!(end <= s.len(), "end out of bounds: ({start},{end}) len={} tok={tok:?} input={s:?}", s.len());

            let injected_semi = matches!(tok, Tok::Semi) && start == end;

            // 2) Real tokens must be monotonic (cannot overlap backwards)
            if !injected_semi {
                prop_assert!(
                    start >= last_real_end,
                    "real token moved backwards: start={start} < last_real_end={last_real_end} tok={tok:?} span=({start},{end}) input={s:?}"
                );
                last_real_end = end;
                // Real tokens shouldn't regress the global end.
                prop_assert!(
                    end >= max_end,
                    "real token end regressed: end={end} < max_end={max_end} tok={tok:?} input={s:?}"
                );
            } else {
                // 3) Injected semis must not appear before the already-consumed frontier.
                prop_assert!(
                    start >= max_end,
                    "injected semi before progress: pos={start} < max_end={max_end} input={s:?}"
                );
            }

            // 4) Update global progress
            max_end = max_end.max(end);

            // 5) Anti-hang guard
            prop_assert!(
                steps <= max_steps,
                "too many steps (possible hang): steps={steps} max_steps={max_steps} len={} input={s:?}",
                s.len()
            );
        }
    }

    #[test]
    fn lexer_diags_carry_in_bounds_spans(s in ".*") {
        let mut lx = Lexer::new(&s);
        lx.by_ref().count();
        for d in lx.take_diags() {
            prop_assert!(d.span.start <= d.span.end, "{d:?} input={s:?}");
            prop_assert!(d.span.end as usize <= s.len(), "{d:?} input={s:?}");
        }
    }

    #[test]
    fn scan_never_panics_and_is_idempotent(s in ".*") {
        let first = scan_file("fuzz.go", &s);
        let second = scan_file("fuzz.go", &s);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn scan_diags_are_ordered_and_in_bounds(s in ".*") {
        let res = scan_file("fuzz.go", &s);
        let mut prev = (0u32, 0u32);
        for d in &res.diags {
            prop_assert!(d.span.start <= d.span.end, "{d:?} input={s:?}");
            prop_assert!(d.span.end as usize <= s.len(), "{d:?} input={s:?}");
            let key = (d.span.start, d.span.end);
            prop_assert!(prev <= key, "diags out of order: {:#?} input={s:?}", res.diags);
            prev = key;
        }
    }

    // Well-formed inputs built from declaration fragments scan without
    // diagnostics regardless of how the fragments are combined.
    #[test]
    fn clean_fragments_scan_clean(
        // `q`/`w` prefixes keep the generated identifiers clear of keywords.
        name in "q[a-z0-9]{0,6}",
        field in "w[a-z0-9]{0,6}",
        ty in prop::sample::select(vec!["int", "string", "[]byte", "*Buffer", "map[string]int"]),
    ) {
        let src = format!(
            "package p\n\ntype {name} struct {{\n\t{field} {ty}\n}}\n\nfunc {name}x() {ty} {{ return x }}\n"
        );
        let res = scan_file("gen.go", &src);
        prop_assert!(res.diags.is_empty(), "{:#?} src={src:?}", res.diags);
        prop_assert!(res.tree.find_type(&name).is_some(), "src={src:?}");
    }
}
