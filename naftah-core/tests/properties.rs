//! The ten quantified invariants of §8, as manual test-case vectors rather than
//! unconstrained generators (mirrors the teacher's `property_test.rs`, which avoids
//! unconstrained QuickCheck generators to keep recursive evaluation off the stack).

use naftah_core::error::Position;
use naftah_core::numeric::DynNum;
use naftah_core::temporal::{ArabicDate, ArabicPeriod, Calendar};
use naftah_core::{ErrorKind, Value};

#[path = "support/mod.rs"]
mod support;
use support::{expect_err, run};

// 1. Numeric round-trip: every width parses back to the same textual value after
// printing, across the widths a literal can land in.
#[test]
fn property_numeric_round_trip() {
    let literals = ["0", "127", "-128", "32000", "2000000000", "9000000000000000000", "3.5", "10000.006"];
    for literal in literals {
        let n = DynNum::parse(literal, Position::UNKNOWN).unwrap();
        let printed = n.to_string();
        let reparsed = DynNum::parse(&printed, Position::UNKNOWN).unwrap();
        assert_eq!(reparsed.to_string(), printed, "round-trip failed for {literal}");
    }
}

// 2. String concatenation: length adds and the left operand is always a prefix.
#[test]
fn property_string_concatenation_length_and_prefix() {
    let pairs = [("", "x"), ("أهلاً", " وسهلاً"), ("abc", ""), ("1", "23")];
    for (a, b) in pairs {
        let program = format!(r#""{a}" + "{b}"؛"#);
        let result = run(&program).unwrap();
        let Value::String(s) = result else { panic!("expected string") };
        assert_eq!(s.chars().count(), a.chars().count() + b.chars().count());
        assert!(s.starts_with(a), "{s} does not start with {a}");
    }
}

// 3. Container iteration order: a for-in loop visits list elements in source order.
#[test]
fn property_list_iteration_preserves_order() {
    let program = r#"
        متغير قائمة := [3, 1, 4, 1, 5]؛
        متغير نص := ""؛
        لكل عنصر في قائمة {
            نص := نص + "${عنصر},"؛
        }
        نص؛
    "#;
    let result = run(program).unwrap();
    let Value::String(s) = result else { panic!("expected string") };
    assert_eq!(s.as_ref(), "3,1,4,1,5,");
}

// 4. Temporal point + amount, then - the same amount, round-trips the point exactly.
#[test]
fn property_temporal_point_amount_round_trip() {
    let cases = [
        (2024, 3, 15, ArabicPeriod { years: 1, months: 2, days: 10 }),
        (1999, 12, 31, ArabicPeriod { years: 0, months: 1, days: 1 }),
        (2000, 2, 29, ArabicPeriod { years: 4, months: 0, days: 0 }),
    ];
    for (year, month, day, period) in cases {
        let date = ArabicDate::from_ymd(Calendar::Iso, year, month, day, Position::UNKNOWN).unwrap();
        let forward = date.add_period(&period);
        let back = forward.sub_period(&period);
        assert_eq!(back.year(), date.year());
        assert_eq!(back.month(), date.month());
        assert_eq!(back.day(), date.day());
    }
}

// 5. Radix round-trip: a handful of values, re-expressed in a handful of bases,
// parse back to the same decimal value.
#[test]
fn property_radix_round_trip() {
    let vectors: &[(&str, u32, &str)] = &[
        ("1111011", 2, "123"),
        ("173", 8, "123"),
        ("7b", 16, "123"),
        ("1010", 2, "10"),
        ("ff", 16, "255"),
        ("z", 36, "35"),
    ];
    for (digits, radix, expected_decimal) in vectors {
        let program = format!("'{digits}'{radix}؛");
        let result = run(&program).unwrap();
        let Value::Number(n) = result else { panic!("expected a number") };
        assert_eq!(n.to_string(), *expected_decimal);
    }
}

// 6. Eastern-Arabic-digit parse equivalence: a number written with Eastern-Arabic
// glyphs evaluates identically to the same number written with Western digits.
#[test]
fn property_eastern_arabic_digits_parse_equivalent_to_western() {
    let pairs = [("١٢٣", "123"), ("٠", "0"), ("٩٨٧٦٥", "98765")];
    for (eastern, western) in pairs {
        let a = run(&format!("{eastern}؛")).unwrap();
        let b = run(&format!("{western}؛")).unwrap();
        let (Value::Number(na), Value::Number(nb)) = (a, b) else { panic!("expected numbers") };
        assert_eq!(na.to_string(), nb.to_string());
    }
}

// 7. Scope declare/lookup/enter-frame/leave-frame persistence: a binding declared
// before a nested block is visible and mutable inside it, and survives the block's
// frame being popped; a binding declared inside the block does not leak back out.
#[test]
fn property_scope_frame_persistence() {
    let program = r#"
        متغير خارجي := 1؛
        نطاق {
            خارجي := خارجي + 1؛
            متغير داخلي := 99؛
        }
        خارجي؛
    "#;
    let result = run(program).unwrap();
    let Value::Number(n) = result else { panic!("expected a number") };
    assert_eq!(n.to_string(), "2");

    let leak_check = expect_err(
        r#"
        نطاق {
            متغير داخلي := 99؛
        }
        داخلي؛
    "#,
    );
    assert_eq!(leak_check.kind, ErrorKind::VariableNotFound);
}

// 8. Operator/tag mismatch always reports TypeMismatch, never a different kind.
#[test]
fn property_operator_tag_mismatch_reports_type_mismatch() {
    let programs = [
        r#""نص" + @{ س := 1 }؛"#,
        r#"صحيح & 5؛"#,
        r#"@{ أ := 1 } < @{ ب := 2 }؛"#,
    ];
    for program in programs {
        let err = expect_err(program);
        assert_eq!(err.kind, ErrorKind::TypeMismatch, "program `{program}` raised {:?}", err.kind);
    }
}

// 9. A task spawned inside a `نطاق` block that fails surfaces its error through the
// owning scope once the scope is joined.
#[test]
fn property_scope_surfaces_spawned_task_errors() {
    let err = expect_err(
        r#"
        نطاق {
            ابدأ (1 / 0)؛
        }
    "#,
    );
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
}

// 10. try/ok-error branching: the ok branch runs (with the binding available) when
// the body succeeds, the error branch runs when it raises, and never both.
#[test]
fn property_try_branches_correctly() {
    let cases: &[(&str, &str)] = &[
        ("1 + 1؛", "2"),
        ("4 / 2؛", "2"),
        ("10 * 10؛", "100"),
    ];
    for (body, expected) in cases {
        let program = format!(
            r#"
            حاول {{
                {body}
            }} نجاح س {{
                س؛
            }} خطأ خ {{
                -9999؛
            }}
        "#
        );
        let result = run(&program).unwrap();
        let Value::Number(n) = result else { panic!("expected a number") };
        assert_eq!(n.to_string(), *expected);
    }

    let failing_cases = ["1 / 0؛", "5 % 0؛"];
    for body in failing_cases {
        let program = format!(
            r#"
            حاول {{
                {body}
            }} نجاح س {{
                س؛
            }} خطأ خ {{
                -9999؛
            }}
        "#
        );
        let result = run(&program).unwrap();
        let Value::Number(n) = result else { panic!("expected a number") };
        assert_eq!(n.to_string(), "-9999");
    }
}
