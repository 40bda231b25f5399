//! Cross-module scenario tests (S1-S6): whole programs run end to end through the
//! lexer, parser and evaluator, checked against literal expected outputs.

use naftah_core::{ErrorKind, Value};

#[path = "support/mod.rs"]
mod support;
use support::{as_number_string, expect_err, run};

// S1: recursive factorial, exercising the numeric tower's eager-widen-on-overflow
// promotion (Int -> Long -> BigInt) across three call depths.
#[test]
fn s1_factorial_widens_through_the_numeric_tower() {
    let program = |n: i64| {
        format!(
            "دالة مضروب(ن = 10) {{
                إذا ن <= 1 فإن {{
                    أرجع 1؛
                }}
                أرجع ن * مضروب(ن - 1)؛
            }}
            مضروب({n})؛"
        )
    };

    let five = run(&program(5)).expect("factorial(5) should evaluate");
    assert_eq!(as_number_string(&five), "120");

    let twenty = run(&program(20)).expect("factorial(20) should evaluate");
    assert_eq!(as_number_string(&twenty), "2432902008176640000");

    let thirty = run(&program(30)).expect("factorial(30) should evaluate");
    assert_eq!(as_number_string(&thirty), "265252859812191058636308480000000");
}

// S2: qualified/optional-chain object access.
#[test]
fn s2_optional_chaining_short_circuits_through_none() {
    let decl = r#"
        متغير مدينة := @{
            الاسم := "قرطبة",
            البلدة := @{ الاسم := "الزهراء", المنازل := 400 }
        }؛
    "#;

    let found = run(&format!("{decl} مدينة[\"البلدة\"][\"المنازل\"]؛")).unwrap();
    assert_eq!(as_number_string(&found), "400");

    let missing = run(&format!("{decl} مدينة?[\"غائب\"]?[\"المنازل\"]؛")).unwrap();
    assert!(matches!(missing, Value::None));

    let err = expect_err(&format!("{decl} مدينة?[\"غائب\"][\"المنازل\"]؛"));
    assert_eq!(err.kind, ErrorKind::VariableNotFound);
}

// S3: list / set indexing, including the out-of-bounds error path.
#[test]
fn s3_collection_indexing() {
    let list_decl = "متغير قائمة := [85, 90, 78, 92]؛";

    let first = run(&format!("{list_decl} قائمة[0]؛")).unwrap();
    assert_eq!(as_number_string(&first), "85");

    let err = expect_err(&format!("{list_decl} قائمة[4]؛"));
    assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);

    let set_decl = "متغير طقم := #{1, 2, 3, 4}؛";
    let third = run(&format!("{set_decl} طقم[2]؛")).unwrap();
    assert_eq!(as_number_string(&third), "3");
}

// S4: labeled break/continue across triply-nested loops.
#[test]
fn s4_labeled_break_exits_every_nested_loop() {
    let program = r#"
        متغير مجموع := 0؛
        خارجي: لكل أ := 1 إلى 3 نفذ {
            وسطى: لكل ب := 1 إلى 3 نفذ {
                داخلي: لكل ج := 1 إلى 3 نفذ {
                    إذا ج == 3 فإن {
                        اكسر خارجي؛
                    }
                    مجموع := مجموع + 1؛
                }
            }
        }
        مجموع؛
    "#;
    // (1,1,1) and (1,1,2) each add one before (1,1,3) breaks every enclosing loop.
    let result = run(program).unwrap();
    assert_eq!(as_number_string(&result), "2");
}

#[test]
fn s4_labeled_continue_skips_only_the_labeled_loops_iteration() {
    let program = r#"
        متغير العداد := 0؛
        لكل أ := 1 إلى 2 نفذ {
            لكل ب := 1 إلى 2 نفذ {
                داخلي: لكل ج := 1 إلى 3 نفذ {
                    إذا ج == 2 فإن {
                        استمر داخلي؛
                    }
                    العداد := العداد + 1؛
                }
            }
        }
        العداد؛
    "#;
    // 2x2 outer combinations, each counting c=1 and c=3 but skipping c=2.
    let result = run(program).unwrap();
    assert_eq!(as_number_string(&result), "8");
}

// S5: try/ok with a transforming ok-branch, and try/error catching a raised error.
#[test]
fn s5_try_catches_division_by_zero() {
    let program = r#"
        حاول {
            10 / 0؛
        } خطأ خ {
            -1؛
        }
    "#;
    let result = run(program).unwrap();
    assert_eq!(as_number_string(&result), "-1");
}

#[test]
fn s5_try_ok_branch_transforms_the_result() {
    let program = r#"
        حاول {
            1 + 2؛
        } نجاح س {
            س + 1؛
        } خطأ خ {
            -1؛
        }
    "#;
    let result = run(program).unwrap();
    assert_eq!(as_number_string(&result), "4");
}

// S6: string interpolation, covering bound/unbound names, explicit defaults and
// the Arabic decimal separator used by numeric formatting.
#[test]
fn s6_interpolation_substitutes_a_bound_name() {
    let result = run(r#"متغير الاسم := "علي"؛ "مرحباً ${الاسم}"؛"#).unwrap();
    assert!(matches!(&result, Value::String(s) if s.as_ref() == "مرحباً علي"));
}

#[test]
fn s6_interpolation_of_unbound_name_yields_the_empty_marker() {
    let result = run(r#""مرحباً ${الاسم}"؛"#).unwrap();
    assert!(matches!(&result, Value::String(s) if s.as_ref() == "مرحباً <فارغ>"));
}

#[test]
fn s6_interpolation_formats_decimals_with_the_arabic_separator() {
    let result = run(r#"متغير العدد := 10000.006؛ "${العدد}"؛"#).unwrap();
    assert!(matches!(&result, Value::String(s) if s.as_ref() == "10000٫006"));
}
