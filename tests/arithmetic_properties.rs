//! Property-based tests for arithmetic and list operators.
//!
//! Every expression is built as text, read back through the parser, and evaluated
//! by both evaluators; results are compared against native `i64` arithmetic.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use minilisp::{Environment, FunctionStore, Interner, Value, eval, eval_pure, parse};
use proptest::prelude::*;

/// Evaluate `source` with both evaluators and require they agree
fn eval_both(source: &str) -> Result<Value, minilisp::Error> {
    let mut interner = Interner::new();
    let expr = parse(source, &mut interner).unwrap();

    let pure = eval_pure(&expr, &interner);

    let mut functions = FunctionStore::new();
    let mut env = Environment::new(&mut functions, &interner);
    let full = eval(&expr, &mut env);

    assert_eq!(pure, full, "evaluators disagree on {source}");
    full
}

fn small() -> impl Strategy<Value = i64> {
    -100_000i64..100_000
}

fn non_zero() -> impl Strategy<Value = i64> {
    small().prop_filter("divisor must be non-zero", |b| *b != 0)
}

fn quoted_list(items: &[i64]) -> String {
    let body: Vec<String> = items.iter().map(i64::to_string).collect();
    format!("'({})", body.join(" "))
}

proptest! {
    #[test]
    fn addition_matches_native(a in small(), b in small()) {
        prop_assert_eq!(eval_both(&format!("(+ {a} {b})")), Ok(Value::Number(a + b)));
    }

    #[test]
    fn subtraction_matches_native(a in small(), b in small()) {
        prop_assert_eq!(eval_both(&format!("(- {a} {b})")), Ok(Value::Number(a - b)));
    }

    #[test]
    fn multiplication_matches_native(a in small(), b in small()) {
        prop_assert_eq!(eval_both(&format!("(* {a} {b})")), Ok(Value::Number(a * b)));
    }

    #[test]
    fn division_truncates_toward_zero(a in small(), b in non_zero()) {
        prop_assert_eq!(eval_both(&format!("(/ {a} {b})")), Ok(Value::Number(a / b)));
    }

    #[test]
    fn division_by_zero_fails(a in small()) {
        prop_assert_eq!(eval_both(&format!("(/ {a} 0)")), Err(minilisp::Error::DivideByZero));
    }

    #[test]
    fn variadic_sum_folds_left(items in prop::collection::vec(small(), 0..10)) {
        let args: Vec<String> = items.iter().map(i64::to_string).collect();
        let expected: i64 = items.iter().sum();
        prop_assert_eq!(
            eval_both(&format!("(+ {})", args.join(" "))),
            Ok(Value::Number(expected))
        );
    }

    #[test]
    fn only_the_final_result_must_fit(
        first in any::<i64>(),
        rest in prop::collection::vec(any::<i64>(), 1..5),
    ) {
        let args: Vec<String> = rest.iter().map(i64::to_string).collect();
        let args = args.join(" ");
        let rest_sum: i128 = rest.iter().copied().map(i128::from).sum();

        let exact_sum = i128::from(first) + rest_sum;
        let exact_difference = i128::from(first) - rest_sum;
        for (op, exact) in [("+", exact_sum), ("-", exact_difference)] {
            let result = eval_both(&format!("({op} {first} {args})"));
            match i64::try_from(exact) {
                Ok(n) => {
                    prop_assert_eq!(result, Ok(Value::Number(n)));
                }
                Err(_) => {
                    let overflowed = matches!(
                        result,
                        Err(minilisp::Error::EvalError(ref msg)) if msg.contains("overflow")
                    );
                    prop_assert!(overflowed, "({} {} {}): {:?}", op, first, args, result);
                }
            }
        }
    }

    #[test]
    fn car_and_cdr_laws(items in prop::collection::vec(small(), 1..10)) {
        let list = quoted_list(&items);

        prop_assert_eq!(eval_both(&format!("(car {list})")), Ok(Value::Number(items[0])));

        let rest = Value::list(items[1..].iter().copied().map(Value::Number));
        prop_assert_eq!(eval_both(&format!("(cdr {list})")), Ok(rest));
    }

    #[test]
    fn comparisons_yield_one_or_zero(a in small(), b in small()) {
        let mut interner = Interner::new();
        let mut functions = FunctionStore::new();

        let cases = [
            ("<", a < b),
            (">", a > b),
            ("=", a == b),
            ("<=", a <= b),
            (">=", a >= b),
        ];
        for (op, expected) in cases {
            let expr = parse(&format!("({op} {a} {b})"), &mut interner).unwrap();
            let mut env = Environment::new(&mut functions, &interner);
            prop_assert_eq!(eval(&expr, &mut env), Ok(Value::Number(i64::from(expected))));
        }
    }

    #[test]
    fn printed_forms_read_back(
        items in prop::collection::vec(
            prop_oneof![
                small().prop_map(|n| n.to_string()),
                prop::string::string_regex("[a-z][a-z0-9?-]{0,6}").expect("valid regex"),
            ],
            0..8,
        )
    ) {
        let source = format!("(f ({}) '{})", items.join(" "), items.first().map_or("x", String::as_str));
        let mut interner = Interner::new();
        let value = parse(&source, &mut interner).unwrap();
        let printed = value.display(&interner).to_string();
        let reread = parse(&printed, &mut interner).unwrap();
        prop_assert_eq!(reread, value);
    }
}

#[test]
fn overflow_is_reported_not_wrapped() {
    let max = i64::MAX;
    let min = i64::MIN;
    for source in [
        format!("(+ {max} 1)"),
        format!("(- {min} 1)"),
        format!("(* {max} 2)"),
        format!("(- {min})"),
        format!("(/ {min} -1)"),
    ] {
        let result = eval_both(&source);
        assert!(
            matches!(result, Err(minilisp::Error::EvalError(ref msg)) if msg.contains("overflow")),
            "{source}: {result:?}"
        );
    }
}
