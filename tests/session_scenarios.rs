//! End-to-end scenarios through the public API: read, define, evaluate, reset.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use minilisp::parser::Reader;
use minilisp::{Error, ParseErrorKind, Session, SessionConfig, Value};
use pretty_assertions::assert_eq;

fn numbers(values: &[i64]) -> Value {
    Value::list(values.iter().copied().map(Value::Number))
}

#[test]
fn quote_and_list_access() {
    let mut session = Session::new();

    assert_eq!(session.eval_str("(car '(10 20 30))"), Ok(Value::Number(10)));
    assert_eq!(
        session.eval_str("(car (cdr (quote (10 20 30))))"),
        Ok(Value::Number(20))
    );
    assert_eq!(session.eval_str("(cdr '(10 20 30))"), Ok(numbers(&[20, 30])));
    assert_eq!(session.eval_str("(cdr '(10))"), Ok(Value::nil()));
    assert_eq!(
        session.eval_str("'((1 2) (3))"),
        Ok(Value::list([numbers(&[1, 2]), numbers(&[3])]))
    );

    let quoted = session.eval_str("'(a (b) 3)").unwrap();
    assert_eq!(session.display(&quoted).to_string(), "(a (b) 3)");
}

#[test]
fn conditionals_short_circuit() {
    let mut session = Session::new();

    assert_eq!(session.eval_str("(if 1 42 (/ 1 0))"), Ok(Value::Number(42)));
    assert_eq!(session.eval_str("(if 0 (/ 1 0) 99)"), Ok(Value::Number(99)));
    assert_eq!(session.eval_str("(if 1 42 (undefined))"), Ok(Value::Number(42)));
    assert_eq!(
        session.eval_str("(if (= (+ 1 1) 2) 'yes 'no)").map(|v| session.display(&v).to_string()),
        Ok("yes".to_owned())
    );
}

#[test]
fn recursive_programs() {
    let mut session = Session::new();
    let program = "
        (defun factorial (n) (if (< n 2) 1 (* n (factorial (- n 1)))))
        (defun fib (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))
        (defun pow (b e) (if (= e 0) 1 (* b (pow b (- e 1)))))
    ";
    session.eval_all(program).unwrap();

    assert_eq!(session.eval_to_number("(factorial 10)"), 3_628_800);
    assert_eq!(session.eval_to_number("(fib 10)"), 55);
    assert_eq!(session.eval_to_number("(pow 2 10)"), 1024);
    assert_eq!(session.eval_to_number("(pow (fib 5) (factorial 3))"), 15_625);
    assert_eq!(session.functions().size(), 3);
}

#[test]
fn square_and_arity() {
    let mut session = Session::new();

    let name = session.eval_str("(defun square (x) (* x x))").unwrap();
    assert!(matches!(name, Value::Symbol(_)));
    assert_eq!(session.display(&name).to_string(), "square");

    assert_eq!(session.eval_str("(square 7)"), Ok(Value::Number(49)));
    assert_eq!(
        session.eval_str("(square 1 2)"),
        Err(Error::arity_error_with_expr(1, 2, "square"))
    );
}

#[test]
fn redefinition_replaces() {
    let mut session = Session::new();

    session.eval_str("(defun f (x) (+ x 1))").unwrap();
    assert_eq!(session.eval_to_number("(f 1)"), 2);
    session.eval_str("(defun f (x) (* x 100))").unwrap();
    assert_eq!(session.eval_to_number("(f 1)"), 100);
    assert_eq!(session.functions().size(), 1);
}

#[test]
fn unbound_variables() {
    let mut session = Session::new();

    assert_eq!(
        session.eval_str("x"),
        Err(Error::UnboundVariable("x".to_owned()))
    );

    let expr = session.parse("x").unwrap();
    assert_eq!(
        session.eval_pure(&expr),
        Err(Error::UnboundVariable("x".to_owned()))
    );
}

#[test]
fn error_taxonomy() {
    let mut session = Session::new();

    assert_eq!(session.eval_str("()"), Err(Error::EmptyListEval));
    assert_eq!(session.eval_str("(/ 5 0)"), Err(Error::DivideByZero));
    assert_eq!(
        session.eval_str("(nope 1)"),
        Err(Error::UnknownOperator("nope".to_owned()))
    );
    assert!(matches!(session.eval_str("(+ 1 '(2))"), Err(Error::TypeError(_))));
    assert!(matches!(session.eval_str("(car '())"), Err(Error::EvalError(_))));
    assert!(matches!(session.eval_str("(1 2 3)"), Err(Error::EvalError(_))));
    assert!(matches!(session.eval_str("(-)"), Err(Error::ArityError { .. })));

    let parse_kind = |result: Result<Value, Error>| match result {
        Err(Error::ParseError(err)) => Some(err.kind),
        _ => None,
    };
    assert_eq!(parse_kind(session.eval_str("")), Some(ParseErrorKind::Incomplete));
    assert_eq!(parse_kind(session.eval_str("(+ 1")), Some(ParseErrorKind::Incomplete));
    assert_eq!(parse_kind(session.eval_str(")")), Some(ParseErrorKind::InvalidSyntax));
    assert_eq!(
        parse_kind(minilisp::parse_exact("1 2", &mut minilisp::Interner::new())),
        Some(ParseErrorKind::TrailingContent)
    );
    assert_eq!(
        parse_kind(session.eval_str("123456789012345678901234567890")),
        Some(ParseErrorKind::ImplementationLimit)
    );
}

#[test]
fn only_the_first_form_is_evaluated() {
    let mut session = Session::new();

    assert_eq!(session.eval_to_number("(+ 1 2) junk"), 3);
    assert_eq!(session.eval_to_number("(+ 1 2))"), 3);
    assert_eq!(session.eval_str("1 2"), Ok(Value::Number(1)));

    // Later forms are never read, so they cannot define anything
    assert_eq!(session.eval_to_number("(+ 1 1) (defun two () 2)"), 2);
    assert!(session.functions().is_empty());
    assert!(session.interner().get("two").is_none());
}

#[test]
fn reader_walks_adjacent_forms() {
    let mut session = Session::new();
    let source = "(defun double (n) (* 2 n)) (double 4)\n(double (double 5))";
    let mut reader = Reader::new(source);

    let mut results = Vec::new();
    while let Some(form) = session.read_next(&mut reader) {
        let value = session.eval(&form.unwrap()).unwrap();
        results.push(session.render(&value));
    }

    assert_eq!(results, vec!["0", "8", "20"]);
    assert!(reader.is_at_end());
}

#[test]
fn echo_config_renders_symbols() {
    let mut session = Session::with_config(SessionConfig {
        echo_non_numeric: true,
    });
    let outputs: Vec<String> = session
        .eval_all("(defun id (x) x) (id 3) '(id 3)")
        .unwrap()
        .iter()
        .map(|value| session.render(value))
        .collect();

    assert_eq!(outputs, vec!["id", "3", "(id 3)"]);
}

#[test]
fn reset_starts_fresh() {
    let mut session = Session::new();
    session.eval_str("(defun f () 7)").unwrap();
    assert_eq!(session.eval_to_number("(f)"), 7);

    session.reset();
    assert!(session.functions().is_empty());
    assert_eq!(session.interner().size(), 0);
    assert_eq!(
        session.eval_str("(f)"),
        Err(Error::UnknownOperator("f".to_owned()))
    );
}
