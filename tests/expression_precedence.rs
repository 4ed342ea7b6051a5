//! Expression compiler behaviour over the preset operator tables
//!
//! Covers operator priorities, bracket nesting, variable binding and function calls,
//! evaluated through the public `Operators` API the rule parser uses.

use lsys::{EvalError, Function, IdentifierError, Operators, ParseError};
use lsys::{BinaryOperator, ExpressionCompiler};
use rstest::rstest;

fn integer_with_functions() -> Operators<i64> {
    Operators::integer()
        .with_function(Function::new("mult", |args: &[i64]| Ok(args.iter().product())).unwrap())
        .with_function(Function::new("sum", |args: &[i64]| Ok(args.iter().sum())).unwrap())
}

#[rstest]
#[case("3+9*2", 21)]
#[case("3*(2+7)", 27)]
#[case("4*((1+2)+3)", 24)]
#[case("-(2+8)-1", -11)]
#[case("10-3-2", 5)]
#[case("2*3-4*5", -14)]
#[case("64/4/2", 8)]
#[case(" 1 +  2 * 3 ", 7)]
fn test_integer_precedence(#[case] input: &str, #[case] expected: i64) {
    let compiler = Operators::integer().compiler::<&str>(&[]).unwrap();
    assert_eq!(compiler.parse(input).unwrap().evaluate(&[]), Ok(expected));
}

#[test]
fn test_quadratic_over_bound_variables() {
    let compiler = Operators::integer().compiler(&["x", "y", "z"]).unwrap();
    let expr = compiler.parse("(-y+y*y-4*x*z)/(2*x)").unwrap();
    assert_eq!(expr.evaluate(&[3, 4, 5]), Ok(-8));
}

#[rstest]
#[case("mult(3,sum(2,7))", 27)]
#[case("sum()", 0)]
#[case("sum(1,2,3,4)", 10)]
#[case("mult(sum(1,1),sum(2,2))*2", 16)]
fn test_function_calls(#[case] input: &str, #[case] expected: i64) {
    let compiler = integer_with_functions().compiler::<&str>(&[]).unwrap();
    assert_eq!(compiler.parse(input).unwrap().evaluate(&[]), Ok(expected));
}

#[rstest]
#[case("l*0.5", &[200.0], 100.0)]
#[case("sqrt(a*a+b*b)", &[3.0, 4.0], 5.0)]
#[case("-a/2", &[3.0, 0.0], -1.5)]
fn test_real_expressions(#[case] input: &str, #[case] params: &[f64], #[case] expected: f64) {
    let names: Vec<&str> = ["l", "a", "b"]
        .iter()
        .copied()
        .filter(|name| input.contains(name))
        .collect();
    let compiler = Operators::real().compiler(&names).unwrap();
    assert_eq!(compiler.parse(input).unwrap().evaluate(params), Ok(expected));
}

#[test]
fn test_duplicate_binary_operator_is_rejected() {
    let plus = || BinaryOperator::new("+", 0, |a: i64, b: i64| Ok(a + b)).unwrap();
    let result = ExpressionCompiler::new(vec![], vec![plus(), plus()], vec![], vec![]);
    assert_eq!(
        result.err(),
        Some(IdentifierError::DuplicateIdentifier {
            representation: "+".to_string()
        })
    );
}

#[rstest]
#[case("(1+2")]
#[case("1+2)")]
#[case("sum(1,2")]
fn test_unbalanced_brackets(#[case] input: &str) {
    let compiler = integer_with_functions().compiler::<&str>(&[]).unwrap();
    assert!(matches!(
        compiler.parse(input),
        Err(ParseError::UnbalancedBrackets { .. })
    ));
}

#[rstest]
#[case("x+")]
#[case("*2")]
#[case("")]
#[case("1 2")]
#[case("q+1")]
#[case("mult")]
fn test_malformed_expressions(#[case] input: &str) {
    let compiler = integer_with_functions().compiler(&["x"]).unwrap();
    assert!(compiler.parse(input).is_err(), "{input:?} should not parse");
}

#[rstest]
#[case("inf")]
#[case("nan+1")]
#[case("x*infinity")]
fn test_non_finite_spellings_are_unknown_names(#[case] input: &str) {
    let compiler = Operators::real().compiler(&["x"]).unwrap();
    assert!(matches!(
        compiler.parse(input),
        Err(ParseError::UnknownIdentifier { .. })
    ));
}

#[test]
fn test_sparse_priorities_parse() {
    let power = BinaryOperator::new("^", 1_000_000, |a: i64, b: i64| Ok(a.pow(b as u32))).unwrap();
    let compiler = Operators::integer()
        .with_binary(power)
        .compiler::<&str>(&[])
        .unwrap();
    assert_eq!(compiler.parse("1+2*3^2").unwrap().evaluate(&[]), Ok(19));
}

#[test]
fn test_division_by_zero_fails_evaluation_not_parsing() {
    let compiler = Operators::integer().compiler(&["x"]).unwrap();
    let expr = compiler.parse("1/x").unwrap();
    assert_eq!(expr.evaluate(&[0]), Err(EvalError::DivisionByZero));
}
