//! Preset operator tables
//!
//! [`Operators`] groups everything a compiler needs except the variables, which change from
//! rule to rule. Rule parsing builds one compiler per rule source, so the tables hold their
//! identifiers behind `Arc` and every compiler shares them.

use std::sync::Arc;

use super::compiler::ExpressionCompiler;
use super::identifiers::{
    BinaryOperator, Function, IdentifierError, UnaryOperator, Variable, PRIORITY_HIGH,
    PRIORITY_LOW,
};
use super::scalar::Scalar;
use super::tree::EvalError;

/// Unary operators, binary operators and functions for one scalar type
pub struct Operators<T> {
    unary: Vec<Arc<UnaryOperator<T>>>,
    binary: Vec<Arc<BinaryOperator<T>>>,
    functions: Vec<Arc<Function<T>>>,
}

impl<T> Clone for Operators<T> {
    fn clone(&self) -> Self {
        Self {
            unary: self.unary.clone(),
            binary: self.binary.clone(),
            functions: self.functions.clone(),
        }
    }
}

impl<T: Scalar> Operators<T> {
    pub fn new(
        unary: Vec<UnaryOperator<T>>,
        binary: Vec<BinaryOperator<T>>,
        functions: Vec<Function<T>>,
    ) -> Self {
        Self {
            unary: unary.into_iter().map(Arc::new).collect(),
            binary: binary.into_iter().map(Arc::new).collect(),
            functions: functions.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn with_unary(mut self, operator: UnaryOperator<T>) -> Self {
        self.unary.push(Arc::new(operator));
        self
    }

    pub fn with_binary(mut self, operator: BinaryOperator<T>) -> Self {
        self.binary.push(Arc::new(operator));
        self
    }

    pub fn with_function(mut self, function: Function<T>) -> Self {
        self.functions.push(Arc::new(function));
        self
    }

    pub fn unary(&self) -> &[Arc<UnaryOperator<T>>] {
        &self.unary
    }

    pub fn binary(&self) -> &[Arc<BinaryOperator<T>>] {
        &self.binary
    }

    pub fn functions(&self) -> &[Arc<Function<T>>] {
        &self.functions
    }

    /// Build a compiler whose variables are `variable_names` bound to indices `0..n`
    pub fn compiler<S: AsRef<str>>(
        &self,
        variable_names: &[S],
    ) -> Result<ExpressionCompiler<T>, IdentifierError> {
        ExpressionCompiler::from_shared(
            self.unary.iter().cloned(),
            self.binary.iter().cloned(),
            self.functions.iter().cloned(),
            Variable::sequence(variable_names)?,
        )
    }
}

fn overflow(operation: &'static str) -> EvalError {
    EvalError::Overflow { operation }
}

fn unary<T, F>(representation: &'static str, handler: F) -> Arc<UnaryOperator<T>>
where
    F: Fn(T) -> Result<T, EvalError> + Send + Sync + 'static,
{
    Arc::new(UnaryOperator::builtin(representation, handler))
}

fn binary<T, F>(representation: &'static str, priority: i32, handler: F) -> Arc<BinaryOperator<T>>
where
    F: Fn(T, T) -> Result<T, EvalError> + Send + Sync + 'static,
{
    Arc::new(BinaryOperator::builtin(representation, priority, handler))
}

impl Operators<i64> {
    /// `-x`, `x+y`, `x-y`, `x*y`, `x/y` with checked arithmetic
    pub fn integer() -> Self {
        Self {
            unary: vec![unary("-", |x: i64| x.checked_neg().ok_or(overflow("negation")))],
            binary: vec![
                binary("+", PRIORITY_LOW, |a: i64, b: i64| {
                    a.checked_add(b).ok_or(overflow("addition"))
                }),
                binary("-", PRIORITY_LOW, |a: i64, b: i64| {
                    a.checked_sub(b).ok_or(overflow("subtraction"))
                }),
                binary("*", PRIORITY_HIGH, |a: i64, b: i64| {
                    a.checked_mul(b).ok_or(overflow("multiplication"))
                }),
                binary("/", PRIORITY_HIGH, |a: i64, b: i64| {
                    if b == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a.checked_div(b).ok_or(overflow("division"))
                }),
            ],
            functions: Vec::new(),
        }
    }
}

impl Operators<f64> {
    /// The integer operator set over reals, plus `sqrt(x)`
    pub fn real() -> Self {
        let sqrt = Function::builtin("sqrt", |args: &[f64]| {
            args.first()
                .map(|x| x.sqrt())
                .ok_or_else(|| EvalError::Domain("sqrt needs an argument".to_string()))
        })
        .with_arity(1);

        Self {
            unary: vec![unary("-", |x: f64| Ok(-x))],
            binary: vec![
                binary("+", PRIORITY_LOW, |a: f64, b: f64| Ok(a + b)),
                binary("-", PRIORITY_LOW, |a: f64, b: f64| Ok(a - b)),
                binary("*", PRIORITY_HIGH, |a: f64, b: f64| Ok(a * b)),
                binary("/", PRIORITY_HIGH, |a: f64, b: f64| Ok(a / b)),
            ],
            functions: vec![Arc::new(sqrt)],
        }
    }
}

impl Operators<bool> {
    /// `!x`, `x||y`, `x&&y`
    pub fn boolean() -> Self {
        Self {
            unary: vec![unary("!", |x: bool| Ok(!x))],
            binary: vec![
                binary("||", PRIORITY_LOW, |a: bool, b: bool| Ok(a || b)),
                binary("&&", PRIORITY_LOW, |a: bool, b: bool| Ok(a && b)),
            ],
            functions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_division_by_zero_is_an_error() {
        let compiler = Operators::integer().compiler(&["x"]).unwrap();
        let expr = compiler.parse("10/x").unwrap();
        assert_eq!(expr.evaluate(&[2]), Ok(5));
        assert_eq!(expr.evaluate(&[0]), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let compiler = Operators::integer().compiler(&["x"]).unwrap();
        let expr = compiler.parse("x*2").unwrap();
        assert!(matches!(
            expr.evaluate(&[i64::MAX]),
            Err(EvalError::Overflow { .. })
        ));
    }

    #[test]
    fn test_real_sqrt() {
        let compiler = Operators::real().compiler(&["l"]).unwrap();
        let expr = compiler.parse("sqrt(l*4)").unwrap();
        assert_eq!(expr.evaluate(&[4.0]), Ok(4.0));
        assert!(compiler.parse("sqrt(1,2)").is_err());
    }

    #[test]
    fn test_real_fractions() {
        let compiler = Operators::real().compiler(&["l"]).unwrap();
        let expr = compiler.parse("l*0.5").unwrap();
        assert_eq!(expr.evaluate(&[200.0]), Ok(100.0));
    }

    #[test]
    fn test_boolean_operators() {
        let compiler = Operators::boolean().compiler(&["a", "b"]).unwrap();
        let expr = compiler.parse("!a||b").unwrap();
        assert_eq!(expr.evaluate(&[true, false]), Ok(false));
        assert_eq!(expr.evaluate(&[false, false]), Ok(true));
        let literal = compiler.parse("a&&TRUE").unwrap();
        assert_eq!(literal.evaluate(&[true, false]), Ok(true));
    }

    #[test]
    fn test_with_function() {
        let ops = Operators::integer().with_function(
            Function::new("max", |args: &[i64]| {
                args.iter()
                    .copied()
                    .max()
                    .ok_or_else(|| EvalError::Domain("max needs arguments".to_string()))
            })
            .unwrap(),
        );
        let compiler = ops.compiler(&["x"]).unwrap();
        assert_eq!(compiler.parse("max(x,3,7)").unwrap().evaluate(&[9]), Ok(9));
    }

    #[test]
    fn test_variable_colliding_with_function_is_rejected() {
        let result = Operators::real().compiler(&["sqrt"]);
        assert!(matches!(
            result,
            Err(IdentifierError::DuplicateIdentifier { .. })
        ));
    }

    #[test]
    fn test_compilers_share_operators() {
        let ops = Operators::integer();
        let a = ops.compiler(&["x"]).unwrap();
        let b = ops.compiler(&["y"]).unwrap();
        assert_eq!(a.parse("x+1").unwrap().evaluate(&[1]), Ok(2));
        assert_eq!(b.parse("y+1").unwrap().evaluate(&[2]), Ok(3));
        assert_eq!(Arc::strong_count(&ops.binary()[0]), 3);
    }
}
