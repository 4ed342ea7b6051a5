//! Modules and module factories

use serde::Serialize;

use crate::expression::{EvalError, Expression, Scalar};

/// Interned module name, see [`ModuleNames`](crate::grammar::ModuleNames)
pub type ModuleId = usize;

/// One symbol of a generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module<T> {
    pub id: ModuleId,
    pub parameters: Vec<T>,
}

impl<T> Module<T> {
    pub fn new(id: ModuleId, parameters: Vec<T>) -> Self {
        Self { id, parameters }
    }

    /// Module without parameters
    pub fn bare(id: ModuleId) -> Self {
        Self::new(id, Vec::new())
    }
}

/// Builds a module from the parameters of the module being rewritten
#[derive(Debug, Clone)]
pub struct ModuleFactory<T> {
    target_id: ModuleId,
    expressions: Vec<Expression<T>>,
}

impl<T: Scalar> ModuleFactory<T> {
    pub fn new(target_id: ModuleId, expressions: Vec<Expression<T>>) -> Self {
        Self {
            target_id,
            expressions,
        }
    }

    pub fn target_id(&self) -> ModuleId {
        self.target_id
    }

    pub fn expressions(&self) -> &[Expression<T>] {
        &self.expressions
    }

    pub fn create(&self, parameters: &[T]) -> Result<Module<T>, EvalError> {
        let values = self
            .expressions
            .iter()
            .map(|expr| expr.evaluate(parameters))
            .collect::<Result<Vec<T>, EvalError>>()?;
        Ok(Module::new(self.target_id, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Operators;

    #[test]
    fn test_factory_evaluates_in_order() {
        let compiler = Operators::integer().compiler(&["x", "y"]).unwrap();
        let factory = ModuleFactory::new(
            4,
            vec![
                compiler.parse("y").unwrap(),
                compiler.parse("x+y").unwrap(),
            ],
        );
        assert_eq!(factory.create(&[1, 2]), Ok(Module::new(4, vec![2, 3])));
    }

    #[test]
    fn test_factory_without_expressions() {
        let factory = ModuleFactory::<i64>::new(1, Vec::new());
        assert_eq!(factory.create(&[9]), Ok(Module::bare(1)));
    }

    #[test]
    fn test_modules_compare_element_wise() {
        assert_eq!(Module::new(1, vec![0.5]), Module::new(1, vec![0.5]));
        assert_ne!(Module::new(1, vec![0.5]), Module::new(2, vec![0.5]));
        assert_ne!(Module::new(1, vec![0.5]), Module::new(1, vec![0.5, 1.0]));
    }
}
