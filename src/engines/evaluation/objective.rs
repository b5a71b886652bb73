use super::expression::Formula;
use crate::error::EvaluationError;

/// The function being optimized, injected into the engine at construction.
///
/// Implementations must be pure: the same `x` always yields the same result.
pub trait Objective {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError>;

    fn describe(&self) -> String {
        "custom objective".to_string()
    }
}

impl<T: Objective + ?Sized> Objective for Box<T> {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        (**self).evaluate(x)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl Objective for Formula {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        finite(x, self.as_expr().eval(x)?)
    }

    fn describe(&self) -> String {
        self.source().to_string()
    }
}

/// Adapts a plain closure into an [`Objective`]
pub struct FnObjective<F> {
    name: String,
    function: F,
}

impl<F: Fn(f64) -> f64> FnObjective<F> {
    pub fn new(name: impl Into<String>, function: F) -> Self {
        Self { name: name.into(), function }
    }
}

impl<F: Fn(f64) -> f64> Objective for FnObjective<F> {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        finite(x, (self.function)(x))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

fn finite(x: f64, value: f64) -> Result<f64, EvaluationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFinite { x, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_objective_rejects_non_finite() {
        let objective = FnObjective::new("reciprocal", |x: f64| 1.0 / x);
        assert_eq!(objective.evaluate(2.0), Ok(0.5));
        assert!(matches!(
            objective.evaluate(0.0),
            Err(EvaluationError::NonFinite { .. })
        ));
        assert_eq!(objective.describe(), "reciprocal");
    }

    #[test]
    fn test_formula_objective_overflow_is_non_finite() {
        let formula = Formula::parse("exp(x)").unwrap();
        assert!(formula.evaluate(1.0).is_ok());
        assert!(matches!(
            formula.evaluate(1000.0),
            Err(EvaluationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_boxed_objective_delegates() {
        let boxed: Box<dyn Objective> = Box::new(Formula::default_objective());
        assert_eq!(boxed.evaluate(0.0), Ok(0.0));
        assert!(boxed.describe().contains("sin(x)"));
    }
}
