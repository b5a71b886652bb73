pub mod expression;
pub mod objective;

pub use expression::{Expr, Formula, DEFAULT_FORMULA};
pub use objective::{FnObjective, Objective};
