//! Operator execution helpers

mod comparison;
mod pattern;

pub(super) use comparison::{execute_compare, infer_type};
