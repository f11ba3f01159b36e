//! Sum - 二つの f64 の加算

use super::work::Computation;
use crate::domain::{HostValue, TaskError};

/// IEEE-754 double addition of two captured operands.
///
/// NaN / Infinity はそのまま伝播する（値そのものの検証はしない）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sum {
    pub lhs: f64,
    pub rhs: f64,
}

impl Sum {
    pub fn new(lhs: f64, rhs: f64) -> Self {
        Self { lhs, rhs }
    }
}

impl Computation for Sum {
    fn compute(&mut self) -> Result<HostValue, TaskError> {
        Ok(HostValue::Number(self.lhs + self.rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2.0, 3.0, 5.0)]
    #[case(-1.5, 0.5, -1.0)]
    #[case(0.1, 0.2, 0.1 + 0.2)]
    #[case(f64::INFINITY, 1.0, f64::INFINITY)]
    #[case(f64::MAX, f64::MAX, f64::INFINITY)]
    fn adds_operands(#[case] lhs: f64, #[case] rhs: f64, #[case] expected: f64) {
        let value = Sum::new(lhs, rhs).compute().unwrap();
        assert_eq!(value, HostValue::Number(expected));
    }

    #[rstest]
    #[case(f64::NAN, 1.0)]
    #[case(1.0, f64::NAN)]
    #[case(f64::INFINITY, f64::NEG_INFINITY)]
    fn nan_propagates(#[case] lhs: f64, #[case] rhs: f64) {
        let value = Sum::new(lhs, rhs).compute().unwrap();
        assert!(value.as_number().is_some_and(f64::is_nan));
    }
}
