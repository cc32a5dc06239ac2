use super::{Algo, AlgoContext};
use crate::domain::rounding::round;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Less,
    Equal,
}

/// Compares the values of two algos after running both.
///
/// If either operand returns false the comparison is false; values are
/// compared at 4 decimal places.
#[derive(Debug)]
pub struct Compare {
    comparison: Comparison,
    left: Box<dyn Algo>,
    right: Box<dyn Algo>,
}

impl Compare {
    pub fn new(
        comparison: Comparison,
        left: impl Algo + 'static,
        right: impl Algo + 'static,
    ) -> Self {
        Self {
            comparison,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn greater(left: impl Algo + 'static, right: impl Algo + 'static) -> Self {
        Self::new(Comparison::Greater, left, right)
    }

    pub fn less(left: impl Algo + 'static, right: impl Algo + 'static) -> Self {
        Self::new(Comparison::Less, left, right)
    }

    pub fn equal(left: impl Algo + 'static, right: impl Algo + 'static) -> Self {
        Self::new(Comparison::Equal, left, right)
    }
}

impl Algo for Compare {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        let left_ok = self.left.run(ctx)?;
        let right_ok = self.right.run(ctx)?;
        if !(left_ok && right_ok) {
            return Ok(false);
        }
        let (a, b) = (round(self.left.value()), round(self.right.value()));
        Ok(match self.comparison {
            Comparison::Greater => a > b,
            Comparison::Less => a < b,
            Comparison::Equal => a == b,
        })
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn name(&self) -> &str {
        match self.comparison {
            Comparison::Greater => "greater",
            Comparison::Less => "less",
            Comparison::Equal => "equal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::test_support::*;
    use crate::algo::{Constant, Fixed, LatestPrice, Sma};

    fn eval(algo: &mut dyn Algo, close: f64) -> bool {
        let event = bar_at(day(2024, 1, 2), "SPY", close);
        let data = observed(&[event.clone()]);
        run_once(algo, &event, &data).0.unwrap()
    }

    #[test]
    fn compares_values() {
        assert!(eval(&mut Compare::greater(Fixed(2.0), Fixed(1.0)), 1.0));
        assert!(!eval(&mut Compare::greater(Fixed(1.0), Fixed(1.0)), 1.0));
        assert!(eval(&mut Compare::less(Fixed(1.0), Fixed(2.0)), 1.0));
        assert!(eval(&mut Compare::equal(Fixed(1.00001), Fixed(1.0)), 1.0));
    }

    #[test]
    fn price_against_threshold() {
        assert!(eval(&mut Compare::greater(LatestPrice::new(), Fixed(100.0)), 101.0));
        assert!(!eval(&mut Compare::greater(LatestPrice::new(), Fixed(100.0)), 99.0));
    }

    #[test]
    fn failing_operand_is_false() {
        assert!(!eval(&mut Compare::equal(Constant::FALSE, Constant::FALSE), 1.0));
    }

    #[test]
    fn operand_errors_propagate() {
        let event = bar_at(day(2024, 1, 2), "SPY", 1.0);
        let data = observed(&[event.clone()]);
        let mut cmp = Compare::greater(LatestPrice::new(), Sma::new(3));
        assert!(run_once(&mut cmp, &event, &data).0.is_err());
    }
}
