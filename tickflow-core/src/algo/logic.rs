//! Boolean combinators.
//!
//! `And`, `Or` and `Xor` always evaluate both operands so that side-effecting
//! operands (indicators recording metrics, schedules tracking dates) run on
//! every event.

use super::{Algo, AlgoContext};
use crate::error::Result;

macro_rules! binary_combinator {
    ($name:ident, $label:literal, $op:expr) => {
        #[derive(Debug)]
        pub struct $name {
            left: Box<dyn Algo>,
            right: Box<dyn Algo>,
        }

        impl $name {
            pub fn new(left: impl Algo + 'static, right: impl Algo + 'static) -> Self {
                Self {
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        }

        impl Algo for $name {
            fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
                let left = self.left.run(ctx)?;
                let right = self.right.run(ctx)?;
                let op: fn(bool, bool) -> bool = $op;
                Ok(op(left, right))
            }

            fn reset(&mut self) {
                self.left.reset();
                self.right.reset();
            }

            fn name(&self) -> &str {
                $label
            }
        }
    };
}

binary_combinator!(And, "and", |a, b| a && b);
binary_combinator!(Or, "or", |a, b| a || b);
binary_combinator!(Xor, "xor", |a, b| a ^ b);

/// Negation.
#[derive(Debug)]
pub struct Not {
    inner: Box<dyn Algo>,
}

impl Not {
    pub fn new(inner: impl Algo + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Algo for Not {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        Ok(!self.inner.run(ctx)?)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn name(&self) -> &str {
        "not"
    }
}

/// Runs `action` when `condition` holds. Always reports success, so it never
/// halts an enclosing stack; errors from either side still propagate.
#[derive(Debug)]
pub struct If {
    condition: Box<dyn Algo>,
    action: Box<dyn Algo>,
}

impl If {
    pub fn new(condition: impl Algo + 'static, action: impl Algo + 'static) -> Self {
        Self {
            condition: Box::new(condition),
            action: Box::new(action),
        }
    }
}

impl Algo for If {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        if self.condition.run(ctx)? {
            self.action.run(ctx)?;
        }
        Ok(true)
    }

    fn reset(&mut self) {
        self.condition.reset();
        self.action.reset();
    }

    fn name(&self) -> &str {
        "if"
    }
}
