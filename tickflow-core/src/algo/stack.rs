use super::{Algo, AlgoContext};
use crate::error::Result;

/// Ordered list of algos, itself an algo.
///
/// Children run in order. The first child to return false halts the stack:
/// later children are skipped unless they are marked always-run. A failing
/// always-run child makes the stack return false but does not halt it.
/// Errors propagate immediately. An empty stack returns true.
#[derive(Debug, Default)]
pub struct AlgoStack {
    algos: Vec<Box<dyn Algo>>,
}

impl AlgoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_algos(algos: Vec<Box<dyn Algo>>) -> Self {
        Self { algos }
    }

    pub fn push(mut self, algo: impl Algo + 'static) -> Self {
        self.algos.push(Box::new(algo));
        self
    }

    pub fn len(&self) -> usize {
        self.algos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algos.is_empty()
    }
}

impl Algo for AlgoStack {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        let mut passed = true;
        let mut halted = false;
        for algo in &mut self.algos {
            if halted && !algo.always_run() {
                continue;
            }
            if !algo.run(ctx)? {
                passed = false;
                if !algo.always_run() {
                    halted = true;
                }
            }
        }
        Ok(passed)
    }

    fn reset(&mut self) {
        for algo in &mut self.algos {
            algo.reset();
        }
    }

    fn name(&self) -> &str {
        "stack"
    }
}
