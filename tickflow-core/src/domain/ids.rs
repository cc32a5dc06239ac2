use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-unique order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Monotonic id source owned by one engine run.
#[derive(Debug, Clone, Default)]
pub struct IdGen {
    next_order: u64,
}

impl IdGen {
    pub fn next_order_id(&mut self) -> OrderId {
        self.next_order += 1;
        OrderId(self.next_order)
    }

    pub fn reset(&mut self) {
        self.next_order = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut ids = IdGen::default();
        let a = ids.next_order_id();
        let b = ids.next_order_id();
        assert_eq!(a, OrderId(1));
        assert_eq!(b, OrderId(2));
        assert!(b > a);
    }

    #[test]
    fn reset_restarts_sequence() {
        let mut ids = IdGen::default();
        ids.next_order_id();
        ids.next_order_id();
        ids.reset();
        assert_eq!(ids.next_order_id(), OrderId(1));
    }

    #[test]
    fn display_format() {
        assert_eq!(OrderId(7).to_string(), "#7");
    }
}
