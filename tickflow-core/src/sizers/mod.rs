//! Sizing policies: turn a directional order into a concrete quantity.
//!
//! Sizers see the latest price and the portfolio but never decide direction:
//! `Buy`/`Sell` keep theirs, `Exit` is resolved to whichever side flattens the
//! held position.

pub mod fixed;

pub use fixed::FixedSizer;

use std::fmt;

use crate::domain::{Order, Portfolio, PriceEvent};
use crate::error::Result;

/// Quantity assignment for freshly built orders.
///
/// # Responsibilities
/// - Fill in the quantity of `Buy`/`Sell` orders that carry none
/// - Resolve `Exit` orders against the held position
///
/// # Non-Responsibilities
/// - Sizers do NOT reject orders on risk grounds (that's the risk policy's job)
pub trait SizingPolicy: Send + Sync + fmt::Debug {
    fn size_order(&self, order: Order, price: &PriceEvent, portfolio: &Portfolio)
        -> Result<Order>;

    /// Setup-time parameter checks.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Sizer name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, OrderId, Signal, Direction};
    use chrono::Utc;

    #[derive(Debug)]
    struct DummySizer;

    impl SizingPolicy for DummySizer {
        fn size_order(&self, mut order: Order, _: &PriceEvent, _: &Portfolio) -> Result<Order> {
            order.quantity = 100.0;
            Ok(order)
        }

        fn name(&self) -> &str {
            "dummy"
        }
    }

    #[test]
    fn sizer_trait_object_builds() {
        let sizer: Box<dyn SizingPolicy> = Box::new(DummySizer);
        let price: PriceEvent = Bar::new(Utc::now(), "SPY", 1.0, 1.0, 1.0, 1.0, 1.0).into();
        let order = Order::from_signal(OrderId(1), &Signal::new(Utc::now(), "SPY", Direction::Buy));
        let sized = sizer
            .size_order(order, &price, &Portfolio::new(1_000.0))
            .unwrap();
        assert_eq!(sized.quantity, 100.0);
        assert!(sizer.validate().is_ok());
    }
}
