//! Domain types: price observations, the four event kinds, positions and the portfolio.

pub mod event;
pub mod fill;
pub mod ids;
pub mod metrics;
pub mod order;
pub mod portfolio;
pub mod position;
pub mod price;
pub mod rounding;
pub mod signal;

pub use event::{Event, EventKind};
pub use fill::Fill;
pub use ids::{IdGen, OrderId};
pub use metrics::Metrics;
pub use order::{Order, OrderStatus, OrderType};
pub use portfolio::Portfolio;
pub use position::Position;
pub use price::{Bar, PriceEvent, Tick};
pub use signal::{Direction, Signal};

/// Symbol type alias
pub type Symbol = String;
