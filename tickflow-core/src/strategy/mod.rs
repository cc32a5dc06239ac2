//! Strategy tree: named nodes that evaluate algo stacks and emit signals.
//!
//! - `Node`: closed set of node kinds, `Strategy` or `Asset`.
//! - `Strategy`: owns an `AlgoStack` and an ordered list of child nodes.
//! - `Asset`: leaf naming one instrument; it never evaluates algos.
//! - `Evaluation`: signals and per-node errors from one price event.

mod node;

pub use node::{Asset, Evaluation, Node, NodeError, NodeInfo, Strategy};
