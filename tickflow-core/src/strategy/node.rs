use serde::{Deserialize, Serialize};

use crate::algo::{Algo, AlgoContext, AlgoStack};
use crate::data::MarketData;
use crate::domain::{Metrics, Portfolio, PriceEvent, Signal};
use crate::error::{BacktestError, Result};

/// Fields shared by every node kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub is_root: bool,
}

impl NodeInfo {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_root: false,
        }
    }
}

/// An error raised by one strategy node while evaluating one event.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeError {
    pub node: String,
    pub error: BacktestError,
}

/// Output of evaluating a tree against one price event.
#[derive(Debug, Default)]
pub struct Evaluation {
    pub signals: Vec<Signal>,
    pub errors: Vec<NodeError>,
}

impl Evaluation {
    fn merge(&mut self, other: Evaluation) {
        self.signals.extend(other.signals);
        self.errors.extend(other.errors);
    }
}

#[derive(Debug)]
pub enum Node {
    Strategy(Strategy),
    Asset(Asset),
}

impl Node {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Self::Strategy(s) => &s.info,
            Self::Asset(a) => &a.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn is_root(&self) -> bool {
        self.info().is_root
    }

    /// Strategies accept children; assets are leaves.
    pub fn add_child(&mut self, child: impl Into<Node>) -> Result<()> {
        match self {
            Self::Strategy(s) => {
                s.add_child(child);
                Ok(())
            }
            Self::Asset(a) => Err(BacktestError::InvalidNode(format!(
                "asset {} cannot have children",
                a.info.name
            ))),
        }
    }

    fn reset(&mut self) {
        if let Self::Strategy(s) = self {
            s.reset();
        }
    }
}

impl From<Strategy> for Node {
    fn from(strategy: Strategy) -> Self {
        Self::Strategy(strategy)
    }
}

impl From<Asset> for Node {
    fn from(asset: Asset) -> Self {
        Self::Asset(asset)
    }
}

/// Leaf naming one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    info: NodeInfo,
}

impl Asset {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            info: NodeInfo::new(symbol),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.info.name
    }
}

/// A node that evaluates its algo stack on every routed price event.
///
/// Routing: if any direct child is an `Asset`, the node's own stack only runs
/// for those instruments; otherwise it runs for every instrument. Child
/// strategies always receive the event. An error in this node's stack drops
/// this node's signals for the event and nothing else.
#[derive(Debug)]
pub struct Strategy {
    info: NodeInfo,
    algos: AlgoStack,
    children: Vec<Node>,
    event: Option<PriceEvent>,
    signals: Vec<Signal>,
}

impl Strategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: NodeInfo::new(name),
            algos: AlgoStack::new(),
            children: Vec::new(),
            event: None,
            signals: Vec::new(),
        }
    }

    pub fn with_algos(mut self, algos: AlgoStack) -> Self {
        self.algos = algos;
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child);
        self
    }

    pub fn add_child(&mut self, child: impl Into<Node>) {
        let mut child = child.into();
        match &mut child {
            Node::Strategy(s) => s.info.is_root = false,
            Node::Asset(a) => a.info.is_root = false,
        }
        self.children.push(child);
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.info.is_root = is_root;
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn is_root(&self) -> bool {
        self.info.is_root
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Last event this node evaluated.
    pub fn event(&self) -> Option<&PriceEvent> {
        self.event.as_ref()
    }

    /// Signals this node emitted for its last evaluated event.
    pub fn pending_signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Every instrument named by an asset leaf anywhere below this node.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols = Vec::new();
        for child in &self.children {
            match child {
                Node::Asset(a) => symbols.push(a.symbol()),
                Node::Strategy(s) => symbols.extend(s.symbols()),
            }
        }
        symbols.sort_unstable();
        symbols.dedup();
        symbols
    }

    fn handles(&self, symbol: &str) -> bool {
        let mut assets = self.children.iter().filter_map(|c| match c {
            Node::Asset(a) => Some(a.symbol()),
            Node::Strategy(_) => None,
        });
        match assets.next() {
            None => true,
            Some(first) => first == symbol || assets.any(|s| s == symbol),
        }
    }

    /// Evaluate this node and its descendants against one price event.
    pub fn on_price(
        &mut self,
        event: &PriceEvent,
        data: &MarketData,
        portfolio: &Portfolio,
        metrics: &mut Metrics,
    ) -> Evaluation {
        let mut evaluation = Evaluation::default();
        self.signals.clear();

        if self.handles(event.symbol()) {
            self.event = Some(event.clone());
            let outcome = {
                let mut ctx = AlgoContext::new(event, data, portfolio, &mut self.signals, metrics);
                self.algos.run(&mut ctx)
            };
            match outcome {
                Ok(_) => evaluation.signals.extend(self.signals.iter().cloned()),
                Err(error) => {
                    self.signals.clear();
                    evaluation.errors.push(NodeError {
                        node: self.info.name.clone(),
                        error,
                    });
                }
            }
        }

        for child in &mut self.children {
            if let Node::Strategy(strategy) = child {
                evaluation.merge(strategy.on_price(event, data, portfolio, metrics));
            }
        }
        evaluation
    }

    /// Clear per-run state in this node, its algos and its descendants.
    pub fn reset(&mut self) {
        self.event = None;
        self.signals.clear();
        self.algos.reset();
        for child in &mut self.children {
            child.reset();
        }
    }
}
