//! Named strategy templates selectable from a run config.
//!
//! Every preset builds a root strategy with one leg per symbol; each leg owns
//! its algo stack and a single asset leaf, so evaluation is routed per symbol.

use serde::{Deserialize, Serialize};
use tickflow_core::algo::{
    And, AlgoStack, Compare, CreateSignal, If, IsInvested, LatestPrice, Not, Recorded, RunOnce,
    RunPeriod, Sma,
};
use tickflow_core::domain::Direction;
use tickflow_core::strategy::{Asset, Strategy};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyPreset {
    /// Buy on each symbol's first event and hold.
    #[default]
    BuyAndHold,
    /// Long while price is above its simple moving average, flat otherwise.
    SmaCross { period: usize },
    /// Close and reopen each position on the first event of every month.
    MonthlyRebalance,
}

impl StrategyPreset {
    pub fn name(&self) -> String {
        match self {
            Self::BuyAndHold => "buy_and_hold".into(),
            Self::SmaCross { period } => format!("sma_cross_{period}"),
            Self::MonthlyRebalance => "monthly_rebalance".into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::SmaCross { period: 0 } => Err("strategy.period must be >= 1".into()),
            _ => Ok(()),
        }
    }

    pub fn build(&self, symbols: &[String]) -> Strategy {
        symbols
            .iter()
            .fold(Strategy::new(self.name()), |root, symbol| {
                let leg = Strategy::new(format!("{}:{symbol}", self.name()))
                    .with_algos(self.stack())
                    .with_child(Asset::new(symbol.as_str()));
                root.with_child(leg)
            })
    }

    fn stack(&self) -> AlgoStack {
        match *self {
            Self::BuyAndHold => AlgoStack::new()
                .push(RunOnce::new())
                .push(CreateSignal::new(Direction::Buy)),
            Self::SmaCross { period } => {
                // the leading average records the metric, the conditions read it back
                let sma = Sma::new(period);
                let key = sma.key().to_string();
                AlgoStack::new()
                    .push(sma)
                    .push(If::new(
                        And::new(
                            Compare::greater(LatestPrice::new(), Recorded::new(key.as_str())),
                            Not::new(IsInvested),
                        ),
                        CreateSignal::new(Direction::Buy),
                    ))
                    .push(If::new(
                        And::new(
                            Compare::less(LatestPrice::new(), Recorded::new(key)),
                            IsInvested,
                        ),
                        CreateSignal::new(Direction::Exit),
                    ))
            }
            Self::MonthlyRebalance => AlgoStack::new()
                .push(RunPeriod::monthly().run_on_first_date(true))
                .push(If::new(IsInvested, CreateSignal::new(Direction::Exit)))
                .push(CreateSignal::new(Direction::Buy)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(StrategyPreset::BuyAndHold.name(), "buy_and_hold");
        assert_eq!(StrategyPreset::SmaCross { period: 20 }.name(), "sma_cross_20");
    }

    #[test]
    fn build_creates_one_leg_per_symbol() {
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];
        let strategy = StrategyPreset::MonthlyRebalance.build(&symbols);
        assert_eq!(strategy.name(), "monthly_rebalance");
        assert_eq!(strategy.children().len(), 2);
        assert_eq!(strategy.symbols(), vec!["AAA", "BBB"]);
    }

    #[test]
    fn sma_cross_computes_the_average_once() {
        // one leading average, then the entry and exit branches
        assert_eq!(StrategyPreset::SmaCross { period: 3 }.stack().len(), 3);
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(StrategyPreset::SmaCross { period: 0 }.validate().is_err());
        assert!(StrategyPreset::SmaCross { period: 5 }.validate().is_ok());
    }

    #[test]
    fn deserializes_tagged() {
        let preset: StrategyPreset =
            serde_json::from_str(r#"{"type":"SMA_CROSS","period":10}"#).unwrap();
        assert_eq!(preset, StrategyPreset::SmaCross { period: 10 });
    }
}
