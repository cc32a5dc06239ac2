//! Temporal triggers.
//!
//! `RunPeriod` compares the current event's date with the previous observation
//! of the same instrument and fires when the calendar period changed. Options
//! fire on the very first observation, or only on the last date of each period
//! (found by peeking at the next queued observation).

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{Algo, AlgoContext};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    /// ISO week.
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    /// Whether two instants fall in the same calendar period.
    pub fn same_period(self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        match self {
            Self::Daily => a.date_naive() == b.date_naive(),
            Self::Weekly => a.iso_week() == b.iso_week(),
            Self::Monthly => a.year() == b.year() && a.month() == b.month(),
            Self::Quarterly => a.year() == b.year() && a.month0() / 3 == b.month0() / 3,
            Self::Yearly => a.year() == b.year(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Daily => "run_daily",
            Self::Weekly => "run_weekly",
            Self::Monthly => "run_monthly",
            Self::Quarterly => "run_quarterly",
            Self::Yearly => "run_yearly",
        }
    }
}

/// True on the first event it sees, false afterwards until reset.
#[derive(Debug, Clone, Default)]
pub struct RunOnce {
    has_run: bool,
}

impl RunOnce {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Algo for RunOnce {
    fn run(&mut self, _ctx: &mut AlgoContext<'_>) -> Result<bool> {
        if self.has_run {
            return Ok(false);
        }
        self.has_run = true;
        Ok(true)
    }

    fn reset(&mut self) {
        self.has_run = false;
    }

    fn name(&self) -> &str {
        "run_once"
    }
}

/// Fires when the current event starts a new calendar period.
#[derive(Debug, Clone)]
pub struct RunPeriod {
    period: Period,
    on_first_date: bool,
    on_end_of_period: bool,
}

impl RunPeriod {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            on_first_date: false,
            on_end_of_period: false,
        }
    }

    pub fn daily() -> Self {
        Self::new(Period::Daily)
    }

    pub fn weekly() -> Self {
        Self::new(Period::Weekly)
    }

    pub fn monthly() -> Self {
        Self::new(Period::Monthly)
    }

    pub fn quarterly() -> Self {
        Self::new(Period::Quarterly)
    }

    pub fn yearly() -> Self {
        Self::new(Period::Yearly)
    }

    /// Also fire on the first observation of an instrument.
    pub fn run_on_first_date(mut self, enabled: bool) -> Self {
        self.on_first_date = enabled;
        self
    }

    /// Fire on the last date of each period instead of the first.
    pub fn run_on_end_of_period(mut self, enabled: bool) -> Self {
        self.on_end_of_period = enabled;
        self
    }
}

impl Algo for RunPeriod {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        let symbol = ctx.event.symbol();
        let now = ctx.event.time();

        if self.on_end_of_period {
            return Ok(match ctx.data.peek_next(symbol) {
                Some(next) => !self.period.same_period(now, next.time()),
                None => true,
            });
        }

        // the current event is already the last entry of its history
        let history = ctx.data.history(symbol);
        if history.len() < 2 {
            return Ok(self.on_first_date);
        }
        let previous = history[history.len() - 2].event.time();
        Ok(!self.period.same_period(now, previous))
    }

    fn name(&self) -> &str {
        self.period.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::test_support::*;
    use crate::data::MarketData;
    use crate::domain::PriceEvent;

    /// Dispatch `dates` one at a time, running `algo` after each is recorded.
    fn replay(algo: &mut dyn Algo, dates: &[DateTime<Utc>]) -> Vec<bool> {
        let events: Vec<PriceEvent> = dates.iter().map(|&d| bar_at(d, "SPY", 1.0)).collect();
        let mut data = MarketData::new(events);
        let mut fired = Vec::new();
        while let Some(event) = data.pull() {
            data.record(event.clone());
            fired.push(run_once(algo, &event, &data).0.unwrap());
        }
        fired
    }

    #[test]
    fn monthly_fires_on_month_change() {
        let dates = [
            day(2017, 12, 31),
            day(2018, 1, 1),
            day(2018, 1, 2),
            day(2018, 2, 1),
        ];
        assert_eq!(
            replay(&mut RunPeriod::monthly(), &dates),
            vec![false, true, false, true]
        );
    }

    #[test]
    fn first_date_option() {
        let dates = [day(2018, 1, 1), day(2018, 1, 2)];
        let mut algo = RunPeriod::monthly().run_on_first_date(true);
        assert_eq!(replay(&mut algo, &dates), vec![true, false]);
    }

    #[test]
    fn end_of_period_option() {
        let dates = [
            day(2018, 1, 30),
            day(2018, 1, 31),
            day(2018, 2, 1),
            day(2018, 2, 2),
        ];
        let mut algo = RunPeriod::monthly().run_on_end_of_period(true);
        assert_eq!(replay(&mut algo, &dates), vec![false, true, false, true]);
    }

    #[test]
    fn weekly_quarterly_yearly() {
        // 2018-01-07 is a Sunday, 2018-01-08 a Monday
        let dates = [day(2018, 1, 7), day(2018, 1, 8), day(2018, 3, 30), day(2018, 4, 2)];
        assert_eq!(replay(&mut RunPeriod::weekly(), &dates), vec![false, true, true, true]);
        assert_eq!(
            replay(&mut RunPeriod::quarterly(), &dates),
            vec![false, false, false, true]
        );
        let dates = [day(2018, 12, 31), day(2019, 1, 2)];
        assert_eq!(replay(&mut RunPeriod::yearly(), &dates), vec![false, true]);
    }

    #[test]
    fn daily_fires_every_new_day() {
        let dates = [day(2018, 1, 1), day(2018, 1, 2), day(2018, 1, 3)];
        assert_eq!(replay(&mut RunPeriod::daily(), &dates), vec![false, true, true]);
    }

    #[test]
    fn run_once_until_reset() {
        let dates = [day(2018, 1, 1), day(2018, 1, 2)];
        let mut once = RunOnce::new();
        assert_eq!(replay(&mut once, &dates), vec![true, false]);
        once.reset();
        assert_eq!(replay(&mut once, &dates), vec![true, false]);
    }
}
