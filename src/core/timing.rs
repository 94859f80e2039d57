//! Wall-clock measurements of the search over growing catalogue prefixes.

use crate::core::search::{SearchContext, SearchEngine};
pub use crate::domain::model::SizeSchedule;
use crate::domain::model::{Catalogue, Strategy, TimingSample};
use crate::utils::error::Result;
use rust_decimal::Decimal;
use std::time::{Duration, Instant};

pub const DEFAULT_CEILING: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct TimingRun {
    pub samples: Vec<TimingSample>,
    /// The last sample exceeded the ceiling and the schedule was cut short.
    pub stopped_early: bool,
}

pub struct TimingHarness {
    engine: SearchEngine,
    budget: Decimal,
    schedule: SizeSchedule,
    ceiling: Duration,
}

impl TimingHarness {
    pub fn new(strategy: Strategy, budget: Decimal) -> Self {
        Self {
            engine: SearchEngine::new(strategy),
            budget,
            schedule: SizeSchedule::default(),
            ceiling: DEFAULT_CEILING,
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.engine = self.engine.with_cache_capacity(capacity);
        self
    }

    pub fn with_schedule(mut self, schedule: SizeSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Measures one search per scheduled size.
    ///
    /// Each sample slices the first `size` items, applies the strategy's
    /// ordering and searches with a new, empty cache; only the search itself
    /// is timed. Stops after the first sample slower than the ceiling.
    pub fn run(&self, catalogue: &Catalogue) -> Result<TimingRun> {
        let strategy = self.engine.strategy();
        let mut samples = Vec::new();
        let mut stopped_early = false;

        for size in self.schedule.sizes(catalogue.len()) {
            let prepared = strategy.prepare(&catalogue.truncated(size));
            let mut ctx = SearchContext::new(&prepared, self.engine.cache_capacity());

            let start = Instant::now();
            let best = self.engine.search(&mut ctx, self.budget)?;
            let duration = start.elapsed();

            tracing::info!(
                "⏱️ {} items: {:?} (benefit {}, {} states)",
                size,
                duration,
                best.benefit(),
                ctx.statistics().states_expanded
            );
            samples.push(TimingSample::new(size, duration));

            if duration > self.ceiling {
                tracing::warn!(
                    "Sample at {} items took {:?}, over the {:?} ceiling; stopping",
                    size,
                    duration,
                    self.ceiling
                );
                stopped_early = true;
                break;
            }
        }

        Ok(TimingRun {
            samples,
            stopped_early,
        })
    }
}
