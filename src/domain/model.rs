use crate::utils::error::{OptimizerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// An investable item: a price and a profit percentage.
///
/// `benefit` is derived once at construction (`price × profit_rate / 100`)
/// and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    id: String,
    price: Decimal,
    profit_rate: Decimal,
    benefit: Decimal,
}

impl Item {
    pub fn new(id: impl Into<String>, price: Decimal, profit_rate: Decimal) -> Self {
        Self {
            id: id.into(),
            price,
            profit_rate,
            benefit: price * profit_rate / Decimal::ONE_HUNDRED,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn profit_rate(&self) -> Decimal {
        self.profit_rate
    }

    pub fn benefit(&self) -> Decimal {
        self.benefit
    }
}

/// Ordering a catalogue must follow before a strategy runs over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    ProfitRateDesc,
    PriceAsc,
}

/// Immutable, ordered sequence of items.
///
/// Inside the search engine an item is identified by its position in the
/// catalogue; the external `id` is what reports show.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalogue {
    items: Vec<Item>,
}

impl Catalogue {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, position: usize) -> Option<&Item> {
        self.items.get(position)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Highest profit rate in the catalogue, zero when empty.
    pub fn max_profit_rate(&self) -> Decimal {
        self.items
            .iter()
            .map(Item::profit_rate)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks the preconditions the engine relies on.
    ///
    /// Every price must be strictly positive, every profit rate non-negative
    /// and every id unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.price <= Decimal::ZERO {
                return Err(OptimizerError::InvalidItem {
                    name: item.id.clone(),
                    reason: format!("price must be positive, got {}", item.price),
                });
            }
            if item.profit_rate < Decimal::ZERO {
                return Err(OptimizerError::InvalidItem {
                    name: item.id.clone(),
                    reason: format!("profit rate must not be negative, got {}", item.profit_rate),
                });
            }
            if !seen.insert(item.id.as_str()) {
                return Err(OptimizerError::InvalidItem {
                    name: item.id.clone(),
                    reason: "duplicate id in catalogue".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Stable sort into the given order.
    pub fn sorted(&self, order: SortOrder) -> Catalogue {
        let mut items = self.items.clone();
        match order {
            SortOrder::ProfitRateDesc => items.sort_by(|a, b| b.profit_rate.cmp(&a.profit_rate)),
            SortOrder::PriceAsc => items.sort_by(|a, b| a.price.cmp(&b.price)),
        }
        Catalogue { items }
    }

    pub fn is_sorted_by(&self, order: SortOrder) -> bool {
        self.items.windows(2).all(|pair| match order {
            SortOrder::ProfitRateDesc => pair[0].profit_rate >= pair[1].profit_rate,
            SortOrder::PriceAsc => pair[0].price <= pair[1].price,
        })
    }

    /// The first `size` items (all of them when `size` exceeds the length).
    pub fn truncated(&self, size: usize) -> Catalogue {
        Catalogue {
            items: self.items.iter().take(size).cloned().collect(),
        }
    }
}

impl FromIterator<Item> for Catalogue {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Catalogue::new(iter.into_iter().collect())
    }
}

/// Search strategy. All variants share the state and memoization model and
/// differ only in catalogue ordering and pruning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Every legal child explored, no cutoffs. Correctness oracle.
    Exhaustive,
    /// Bound and first-stall cutoffs over a profit-rate-descending catalogue.
    #[default]
    PrunedGreedy,
    /// Same cutoffs over a price-ascending catalogue.
    PrunedGreedyByPrice,
    /// One pass buying every item that still fits.
    Greedy,
}

impl Strategy {
    pub fn required_order(self) -> Option<SortOrder> {
        match self {
            Strategy::Exhaustive => None,
            Strategy::PrunedGreedy | Strategy::Greedy => Some(SortOrder::ProfitRateDesc),
            Strategy::PrunedGreedyByPrice => Some(SortOrder::PriceAsc),
        }
    }

    pub fn is_pruned(self) -> bool {
        matches!(self, Strategy::PrunedGreedy | Strategy::PrunedGreedyByPrice)
    }

    /// Applies the ordering this strategy expects, if any.
    pub fn prepare(self, catalogue: &Catalogue) -> Catalogue {
        match self.required_order() {
            Some(order) => catalogue.sorted(order),
            None => catalogue.clone(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Exhaustive => "exhaustive",
            Strategy::PrunedGreedy => "pruned-greedy",
            Strategy::PrunedGreedyByPrice => "pruned-greedy-by-price",
            Strategy::Greedy => "greedy",
        };
        f.write_str(name)
    }
}

/// Which catalogue sizes to measure.
///
/// Sizes run from `start` to `end` (inclusive, defaults to the catalogue
/// length) in steps of `step`, then get clamped into `[2, len]`; repeated
/// sizes produced by the clamp are measured once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSchedule {
    pub start: usize,
    pub end: Option<usize>,
    pub step: usize,
}

impl Default for SizeSchedule {
    fn default() -> Self {
        Self {
            start: 1,
            end: None,
            step: 1,
        }
    }
}

impl SizeSchedule {
    pub fn sizes(&self, catalogue_len: usize) -> Vec<usize> {
        if catalogue_len == 0 {
            return Vec::new();
        }
        let end = self.end.unwrap_or(catalogue_len);
        let step = self.step.max(1);
        let lower = 2.min(catalogue_len);
        let upper = end.min(catalogue_len);

        let mut sizes: Vec<usize> = (self.start..=upper)
            .step_by(step)
            .map(|size| size.clamp(lower, catalogue_len))
            .collect();

        // 超出目錄長度的步進值全部夾成 catalogue_len，只需補一次
        let next = if self.start <= upper {
            let last = self.start + (upper - self.start) / step * step;
            last.checked_add(step)
        } else {
            Some(self.start)
        };
        if next.is_some_and(|size| size <= end) {
            sizes.push(catalogue_len);
        }

        sizes.dedup();
        sizes
    }
}

/// One wall-clock measurement of a search run over `size` items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    pub size: usize,
    pub duration: Duration,
}

impl TimingSample {
    pub fn new(size: usize, duration: Duration) -> Self {
        Self { size, duration }
    }

    pub fn duration_us(&self) -> f64 {
        self.duration.as_nanos() as f64 / 1_000.0
    }
}

/// The value-level result of a search, as handed to any presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    /// Selected items, in catalogue order.
    pub items: Vec<Item>,
    pub initial_budget: Decimal,
    pub final_balance: Decimal,
    pub total_cost: Decimal,
    pub total_benefit: Decimal,
    pub count: usize,
}

impl SelectionSummary {
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(Item::id).collect()
    }
}
