//! Memoized subset search over a catalogue under a budget.
//!
//! One engine serves every [`Strategy`]. From a state `s`, each item not yet
//! selected whose price fits in `s.balance` yields a child `s.extend(item)`.
//! The result for `s` is the highest-benefit state among `s` and the results
//! of the children it explores; ties keep the state found first.
//!
//! The recursion runs on an explicit stack of [`Frame`]s, so depth is bounded
//! by heap memory rather than the native call stack. A frame is finished
//! when it has no more children to explore; its best state is then stored in
//! the cache and handed to the parent frame.
//!
//! # Strategies
//!
//! - `Exhaustive` explores every legal child. It is exponential and exact.
//! - `PrunedGreedy` / `PrunedGreedyByPrice` walk a sorted catalogue and stop
//!   exploring a state's children when
//!   1. `max_profit_rate / 100 × price(i)` falls below the benefit the state
//!      has already gained over itself (bound cutoff), or
//!   2. a child fails to strictly improve the state's best (stall cutoff).
//!
//!   Neither bound is admissible. Pruned results are approximations and are
//!   never better than the exhaustive result.
//! - `Greedy` makes a single pass and buys whatever still fits.

use crate::core::memo::{CacheStatistics, MemoCache};
use crate::core::state::SearchState;
use crate::domain::model::{Catalogue, Strategy};
use crate::utils::error::{OptimizerError, Result};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    /// States whose children were enumerated (cache misses included).
    pub states_expanded: u64,
    pub bound_cutoffs: u64,
    pub stall_cutoffs: u64,
    /// Deepest selection explored.
    pub max_depth: usize,
    pub cache: CacheStatistics,
}

/// Everything one search invocation reads or mutates.
///
/// The cache lives and dies with the context, and the context borrows
/// exactly one catalogue, so cached results never leak between catalogues.
pub struct SearchContext<'a> {
    catalogue: &'a Catalogue,
    cache: MemoCache,
    stats: SearchStatistics,
}

impl<'a> SearchContext<'a> {
    pub fn new(catalogue: &'a Catalogue, cache_capacity: usize) -> Self {
        Self {
            catalogue,
            cache: MemoCache::new(cache_capacity),
            stats: SearchStatistics::default(),
        }
    }

    pub fn cache(&self) -> &MemoCache {
        &self.cache
    }

    /// Empties the cache and resets statistics.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.stats = SearchStatistics::default();
    }

    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            cache: self.cache.statistics(),
            ..self.stats
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best: SearchState,
    pub statistics: SearchStatistics,
}

/// Pending exploration of one state.
#[derive(Debug)]
struct Frame {
    state: SearchState,
    /// Best state found so far from `state`, `state` itself initially.
    best: SearchState,
    /// Next catalogue position to consider as a child.
    cursor: usize,
    /// Benefit gained over `state` by the improvements found so far.
    increase: Decimal,
    /// Set by a cutoff; no further children are explored.
    closed: bool,
}

impl Frame {
    fn new(state: SearchState) -> Self {
        Self {
            best: state.clone(),
            state,
            cursor: 0,
            increase: Decimal::ZERO,
            closed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    strategy: Strategy,
    cache_capacity: usize,
}

impl SearchEngine {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            cache_capacity: crate::core::memo::DEFAULT_CACHE_CAPACITY,
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn without_memoization(self) -> Self {
        self.with_cache_capacity(0)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Runs one search with a fresh context.
    ///
    /// The catalogue must already be in the order the strategy requires
    /// (see [`Strategy::prepare`]).
    pub fn run(&self, catalogue: &Catalogue, budget: Decimal) -> Result<SearchOutcome> {
        let mut ctx = SearchContext::new(catalogue, self.cache_capacity);
        let best = self.search(&mut ctx, budget)?;
        Ok(SearchOutcome {
            best,
            statistics: ctx.statistics(),
        })
    }

    /// Best state reachable from the empty selection.
    ///
    /// Fails with [`OptimizerError::InvalidItem`] or
    /// [`OptimizerError::InvalidBudget`] before exploring anything.
    pub fn search(&self, ctx: &mut SearchContext<'_>, budget: Decimal) -> Result<SearchState> {
        if budget < Decimal::ZERO {
            return Err(OptimizerError::InvalidBudget {
                value: budget.to_string(),
            });
        }
        ctx.catalogue.validate()?;

        if let Some(order) = self.strategy.required_order() {
            if !ctx.catalogue.is_sorted_by(order) {
                tracing::warn!(
                    "Catalogue is not in {:?} order, {} results may be poor",
                    order,
                    self.strategy
                );
            }
        }

        let root = SearchState::root(budget);
        let best = match self.strategy {
            Strategy::Greedy => self.single_pass(ctx, root),
            _ => self.explore(ctx, root)?,
        };

        let stats = ctx.statistics();
        tracing::debug!(
            strategy = %self.strategy,
            items = ctx.catalogue.len(),
            expanded = stats.states_expanded,
            cache_hits = stats.cache.hits,
            evictions = stats.cache.evictions,
            bound_cutoffs = stats.bound_cutoffs,
            stall_cutoffs = stats.stall_cutoffs,
            max_depth = stats.max_depth,
            "search finished"
        );

        Ok(best)
    }

    fn single_pass(&self, ctx: &mut SearchContext<'_>, root: SearchState) -> SearchState {
        ctx.stats.states_expanded += 1;
        let state = ctx
            .catalogue
            .items()
            .iter()
            .enumerate()
            .fold(root, |state, (position, item)| {
                if state.can_afford(item) {
                    state.extend(position, item)
                } else {
                    state
                }
            });
        ctx.stats.max_depth = state.len();
        state
    }

    fn explore(&self, ctx: &mut SearchContext<'_>, root: SearchState) -> Result<SearchState> {
        if let Some(best) = ctx.cache.get(&root.key()) {
            return Ok(best);
        }

        let bound_rate = ctx.catalogue.max_profit_rate() / Decimal::ONE_HUNDRED;
        let mut stack = vec![Frame::new(root)];
        ctx.stats.states_expanded += 1;

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = self.next_child(ctx.catalogue, frame, bound_rate, &mut ctx.stats) {
                match ctx.cache.get(&child.key()) {
                    Some(best) => self.absorb(frame, best, &mut ctx.stats),
                    None => {
                        ctx.stats.states_expanded += 1;
                        ctx.stats.max_depth = ctx.stats.max_depth.max(child.len());
                        stack.push(Frame::new(child));
                    }
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            ctx.cache.insert(done.state.key(), done.best.clone());
            match stack.last_mut() {
                Some(parent) => self.absorb(parent, done.best, &mut ctx.stats),
                None => return Ok(done.best),
            }
        }

        Err(OptimizerError::InconsistentState {
            message: "search stack emptied without producing a result".to_string(),
        })
    }

    /// Advances `frame` to its next child, applying the bound cutoff.
    fn next_child(
        &self,
        catalogue: &Catalogue,
        frame: &mut Frame,
        bound_rate: Decimal,
        stats: &mut SearchStatistics,
    ) -> Option<SearchState> {
        if frame.closed {
            return None;
        }

        while let Some(item) = catalogue.get(frame.cursor) {
            let position = frame.cursor;
            frame.cursor += 1;

            if !frame.state.can_afford(item) {
                continue;
            }
            if self.strategy.is_pruned() && bound_rate * item.price() < frame.increase {
                stats.bound_cutoffs += 1;
                frame.closed = true;
                return None;
            }
            if frame.state.contains(position) {
                continue;
            }
            return Some(frame.state.extend(position, item));
        }
        None
    }

    /// Folds a child's result into its parent, applying the stall cutoff.
    fn absorb(&self, frame: &mut Frame, result: SearchState, stats: &mut SearchStatistics) {
        if result.benefit() > frame.best.benefit() {
            frame.increase += result.benefit() - frame.best.benefit();
            frame.best = result;
        } else if self.strategy.is_pruned() {
            stats.stall_cutoffs += 1;
            frame.closed = true;
        }
    }
}
