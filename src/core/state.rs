//! Search state: a partial selection with its accumulated benefit and the
//! budget left to spend.
//!
//! States are values. [`SearchState::extend`] derives a child holding one more
//! item and leaves the parent untouched. The selection is kept sorted so
//! that two exploration orders reaching the same set of items produce equal
//! states and equal memoization keys.

use crate::domain::model::Item;
use rust_decimal::Decimal;

/// Canonical memoization key.
///
/// `benefit` is a function of `selected`, so it is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    selected: Vec<usize>,
    balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Catalogue positions, ascending.
    selected: Vec<usize>,
    benefit: Decimal,
    balance: Decimal,
}

impl SearchState {
    /// The empty selection with the whole budget available.
    pub fn root(budget: Decimal) -> Self {
        Self {
            selected: Vec::new(),
            benefit: Decimal::ZERO,
            balance: budget,
        }
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn benefit(&self) -> Decimal {
        self.benefit
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.selected.binary_search(&position).is_ok()
    }

    pub fn can_afford(&self, item: &Item) -> bool {
        item.price() <= self.balance
    }

    /// Child state holding `item` (found at `position`) in addition to this
    /// selection.
    ///
    /// Callers check [`contains`](Self::contains) and
    /// [`can_afford`](Self::can_afford) first; the balance never goes below
    /// zero on a legal extension.
    pub fn extend(&self, position: usize, item: &Item) -> SearchState {
        debug_assert!(!self.contains(position));
        debug_assert!(self.can_afford(item));

        let mut selected = Vec::with_capacity(self.selected.len() + 1);
        let split = self.selected.partition_point(|&p| p < position);
        selected.extend_from_slice(&self.selected[..split]);
        selected.push(position);
        selected.extend_from_slice(&self.selected[split..]);

        SearchState {
            selected,
            benefit: self.benefit + item.benefit(),
            balance: self.balance - item.price(),
        }
    }

    pub fn key(&self) -> StateKey {
        StateKey {
            selected: self.selected.clone(),
            balance: self.balance,
        }
    }
}
