//! Turns the engine's best state back into catalogue items.

use crate::core::state::SearchState;
use crate::domain::model::{Catalogue, SelectionSummary};
use crate::utils::error::{OptimizerError, Result};
use rust_decimal::Decimal;

/// Reconstructs the selected items (in catalogue order) and the totals.
///
/// Total cost is `initial_budget - final_balance`. A selected position with no
/// catalogue item means the engine produced a state for another catalogue,
/// which is reported as [`OptimizerError::InconsistentState`].
pub fn select(
    catalogue: &Catalogue,
    initial_budget: Decimal,
    state: &SearchState,
) -> Result<SelectionSummary> {
    let items = state
        .selected()
        .iter()
        .map(|&position| {
            catalogue
                .get(position)
                .cloned()
                .ok_or_else(|| OptimizerError::InconsistentState {
                    message: format!(
                        "selected position {} not found in a catalogue of {} items",
                        position,
                        catalogue.len()
                    ),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SelectionSummary {
        count: items.len(),
        items,
        initial_budget,
        final_balance: state.balance(),
        total_cost: initial_budget - state.balance(),
        total_benefit: state.benefit(),
    })
}

/// Recomputes cost and benefit from the items themselves and checks them
/// against the summary and the budget.
pub fn verify(summary: &SelectionSummary) -> Result<()> {
    let cost: Decimal = summary.items.iter().map(|item| item.price()).sum();
    let benefit: Decimal = summary.items.iter().map(|item| item.benefit()).sum();

    if cost != summary.total_cost {
        return Err(OptimizerError::InconsistentState {
            message: format!(
                "recomputed cost {} differs from reported cost {}",
                cost, summary.total_cost
            ),
        });
    }
    if benefit != summary.total_benefit {
        return Err(OptimizerError::InconsistentState {
            message: format!(
                "recomputed benefit {} differs from reported benefit {}",
                benefit, summary.total_benefit
            ),
        });
    }
    if summary.final_balance < Decimal::ZERO {
        return Err(OptimizerError::InconsistentState {
            message: format!("selection overspends the budget by {}", -summary.final_balance),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Item;

    fn catalogue() -> Catalogue {
        Catalogue::new(vec![
            Item::new("A", Decimal::from(100), Decimal::from(10)),
            Item::new("B", Decimal::from(200), Decimal::from(8)),
            Item::new("C", Decimal::from(50), Decimal::from(20)),
        ])
    }

    #[test]
    fn test_select_preserves_catalogue_order() {
        let catalogue = catalogue();
        let budget = Decimal::from(250);
        let state = SearchState::root(budget)
            .extend(2, &catalogue.items()[2])
            .extend(1, &catalogue.items()[1]);

        let summary = select(&catalogue, budget, &state).unwrap();

        assert_eq!(summary.ids(), vec!["B", "C"]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_cost, Decimal::from(250));
        assert_eq!(summary.total_benefit, Decimal::from(26));
        assert_eq!(summary.final_balance, Decimal::ZERO);
        assert!(verify(&summary).is_ok());
    }

    #[test]
    fn test_select_is_idempotent() {
        let catalogue = catalogue();
        let budget = Decimal::from(500);
        let state = SearchState::root(budget).extend(0, &catalogue.items()[0]);

        let first = select(&catalogue, budget, &state).unwrap();
        let second = select(&catalogue, budget, &state).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_position_is_inconsistent() {
        let catalogue = catalogue();
        let budget = Decimal::from(500);
        let stray = Item::new("Z", Decimal::from(1), Decimal::from(1));
        let state = SearchState::root(budget).extend(7, &stray);

        let err = select(&catalogue, budget, &state).unwrap_err();
        assert!(matches!(err, OptimizerError::InconsistentState { .. }));
    }

    #[test]
    fn test_verify_detects_tampered_totals() {
        let catalogue = catalogue();
        let budget = Decimal::from(250);
        let state = SearchState::root(budget).extend(0, &catalogue.items()[0]);
        let mut summary = select(&catalogue, budget, &state).unwrap();

        summary.total_benefit += Decimal::ONE;
        assert!(verify(&summary).is_err());
    }
}
