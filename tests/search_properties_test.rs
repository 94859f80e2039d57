//! Invariants of the search engine over deterministic generated catalogues.

use rust_decimal::Decimal;
use share_optimizer::core::search::SearchEngine;
use share_optimizer::core::selector;
use share_optimizer::core::state::SearchState;
use share_optimizer::{Catalogue, Item, SelectionSummary, Strategy};

const STRATEGIES: [Strategy; 4] = [
    Strategy::Exhaustive,
    Strategy::PrunedGreedy,
    Strategy::PrunedGreedyByPrice,
    Strategy::Greedy,
];

/// Small linear congruential generator, enough to vary catalogues between seeds.
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

fn generated_catalogue(seed: u64, len: usize) -> Catalogue {
    let mut rng = Lcg(seed);
    (0..len)
        .map(|i| {
            let price = Decimal::new(500 + (rng.next_u64() % 5_000) as i64, 2);
            let profit = Decimal::new(1 + (rng.next_u64() % 3_000) as i64, 2);
            Item::new(format!("Share-{seed}-{i}"), price, profit)
        })
        .collect()
}

/// Best benefit over every subset, by enumerating bitmasks.
fn brute_force_best(catalogue: &Catalogue, budget: Decimal) -> Decimal {
    let items = catalogue.items();
    let mut best = Decimal::ZERO;
    for mask in 0u32..(1 << items.len()) {
        let (cost, benefit) = items
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .fold((Decimal::ZERO, Decimal::ZERO), |(c, b), (_, item)| {
                (c + item.price(), b + item.benefit())
            });
        if cost <= budget && benefit > best {
            best = benefit;
        }
    }
    best
}

fn run(strategy: Strategy, catalogue: &Catalogue, budget: Decimal) -> SelectionSummary {
    let prepared = strategy.prepare(catalogue);
    let outcome = SearchEngine::new(strategy).run(&prepared, budget).unwrap();
    selector::select(&prepared, budget, &outcome.best).unwrap()
}

#[test]
fn test_selection_never_exceeds_budget() {
    for seed in 0..20 {
        let catalogue = generated_catalogue(seed, 9);
        let budget = Decimal::from(40 + seed as i64 * 7);

        for strategy in STRATEGIES {
            let summary = run(strategy, &catalogue, budget);
            assert!(
                summary.total_cost <= budget,
                "{strategy} overspent with seed {seed}: {} > {budget}",
                summary.total_cost
            );
            assert!(summary.final_balance >= Decimal::ZERO);
            selector::verify(&summary).unwrap();
        }
    }
}

#[test]
fn test_every_reachable_state_keeps_budget_and_benefit() {
    for seed in 0..6 {
        let catalogue = generated_catalogue(seed, 7);
        let items = catalogue.items();
        let budget = Decimal::from(110);

        let mut visited = 0usize;
        let mut best_reachable = Decimal::ZERO;
        let mut pending = vec![SearchState::root(budget)];
        while let Some(state) = pending.pop() {
            visited += 1;
            let spent: Decimal = state.selected().iter().map(|&p| items[p].price()).sum();
            let benefit: Decimal = state.selected().iter().map(|&p| items[p].benefit()).sum();
            assert!(state.balance() >= Decimal::ZERO, "seed {seed}: {:?}", state.selected());
            assert_eq!(state.balance(), budget - spent, "seed {seed}");
            assert_eq!(state.benefit(), benefit, "seed {seed}");
            best_reachable = best_reachable.max(state.benefit());

            // 每個子集只從其最大位置往後展開一次
            let from = state.selected().last().map_or(0, |&p| p + 1);
            for (position, item) in items.iter().enumerate().skip(from) {
                if state.can_afford(item) {
                    pending.push(state.extend(position, item));
                }
            }
        }

        let best = SearchEngine::new(Strategy::Exhaustive)
            .run(&catalogue, budget)
            .unwrap()
            .best;
        assert!(visited > 1, "seed {seed} reached only the root");
        assert_eq!(best.benefit(), best_reachable, "seed {seed}");
    }
}

#[test]
fn test_benefit_matches_selected_items() {
    for seed in 0..10 {
        let catalogue = generated_catalogue(seed, 8);
        let budget = Decimal::from(120);

        for strategy in STRATEGIES {
            let summary = run(strategy, &catalogue, budget);
            let benefit: Decimal = summary.items.iter().map(Item::benefit).sum();
            let cost: Decimal = summary.items.iter().map(Item::price).sum();
            assert_eq!(summary.total_benefit, benefit);
            assert_eq!(summary.total_cost, cost);
            assert_eq!(summary.count, summary.items.len());
        }
    }
}

#[test]
fn test_exhaustive_is_optimal_and_dominates_heuristics() {
    for seed in 0..15 {
        let catalogue = generated_catalogue(seed, 10);
        let budget = Decimal::from(90);
        let optimum = brute_force_best(&catalogue, budget);

        let exhaustive = run(Strategy::Exhaustive, &catalogue, budget);
        assert_eq!(exhaustive.total_benefit, optimum, "seed {seed}");

        for strategy in [Strategy::PrunedGreedy, Strategy::PrunedGreedyByPrice, Strategy::Greedy] {
            let heuristic = run(strategy, &catalogue, budget);
            assert!(
                heuristic.total_benefit <= optimum,
                "{strategy} beat the optimum with seed {seed}"
            );
        }
    }
}

#[test]
fn test_memoization_does_not_change_exhaustive_result() {
    for seed in 0..8 {
        let catalogue = generated_catalogue(seed, 7);
        let budget = Decimal::from(100);

        let with_memo = SearchEngine::new(Strategy::Exhaustive)
            .run(&catalogue, budget)
            .unwrap();
        let without_memo = SearchEngine::new(Strategy::Exhaustive)
            .without_memoization()
            .run(&catalogue, budget)
            .unwrap();
        let tiny_cache = SearchEngine::new(Strategy::Exhaustive)
            .with_cache_capacity(3)
            .run(&catalogue, budget)
            .unwrap();

        assert_eq!(with_memo.best, without_memo.best, "seed {seed}");
        assert_eq!(with_memo.best, tiny_cache.best, "seed {seed}");
        assert!(without_memo.statistics.states_expanded >= with_memo.statistics.states_expanded);
        assert_eq!(without_memo.statistics.cache.hits, 0);
    }
}

#[test]
fn test_search_is_deterministic() {
    let catalogue = generated_catalogue(42, 10);
    let budget = Decimal::from(150);

    for strategy in STRATEGIES {
        let first = run(strategy, &catalogue, budget);
        let second = run(strategy, &catalogue, budget);
        assert_eq!(first, second, "{strategy} is not deterministic");
    }
}

#[test]
fn test_budget_below_every_price_selects_nothing() {
    let catalogue = generated_catalogue(7, 8);
    let cheapest = catalogue.items().iter().map(Item::price).min().unwrap();
    let budget = cheapest - Decimal::new(1, 2);

    for strategy in STRATEGIES {
        let summary = run(strategy, &catalogue, budget);
        assert!(summary.items.is_empty(), "{strategy} bought something");
        assert_eq!(summary.final_balance, budget);
    }
}

#[test]
fn test_budget_covering_everything_buys_everything() {
    let catalogue = generated_catalogue(3, 8);
    let total: Decimal = catalogue.items().iter().map(Item::price).sum();

    for strategy in [Strategy::Exhaustive, Strategy::Greedy] {
        let summary = run(strategy, &catalogue, total);
        assert_eq!(summary.count, catalogue.len(), "{strategy}");
        assert_eq!(summary.final_balance, Decimal::ZERO);
    }
}

#[test]
fn test_empty_catalogue_selects_nothing() {
    for strategy in STRATEGIES {
        let summary = run(strategy, &Catalogue::default(), Decimal::from(500));
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_benefit, Decimal::ZERO);
    }
}

#[test]
fn test_reference_scenario() {
    let catalogue = Catalogue::new(vec![
        Item::new("A", Decimal::from(100), Decimal::from(10)),
        Item::new("B", Decimal::from(200), Decimal::from(8)),
        Item::new("C", Decimal::from(50), Decimal::from(20)),
    ]);

    let exhaustive = run(Strategy::Exhaustive, &catalogue, Decimal::from(250));
    let mut ids = exhaustive.ids();
    ids.sort_unstable();
    assert_eq!(ids, vec!["B", "C"]);
    assert_eq!(exhaustive.total_benefit, Decimal::from(26));
}
