use itertools::Itertools;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::col::{map_new, HashMap};
use crate::config::HighwayConfig;
use crate::highway::Highway;
use crate::planner::{plan_trip, Route};
use crate::primitives::{Autonomy, Position};

/// Parameters of one randomized run.
#[derive(Debug, Clone, Copy)]
pub struct SamplePlan {
    /// Stations are placed at positions `0..num_positions`.
    pub num_positions: Position,
    /// Vehicle ranges are drawn from `0..max_range`.
    pub max_range: Autonomy,
    /// Number of random operations per run.
    pub steps: usize,
}

impl Default for SamplePlan {
    fn default() -> Self {
        Self {
            num_positions: 300,
            max_range: 60,
            steps: 20_000,
        }
    }
}

/// Fewest hops from `start` to `end`, found by relaxing every pair of stations in between.
fn min_hops(model: &HashMap<Position, Vec<Autonomy>>, start: Position, end: Position) -> Option<usize> {
    if !model.contains_key(&start) || !model.contains_key(&end) {
        return None;
    }
    let forward = end > start;
    let mut stations = model
        .keys()
        .copied()
        .filter(|it| (start.min(end)..=start.max(end)).contains(it))
        .sorted()
        .collect_vec();
    if !forward {
        stations.reverse();
    }

    let mut hops: Vec<Option<usize>> = vec![None; stations.len()];
    hops[0] = Some(0);
    for j in 1..stations.len() {
        let best = (0..j)
            .filter_map(|i| {
                let range = model[&stations[i]].iter().copied().max().unwrap_or(0);
                let gap = stations[i].abs_diff(stations[j]);
                hops[i].filter(|_| gap <= range).map(|it| it + 1)
            })
            .min();
        hops[j] = best;
    }
    *hops.last().unwrap()
}

fn assert_valid_route(
    model: &HashMap<Position, Vec<Autonomy>>,
    route: &Route,
    start: Position,
    end: Position,
) {
    let stations = route.stations();
    assert_eq!(stations.first(), Some(&start));
    assert_eq!(stations.last(), Some(&end));
    for (&from, &to) in stations.iter().tuple_windows() {
        assert_eq!(to > from, end > start, "route {} turns around", route);
        let range = model[&from].iter().copied().max().unwrap_or(0);
        assert!(
            from.abs_diff(to) <= range,
            "hop {} -> {} of route {} exceeds range {}",
            from,
            to,
            route,
            range
        );
    }
}

/// Applies random operations to a highway and to a plain map of fleets, checking that both
/// agree after every step.
pub fn run(seed: u64, plan: SamplePlan, config: HighwayConfig) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut highway = Highway::new(config);
    let mut model: HashMap<Position, Vec<Autonomy>> = map_new();
    let mut num_routes = 0;

    for step in 0..plan.steps {
        let position = rng.gen_range(0..plan.num_positions);
        let range = rng.gen_range(0..plan.max_range);

        match rng.gen_range(0..10) {
            0..=2 => {
                let ranges = (0..rng.gen_range(0..4))
                    .map(|_| rng.gen_range(0..plan.max_range))
                    .collect_vec();
                let added = highway.add_station(position, ranges.iter().copied()).is_ok();
                assert_eq!(added, !model.contains_key(&position), "step {}", step);
                model.entry(position).or_insert(ranges);
            }
            3..=4 => {
                let removed = highway.remove_station(position).is_ok();
                assert_eq!(removed, model.remove(&position).is_some(), "step {}", step);
            }
            5..=6 => {
                let added = highway.add_vehicle(position, range).is_ok();
                match model.get_mut(&position) {
                    Some(fleet) => {
                        assert!(added, "step {}", step);
                        fleet.push(range);
                    }
                    None => assert!(!added, "step {}", step),
                }
            }
            7..=8 => {
                let removed = highway.remove_vehicle(position, range).is_ok();
                let expected = match model.get_mut(&position) {
                    Some(fleet) => match fleet.iter().position(|&it| it == range) {
                        Some(idx) => {
                            fleet.swap_remove(idx);
                            true
                        }
                        None => false,
                    },
                    None => false,
                };
                assert_eq!(removed, expected, "step {}", step);
            }
            _ => {
                // Prefer existing stations so that most queries are meaningful.
                let live = model.keys().copied().sorted().collect_vec();
                let (start, end) = if live.len() >= 2 && rng.gen_bool(0.9) {
                    (
                        live[rng.gen_range(0..live.len())],
                        live[rng.gen_range(0..live.len())],
                    )
                } else {
                    (position, rng.gen_range(0..plan.num_positions))
                };

                let route = plan_trip(&highway, start, end);
                assert_eq!(
                    route.as_ref().map(|it| it.hops()),
                    min_hops(&model, start, end),
                    "step {}: trip {} -> {}",
                    step,
                    start,
                    end
                );
                if let Some(route) = route {
                    assert_valid_route(&model, &route, start, end);
                    num_routes += 1;
                }
            }
        }

        highway.assert_invariants();
        assert_eq!(highway.len(), model.len());
        for (&position, ranges) in &model {
            let fleet = highway.fleet(position).unwrap();
            assert_eq!(
                fleet.iter().sorted().collect_vec(),
                ranges.iter().copied().sorted().collect_vec(),
                "step {}: fleet of station {}",
                step,
                position
            );
        }
    }

    debug!("Final state:\n{}", highway.describe());
    info!(
        "Seed {}: {} steps, {} live stations, {} routes found, index capacity {}",
        seed,
        plan.steps,
        highway.len(),
        num_routes,
        highway.index().capacity()
    );
}

pub fn run_samples(seeds: std::ops::Range<u64>, plan: SamplePlan, config: HighwayConfig) {
    for seed in seeds {
        info!("Seed: {}", seed);
        run(seed, plan, config);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{HighwayConfig, IndexConfig};

    use super::*;

    #[test]
    fn test_random_samples() {
        run_samples(
            0..3,
            SamplePlan {
                steps: 3_000,
                ..SamplePlan::default()
            },
            HighwayConfig::default(),
        );
    }

    #[test]
    fn test_random_samples_dense_positions() {
        // Few positions make duplicate stations and vehicles frequent.
        let plan = SamplePlan {
            num_positions: 20,
            max_range: 8,
            steps: 3_000,
        };
        run(7, plan, HighwayConfig::default());
    }

    #[test]
    fn test_random_samples_small_index() {
        let config = HighwayConfig {
            index: IndexConfig {
                min_capacity: 2,
                resize_bits: 1,
                load_factor_percent: 100,
            },
            station_capacity: 1,
        };
        run(
            11,
            SamplePlan {
                steps: 3_000,
                ..SamplePlan::default()
            },
            config,
        );
    }

    #[test]
    fn test_min_hops() {
        let mut model: HashMap<Position, Vec<Autonomy>> = map_new();
        model.insert(1, vec![1]);
        model.insert(2, vec![1]);
        model.insert(3, vec![]);
        assert_eq!(min_hops(&model, 1, 3), Some(2));
        assert_eq!(min_hops(&model, 3, 1), None);
        assert_eq!(min_hops(&model, 2, 2), Some(0));
        assert_eq!(min_hops(&model, 1, 4), None);
    }
}
