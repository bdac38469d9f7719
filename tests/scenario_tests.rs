use proptest::prelude::*;
use queuesim::queueing::runner::run_with_observers;
use queuesim::{
    run_batch, run_scenario, run_scenario_detailed, BatchConfig, ConcurrencyMode, ResourcePool,
    ScenarioConfig, ScenarioResult, SimTime, SimulationObserver,
};
use std::sync::{Arc, Mutex};

/// Tracks pool occupancy and clock movement over a whole run
#[derive(Default)]
struct Watch {
    max_held: usize,
    capacity: usize,
    last_time: f64,
    went_backwards: bool,
}

struct WatchObserver(Arc<Mutex<Watch>>);

impl SimulationObserver for WatchObserver {
    fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        let mut watch = self.0.lock().unwrap();
        if new_time.as_f64() < old_time.as_f64() || old_time.as_f64() < watch.last_time {
            watch.went_backwards = true;
        }
        watch.last_time = new_time.as_f64();
    }

    fn on_step_complete(&mut self, _time: SimTime, _events: usize, pools: &[ResourcePool]) {
        let mut watch = self.0.lock().unwrap();
        for pool in pools {
            watch.max_held = watch.max_held.max(pool.held());
            watch.capacity = pool.capacity();
        }
    }
}

fn base() -> ScenarioConfig {
    ScenarioConfig::default()
}

fn assert_result_bounds(result: &ScenarioResult) {
    assert!(result.total_arrivals >= result.total_served, "{:?}", result);
    assert!(result.total_served >= result.customers_completed, "{:?}", result);
    assert!((0.0..=100.0).contains(&result.served_percentage), "{:?}", result);
    assert!((0.0..=100.0).contains(&result.utilization), "{:?}", result);
    assert!(result.avg_wait >= 0.0);
    assert!(result.avg_queue_length >= 0.0);
    assert!(result.throughput >= 0.0);
}

#[test]
fn test_base_case_is_reproducible() {
    let first = run_scenario_detailed(&base()).unwrap();
    for _ in 0..3 {
        let again = run_scenario_detailed(&base()).unwrap();
        assert_eq!(again, first, "same config and seed must give the same run");
    }
    assert!(first.result.total_arrivals > 0);
    assert!(first.result.total_arrivals >= first.result.total_served);
}

#[test]
fn test_reference_batch_results_are_bounded() {
    for config in ScenarioConfig::reference_batch() {
        let result = run_scenario(&config).unwrap();
        assert_eq!(result.label, config.label);
        assert_eq!(result.server_count, config.server_count);
        assert_result_bounds(&result);
    }
}

#[test]
fn test_held_never_exceeds_capacity() {
    for config in ScenarioConfig::reference_batch() {
        let watch = Arc::new(Mutex::new(Watch::default()));
        run_with_observers(&config, vec![Box::new(WatchObserver(Arc::clone(&watch)))]).unwrap();

        let watch = watch.lock().unwrap();
        assert_eq!(watch.capacity, config.server_count);
        assert!(watch.max_held <= watch.capacity);
        assert!(watch.max_held > 0, "some customer must have been served");
        assert!(!watch.went_backwards, "clock must never move backwards");
        assert_eq!(watch.last_time, config.horizon);
    }
}

#[test]
fn test_customer_trace_is_fifo_and_consistent() {
    for config in ScenarioConfig::reference_batch() {
        let run = run_scenario_detailed(&config).unwrap();
        let customers = &run.customers;

        for (index, customer) in customers.iter().enumerate() {
            assert_eq!(customer.id, index as u64 + 1, "ids follow arrival order");
            assert!(customer.arrival < config.horizon);
        }
        assert!(customers.windows(2).all(|w| w[0].arrival <= w[1].arrival));

        // Served customers are exactly a prefix of arrivals, granted in arrival order
        let served: Vec<_> = customers.iter().take_while(|c| c.is_served()).collect();
        assert_eq!(served.len() as u64, run.result.total_served);
        assert!(customers[served.len()..].iter().all(|c| !c.is_served()));
        assert!(served.windows(2).all(|w| w[0].grant_time() <= w[1].grant_time()));

        for customer in &served {
            let wait = customer.wait.unwrap();
            assert!(wait >= 0.0);
            let grant = customer.grant_time().unwrap();
            assert!(grant < config.horizon);
            if let Some(departure) = customer.departure {
                let service = customer.service.unwrap();
                assert!((departure - grant - service).abs() < 1e-9);
                assert!(departure < config.horizon);
            }
        }
    }
}

#[test]
fn test_single_cashier_serves_one_at_a_time() {
    let run = run_scenario_detailed(&base()).unwrap();
    let served: Vec<_> = run.customers.iter().filter(|c| c.is_served()).collect();
    for pair in served.windows(2) {
        if let Some(previous_departure) = pair[0].departure {
            let next_grant = pair[1].grant_time().unwrap();
            assert!(next_grant >= previous_departure - 1e-9);
        }
    }
}

#[test]
fn test_more_cashiers_never_increase_wait() {
    let pairs = [
        (base(), base().with_server_count(2)),
        (
            base().with_mean_interarrival(2.0),
            base().with_mean_interarrival(2.0).with_server_count(2),
        ),
    ];
    for (one, two) in pairs.iter() {
        let one = run_scenario(one).unwrap();
        let two = run_scenario(two).unwrap();
        assert!(two.avg_wait <= one.avg_wait, "{} vs {}", two.avg_wait, one.avg_wait);
    }

    for seed in 1..=5 {
        let one = run_scenario(&base().with_seed(seed).with_horizon(480.0)).unwrap();
        let two = run_scenario(&base().with_seed(seed).with_horizon(480.0).with_server_count(2)).unwrap();
        assert!(two.avg_wait <= one.avg_wait, "seed {}: {} vs {}", seed, two.avg_wait, one.avg_wait);
    }
}

#[test]
fn test_higher_load_never_decreases_wait() {
    for servers in [1, 2] {
        let calm = run_scenario(&base().with_server_count(servers)).unwrap();
        let peak = run_scenario(&base().with_server_count(servers).with_mean_interarrival(2.0)).unwrap();
        assert!(
            peak.avg_wait >= calm.avg_wait,
            "{} server(s): peak {} vs calm {}",
            servers,
            peak.avg_wait,
            calm.avg_wait
        );
        assert!(peak.total_arrivals >= calm.total_arrivals);
    }
}

#[test]
fn test_zero_horizon_edge_case() {
    let result = run_scenario(&base().with_horizon(0.0)).unwrap();
    assert_eq!(result.total_arrivals, 0);
    assert_eq!(result.total_served, 0);
    assert_eq!(result.avg_wait, 0.0);
    assert_eq!(result.avg_queue_length, 0.0);
    assert_eq!(result.utilization, 0.0);
    assert_eq!(result.served_percentage, 0.0);
}

#[test]
fn test_bad_configuration_is_rejected() {
    let bad = [
        base().with_server_count(0),
        base().with_mean_interarrival(0.0),
        base().with_mean_service(-1.0),
        base().with_horizon(-120.0),
    ];
    for config in bad.iter() {
        assert!(run_scenario(config).unwrap_err().is_configuration());
    }
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let scenarios = ScenarioConfig::reference_batch();
    let sequential = run_batch(&scenarios, &BatchConfig::new());
    let parallel = run_batch(
        &scenarios,
        &BatchConfig::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(2),
    );
    assert_eq!(sequential, parallel);

    // Order of execution does not leak state between runs
    let mut reversed: Vec<_> = scenarios.iter().rev().cloned().collect();
    let mut reversed_results = run_batch(&reversed, &BatchConfig::new());
    reversed.reverse();
    reversed_results.reverse();
    assert_eq!(reversed_results, sequential);
}

#[test]
fn test_run_serializes_for_reporting() {
    let run = run_scenario_detailed(&base().with_horizon(30.0)).unwrap();
    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["result"]["label"], "Base Case");
    assert_eq!(
        json["customers"].as_array().unwrap().len() as u64,
        run.result.total_arrivals
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_any_valid_scenario_respects_invariants(
        servers in 1usize..5,
        mean_interarrival in 0.5f64..6.0,
        mean_service in 0.5f64..8.0,
        horizon in 0.0f64..200.0,
        seed in any::<u64>(),
    ) {
        let config = ScenarioConfig::new("prop")
            .with_server_count(servers)
            .with_mean_interarrival(mean_interarrival)
            .with_mean_service(mean_service)
            .with_horizon(horizon)
            .with_seed(seed);

        let run = run_scenario_detailed(&config).unwrap();
        let result = &run.result;
        prop_assert!(result.total_arrivals >= result.total_served);
        prop_assert!(result.total_served >= result.customers_completed);
        prop_assert!((0.0..=100.0).contains(&result.served_percentage));
        prop_assert!((0.0..=100.0).contains(&result.utilization));
        prop_assert!(run.stats.busy_servers_at_horizon <= servers);
        prop_assert!(run.customers.iter().all(|c| c.wait.map_or(true, |w| w >= 0.0)));

        let again = run_scenario_detailed(&config).unwrap();
        prop_assert_eq!(again, run);
    }
}
