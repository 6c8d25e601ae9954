// Sweep coverage properties of the connectivity scanner
use crate::core::execution::config::{CommNetConfig, ConcurrencyMode};
use crate::core::network::{ConnectionEvent, ConnectivityScanner};
use crate::core::types::{Node, NodeId, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

type PairLog = Arc<Mutex<Vec<(NodeId, NodeId)>>>;

fn recording_scanner(count: usize, sweep_period: usize) -> (ConnectivityScanner, PairLog) {
    let log: PairLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let config = CommNetConfig::new().with_sweep_period(sweep_period);
    let mut scanner = ConnectivityScanner::new(&config, move |a: &Node, b: &Node| {
        sink.lock().unwrap().push((a.id.clone(), b.id.clone()));
        true
    })
    .unwrap();
    for i in 0..count {
        scanner
            .add_node(Node::vessel(format!("V{:03}", i), Position::new(i as f64, 1.0, 0.0)))
            .unwrap();
    }
    (scanner, log)
}

fn unordered(a: &NodeId, b: &NodeId) -> (NodeId, NodeId) {
    if a < b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[test]
fn test_one_period_judges_every_pair() {
    for &(count, period) in &[(47, 50), (50, 50), (123, 50), (7, 3), (1, 50)] {
        let (mut scanner, log) = recording_scanner(count, period);
        let mut rows = 0;
        for _ in 0..period {
            rows += scanner.tick().rows_visited;
        }
        assert_eq!(rows, count, "rows visited for N={} R={}", count, period);

        let seen: HashSet<(NodeId, NodeId)> = log
            .lock()
            .unwrap()
            .iter()
            .map(|(a, b)| unordered(a, b))
            .collect();
        assert_eq!(seen.len(), count * (count - 1) / 2, "pairs for N={} R={}", count, period);
    }
}

#[test]
fn test_47_nodes_over_50_steps() {
    let (mut scanner, _log) = recording_scanner(47, 50);
    let rows: Vec<usize> = (0..50).map(|_| scanner.tick().rows_visited).collect();
    assert!(rows.iter().all(|&r| r == 0 || r == 1));
    assert_eq!(rows.iter().filter(|&&r| r == 1).count(), 47);
}

#[test]
fn test_sweep_is_continuous_across_periods() {
    // Any window of R consecutive ticks covers all rows, not just aligned ones
    let (mut scanner, log) = recording_scanner(9, 4);
    for _ in 0..3 {
        scanner.tick();
    }
    log.lock().unwrap().clear();

    let mut rows = 0;
    for _ in 0..4 {
        rows += scanner.tick().rows_visited;
    }
    assert_eq!(rows, 9);
    let seen: HashSet<(NodeId, NodeId)> = log
        .lock()
        .unwrap()
        .iter()
        .map(|(a, b)| unordered(a, b))
        .collect();
    assert_eq!(seen.len(), 36);
}

#[test]
fn test_identical_positions_never_connected() {
    let config = CommNetConfig::new().with_sweep_period(1);
    let mut scanner = ConnectivityScanner::new(&config, |_: &Node, _: &Node| true).unwrap();
    let here = Position::new(600_000.0, 0.0, 0.0);
    scanner.add_node(Node::vessel("twin-a", here)).unwrap();
    scanner.add_node(Node::vessel("twin-b", here)).unwrap();
    scanner.add_node(Node::ground_station("KSC", Position::default())).unwrap();

    scanner.tick();
    assert!(!scanner.is_connected(&"twin-a".into(), &"twin-b".into()));
    assert!(scanner.is_connected(&"twin-a".into(), &"KSC".into()));

    // Moving apart lets the next sweep link them
    scanner
        .update_position(&"twin-b".into(), Position::new(600_010.0, 0.0, 0.0))
        .unwrap();
    scanner.tick();
    assert!(scanner.is_connected(&"twin-a".into(), &"twin-b".into()));

    // Converging drops the edge again
    scanner.update_position(&"twin-b".into(), here).unwrap();
    scanner.tick();
    assert!(!scanner.is_connected(&"twin-a".into(), &"twin-b".into()));
}

#[test]
fn test_moving_onto_a_linked_node_disconnects_mid_sweep() {
    let (mut scanner, _log) = recording_scanner(10, 50);
    let (tx, rx) = std::sync::mpsc::channel::<ConnectionEvent>();
    scanner.add_observer(Box::new(tx));
    assert_eq!(scanner.sweep_period(), 50);

    scanner.full_sweep();
    for _ in 0..20 {
        scanner.tick();
    }
    assert!(scanner.is_connected(&"V000".into(), &"V001".into()));
    let _ = rx.try_iter().count();

    let v000 = scanner.graph().node(&"V000".into()).unwrap().position;
    scanner.update_position(&"V001".into(), v000).unwrap();
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![ConnectionEvent::Disconnected("V001".into(), "V000".into())]
    );

    for _ in 0..30 {
        assert!(!scanner.is_connected(&"V000".into(), &"V001".into()));
        scanner.tick();
    }
    assert!(!scanner.is_connected(&"V000".into(), &"V001".into()));
    assert!(scanner.is_connected(&"V001".into(), &"V002".into()));
}

#[test]
fn test_predicate_result_tracks_changes() {
    let allowed = Arc::new(Mutex::new(true));
    let gate = Arc::clone(&allowed);
    let config = CommNetConfig::new().with_sweep_period(2);
    let mut scanner =
        ConnectivityScanner::new(&config, move |_: &Node, _: &Node| *gate.lock().unwrap()).unwrap();
    scanner.add_node(Node::vessel("A", Position::new(0.0, 0.0, 0.0))).unwrap();
    scanner.add_node(Node::vessel("B", Position::new(1.0, 0.0, 0.0))).unwrap();

    scanner.tick();
    assert!(scanner.is_connected(&"A".into(), &"B".into()));

    *allowed.lock().unwrap() = false;
    // Stale until the sweep returns to row 0
    scanner.tick();
    assert!(scanner.is_connected(&"A".into(), &"B".into()));
    scanner.tick();
    assert!(!scanner.is_connected(&"A".into(), &"B".into()));
}

#[test]
fn test_removal_mid_sweep_keeps_full_coverage() {
    let (mut scanner, log) = recording_scanner(20, 5);
    scanner.tick();
    scanner.tick();
    scanner.remove_node(&"V001".into()).unwrap();
    scanner.remove_node(&"V015".into()).unwrap();
    log.lock().unwrap().clear();

    let mut rows = 0;
    for _ in 0..5 {
        rows += scanner.tick().rows_visited;
    }
    assert_eq!(rows, 18);
    let seen: HashSet<(NodeId, NodeId)> = log
        .lock()
        .unwrap()
        .iter()
        .map(|(a, b)| unordered(a, b))
        .collect();
    assert_eq!(seen.len(), 18 * 17 / 2);
    let removed = [NodeId::from("V001"), NodeId::from("V015")];
    assert!(!seen
        .iter()
        .any(|(a, b)| removed.contains(a) || removed.contains(b)));
}

#[test]
fn test_shrinking_below_cursor_rewraps() {
    let (mut scanner, _log) = recording_scanner(10, 10);
    for _ in 0..8 {
        scanner.tick();
    }
    assert_eq!(scanner.cursor(), 8);
    for i in 2..10 {
        scanner.remove_node(&NodeId::new(format!("V{:03}", i))).unwrap();
    }
    scanner.tick();
    assert!(scanner.cursor() < 2);
    assert!(scanner.is_connected(&"V000".into(), &"V001".into()));
}

#[test]
fn test_seeded_churn_never_panics_and_settles() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = CommNetConfig::new().with_sweep_period(7);
    let mut scanner = ConnectivityScanner::new(&config, |a: &Node, b: &Node| {
        a.position.distance_to(&b.position) < 50.0
    })
    .unwrap();

    let mut next_id = 0;
    let mut live: Vec<NodeId> = Vec::new();
    for _ in 0..500 {
        match rng.gen_range(0..4) {
            0 | 1 => {
                let id = NodeId::new(format!("C{}", next_id));
                next_id += 1;
                let position = Position::new(rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0), 0.0);
                scanner.add_node(Node::vessel(id.as_str(), position)).unwrap();
                live.push(id);
            }
            2 if !live.is_empty() => {
                let victim = live.swap_remove(rng.gen_range(0..live.len()));
                scanner.remove_node(&victim).unwrap();
            }
            _ => {}
        }
        scanner.tick();
    }

    // A quiet period brings every edge in line with the predicate
    for _ in 0..7 {
        scanner.tick();
    }
    let graph = scanner.graph();
    for a in graph.nodes() {
        for b in graph.nodes() {
            let expected = a.id != b.id
                && !a.position.same_as(&b.position)
                && a.position.distance_to(&b.position) < 50.0;
            assert_eq!(graph.is_connected(&a.id, &b.id), expected);
        }
    }
}

#[test]
fn test_rayon_mode_matches_sequential() {
    let link = |a: &Node, b: &Node| a.position.distance_to(&b.position) < 30.0;
    let positions: Vec<Position> = (0..40)
        .map(|i| Position::new((i * 7 % 100) as f64, (i * 13 % 100) as f64, 0.0))
        .collect();

    let build = |config: CommNetConfig| {
        let mut scanner = ConnectivityScanner::new(&config, link).unwrap();
        for (i, position) in positions.iter().enumerate() {
            scanner.add_node(Node::vessel(format!("R{}", i), *position)).unwrap();
        }
        for _ in 0..config.sweep_period {
            scanner.tick();
        }
        scanner
    };

    let sequential = build(CommNetConfig::new().with_sweep_period(6));
    let parallel = build(
        CommNetConfig::new()
            .with_sweep_period(6)
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(2),
    );

    assert_eq!(sequential.graph().edge_count(), parallel.graph().edge_count());
    for node in sequential.graph().nodes() {
        assert_eq!(
            sequential.graph().neighbors(&node.id),
            parallel.graph().neighbors(&node.id)
        );
    }
}
