use commnet::{
    CommNetConfig, CommNetwork, CommandKind, FlightControl, ManualClock, NetworkGraph, Node,
    NodeId, Position, QueueEvent, SimTime,
};
use log::info;
use std::sync::{mpsc, Arc};

const LIGHT_SPEED: f64 = 299_792_458.0;
const ANTENNA_RANGE: f64 = 5.0e8;

/// Flight computer that just reports what it was told to do
struct ConsolePilot;

impl FlightControl for ConsolePilot {
    fn trigger_action_group(&mut self, owner: &NodeId, group: &str) -> bool {
        info!("[{}] action group {}", owner, group);
        true
    }

    fn fire_event(&mut self, owner: &NodeId, part: &str, event: &str) -> bool {
        info!("[{}] {} -> {}", owner, part, event);
        true
    }

    fn set_target(&mut self, owner: &NodeId, target: Option<&str>) -> bool {
        info!("[{}] target {:?}", owner, target);
        true
    }

    fn burn(&mut self, owner: &NodeId, throttle: f64, duration: SimTime) -> bool {
        info!("[{}] burn at {:.0}% for {}s", owner, throttle * 100.0, duration);
        true
    }
}

/// Direct light time to the closest linked ground station
fn direct_delay(graph: &NetworkGraph, owner: &NodeId) -> Option<SimTime> {
    let vessel = graph.node(owner)?;
    graph
        .neighbors(owner)
        .iter()
        .filter_map(|id| graph.node(id))
        .filter(|node| node.kind == commnet::NodeKind::GroundStation)
        .map(|station| station.position.distance_to(&vessel.position) / LIGHT_SPEED)
        .min_by(|a, b| a.total_cmp(b))
}

fn main() {
    env_logger::init();

    let clock = Arc::new(ManualClock::new(0.0));
    let config = CommNetConfig::new().with_sweep_period(10);
    let link = |a: &Node, b: &Node| a.position.distance_to(&b.position) <= ANTENNA_RANGE;
    let mut net = match CommNetwork::new(config, link, direct_delay, clock.clone()) {
        Ok(net) => net,
        Err(err) => {
            eprintln!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let (tx, rx) = mpsc::channel::<QueueEvent>();
    net.queue_mut().add_observer(Box::new(tx));

    let scanner = net.scanner_mut();
    let nodes = [
        Node::ground_station("KSC", Position::new(0.0, 0.0, 0.0)),
        Node::vessel("Mun Probe", Position::new(1.2e7, 0.0, 0.0)),
        Node::vessel("Duna Probe", Position::new(2.0e8, 1.0e8, 0.0)),
        Node::vessel("Lost Probe", Position::new(9.0e9, 0.0, 0.0)),
    ];
    for node in nodes {
        if let Err(err) = scanner.add_node(node) {
            eprintln!("{}", err);
        }
    }

    let mut pilot = ConsolePilot;
    for _ in 0..10 {
        net.step(&mut pilot);
        clock.advance(0.02);
    }

    let orders = [
        ("Mun Probe", CommandKind::ActionGroup { group: "Deploy Solar".into() }),
        ("Duna Probe", CommandKind::Burn { throttle: 0.6, duration: 42.0 }),
        ("Lost Probe", CommandKind::Target { target: Some("Eeloo".into()) }),
    ];
    for (owner, kind) in orders {
        match net.submit(&NodeId::from(owner), kind, 0, 0.0) {
            Ok(id) => info!("{}", net.queue().describe(&id).unwrap_or_default()),
            Err(err) => info!("{}", err),
        }
    }

    while !net.queue().is_empty() {
        clock.advance(0.1);
        net.step(&mut pilot);
    }

    for event in rx.try_iter() {
        if let QueueEvent::Executed { id, succeeded } = event {
            info!("command {} finished (succeeded: {})", id, succeeded);
        }
    }
}
