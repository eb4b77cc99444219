use std::collections::HashMap;
use std::path::Path;

use fillet_rrt::{
    CollisionChecker, Cylinder, Fillet, FilletRrt, MapData, NodeId, PlannerConfig, PlannerError,
    Position, Scenario, StartPose,
};

fn p(n: f64, e: f64) -> Position {
    Position::new(n, e, -50.0)
}

fn start() -> StartPose {
    StartPose::new(p(0.0, 0.0), 0.0)
}

fn config(turn_radius: f64) -> PlannerConfig {
    PlannerConfig {
        turn_radius,
        clearance: 5.0,
        segment_length: 50.0,
        ..Default::default()
    }
}

/// One cylinder standing on the straight line from the start to the first waypoint
fn blocked_map() -> MapData {
    MapData::new(
        MapData::square_boundary(600.0),
        vec![p(400.0, 0.0), p(400.0, 300.0)],
        vec![Cylinder::new(200.0, 0.0, 40.0, 200.0)],
    )
}

fn node_positions(planner: &FilletRrt) -> Vec<Position> {
    planner.forest().nodes().map(|(_, node)| node.position()).collect()
}

#[test]
fn test_open_map_connects_directly() {
    let map = MapData::new(
        MapData::square_boundary(1000.0),
        vec![p(300.0, 0.0), p(300.0, 300.0)],
        vec![],
    );
    let mut planner = FilletRrt::new(&map, config(0.0), 3);
    let route = planner.solve(start(), false).unwrap();

    assert_eq!(route, vec![p(0.0, 0.0), p(300.0, 0.0), p(300.0, 300.0)]);
    // start plus one root per waypoint, nothing grown
    assert_eq!(planner.forest().len(), 3);
    assert_eq!(planner.route(), &route[..]);
}

#[test]
fn test_route_avoids_cylinder() {
    let map = blocked_map();
    let mut planner = FilletRrt::new(&map, config(10.0), 7);
    let route = planner.solve(start(), false).unwrap();

    assert!(route.len() > map.waypoints.len() + 1);
    assert_eq!(route.first(), Some(&p(0.0, 0.0)));
    assert_eq!(route.last(), Some(&p(400.0, 300.0)));
    assert!(route.contains(&p(400.0, 0.0)));

    let clearance = planner.config().clearance;
    for leg in route.windows(2) {
        assert!(planner.checker().check_line(&leg[0], &leg[1], clearance));
    }
}

#[test]
fn test_segments_hand_over_their_final_turn() {
    let map = blocked_map();
    let mut planner = FilletRrt::new(&map, config(10.0), 7);
    planner.solve(start(), false).unwrap();
    let forest = planner.forest();
    let radius = planner.config().turn_radius;

    for pair in forest.roots().windows(2) {
        let (root, destination) = (pair[0], pair[1]);
        let dest = forest.get(destination).unwrap();
        let connector = dest.parent().unwrap();
        assert_eq!(forest.min_connector(root), Some(connector));
        assert!(forest.get(connector).unwrap().connects_to_waypoint());
        assert!(forest.path_between(root, connector).is_some());

        match forest.get(connector).unwrap().parent() {
            Some(before) => {
                let expected = Fillet::calculate(
                    forest.position(before),
                    forest.position(connector),
                    forest.position(destination),
                    radius,
                );
                assert!(expected.is_some());
                assert_eq!(dest.fillet(), expected.as_ref());
            }
            None => assert!(dest.fillet().is_none()),
        }
    }

    // consecutive turns along the whole route leave room for each other
    let last = *forest.roots().last().unwrap();
    let chain = forest.path_between(forest.roots()[0], last).unwrap();
    assert_eq!(
        chain.iter().map(|&id| forest.position(id)).collect::<Vec<_>>(),
        planner.route()
    );
    let mut turns = 0;
    for pair in chain.windows(2) {
        let previous = forest.get(pair[0]).unwrap().fillet();
        let current = forest.get(pair[1]).unwrap().fillet();
        if let Some(fillet) = current {
            assert_eq!(fillet.w, forest.position(pair[0]));
            assert_eq!(fillet.w_next, forest.position(pair[1]));
        }
        if let (Some(previous), Some(current)) = (previous, current) {
            assert!(previous.room_for(current));
            turns += 1;
        }
    }
    assert!(turns > 0);
}

#[test]
fn test_unbounded_map_routes_around_cylinder() {
    let map = MapData::new(vec![], vec![p(400.0, 0.0)], vec![Cylinder::new(200.0, 0.0, 40.0, 200.0)]);
    let cfg = PlannerConfig {
        max_samples_per_segment: 5000,
        ..config(10.0)
    };
    let mut planner = FilletRrt::new(&map, cfg, 9);
    let route = planner.solve(start(), false).unwrap();

    assert!(route.len() > 2);
    assert_eq!(route.last(), Some(&p(400.0, 0.0)));
    for leg in route.windows(2) {
        assert!(planner.checker().check_line(&leg[0], &leg[1], 5.0));
    }
}

#[test]
fn test_same_seed_same_plan() {
    let map = blocked_map();
    let mut first = FilletRrt::new(&map, config(10.0), 11);
    let mut second = FilletRrt::new(&map, config(10.0), 11);

    let a = first.solve(start(), false).unwrap();
    let b = second.solve(start(), false).unwrap();
    assert_eq!(a, b);
    assert_eq!(node_positions(&first), node_positions(&second));
}

#[test]
fn test_reseed_reproduces_plan() {
    let map = blocked_map();
    let mut planner = FilletRrt::new(&map, config(10.0), 5);
    let a = planner.solve(start(), false).unwrap();
    let nodes_a = node_positions(&planner);

    planner.new_seed(5);
    let b = planner.solve(start(), false).unwrap();
    assert_eq!(a, b);
    assert_eq!(nodes_a, node_positions(&planner));
}

#[test]
fn test_forest_stays_a_forest() {
    let map = blocked_map();
    let cfg = PlannerConfig {
        num_paths: 2,
        ..config(10.0)
    };
    let mut planner = FilletRrt::new(&map, cfg, 21);
    planner.solve(start(), false).unwrap();
    let forest = planner.forest();

    assert_eq!(forest.roots().len(), map.waypoints.len() + 1);

    let mut listed: HashMap<NodeId, usize> = HashMap::new();
    for (id, node) in forest.nodes() {
        for &child in node.children() {
            *listed.entry(child).or_insert(0) += 1;
            assert_eq!(forest.get(child).unwrap().parent(), Some(id));
        }
    }

    for (id, node) in forest.nodes() {
        let is_root = forest.roots().contains(&id);
        match node.parent() {
            Some(parent) => {
                assert_eq!(listed.get(&id), Some(&1));
                if !is_root {
                    assert!(node.cost() >= forest.get(parent).unwrap().cost());
                }
            }
            None => {
                assert!(is_root);
                assert_eq!(listed.get(&id), None);
            }
        }

        // every parent chain ends at the start root
        let mut current = id;
        let mut steps = 0;
        while let Some(parent) = forest.get(current).unwrap().parent() {
            current = parent;
            steps += 1;
            assert!(steps <= forest.len());
        }
        assert_eq!(current, forest.roots()[0]);
    }
}

#[test]
fn test_enclosed_waypoint_exhausts_budget() {
    let map = MapData::new(
        MapData::square_boundary(600.0),
        vec![p(400.0, 0.0)],
        vec![Cylinder::new(400.0, 0.0, 30.0, 200.0)],
    );
    let cfg = PlannerConfig {
        max_samples_per_segment: 200,
        ..config(10.0)
    };
    let mut planner = FilletRrt::new(&map, cfg, 1);
    let err = planner.solve(start(), false).unwrap_err();
    assert!(matches!(
        err,
        PlannerError::InfeasibleSegment {
            segment: 0,
            samples: 200
        }
    ));
    assert!(planner.route().is_empty());
}

#[test]
fn test_invalid_config_is_rejected_before_planning() {
    let map = blocked_map();
    let cfg = PlannerConfig {
        num_paths: 0,
        ..config(10.0)
    };
    let mut planner = FilletRrt::new(&map, cfg, 1);
    let err = planner.solve(start(), false).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidParameter(_)));
    assert!(planner.forest().is_empty());
}

#[test]
fn test_new_map_replaces_waypoints() {
    let mut planner = FilletRrt::new(&blocked_map(), config(0.0), 2);
    let open = MapData::new(MapData::square_boundary(1000.0), vec![p(0.0, 250.0)], vec![]);
    planner.new_map(&open);

    let route = planner.solve(start(), false).unwrap();
    assert_eq!(route, vec![p(0.0, 0.0), p(0.0, 250.0)]);
}

#[test]
fn test_sample_scenario_solves() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/scenario.toml");
    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.map.waypoints.len(), 3);

    let mut planner = FilletRrt::new(&scenario.map, scenario.planner.clone(), scenario.seed);
    let route = planner.solve(scenario.start, scenario.direct_hit).unwrap();
    assert_eq!(route.first(), Some(&scenario.start.position));
    assert_eq!(route.last(), scenario.map.waypoints.last());
    for wp in &scenario.map.waypoints {
        assert!(route.contains(wp));
    }
}
