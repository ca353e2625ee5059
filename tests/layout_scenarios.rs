use std::collections::HashSet;
use std::time::Duration;

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use genealogy_graph::GraphIntegrityError;
use genealogy_graph::genealogy::{GenealogyEdge, GenealogyNode, Graph, NodeId, Notables, parse_graph};
use genealogy_graph::layout::geometry::{distance, distance_to_line};
use genealogy_graph::layout::{Simulation, SimulationConfig};
use genealogy_graph::view::{
    DragController, Gesture, ViewportConfig, ViewportController, ViewportTransform,
};
use serde_json::json;

const MAX_TICKS: usize = 10_000;

fn person(id: NodeId) -> GenealogyNode {
    GenealogyNode {
        id,
        name: format!("Mathematician {id}"),
        dissertations: None,
        students: None,
        numberofdescendents: 0,
    }
}

fn graph(base: NodeId, ids: &[NodeId], links: &[(NodeId, NodeId)]) -> Graph {
    Graph {
        base,
        generations_up: 1,
        generations_down: 2,
        number_of_nodes: ids.len(),
        number_of_edges: links.len(),
        nodes: ids.iter().copied().map(person).collect(),
        edges: links
            .iter()
            .map(|&(from, to)| GenealogyEdge {
                from_node_id: from,
                to_node_id: to,
            })
            .collect(),
    }
}

/// A few generations around node 1, with two advisors sharing students and
/// one student listed twice under the same advisor.
fn family() -> Graph {
    let ids = (1..=24).collect::<Vec<_>>();
    let mut links = Vec::new();
    for child in 2..=6 {
        links.push((1, child));
    }
    for child in 7..=14 {
        links.push((2 + (child % 3), child));
    }
    for child in 15..=24 {
        links.push((7 + (child % 4), child));
    }
    links.push((3, 9));
    links.push((8, 20));
    links.push((8, 20));
    graph(1, &ids, &links)
}

fn simulation(graph: &Graph) -> Simulation {
    Simulation::new(graph, &Notables::default(), &SimulationConfig::default())
        .expect("valid graph")
}

fn viewport() -> ViewportController {
    ViewportController::new(
        ViewportConfig::default(),
        Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1024.0, 768.0)),
    )
}

#[test]
fn settled_layout_has_no_overlapping_nodes() {
    let graph = family();
    let mut sim = simulation(&graph);
    sim.run_until_settled(MAX_TICKS);
    assert!(sim.is_settled());

    let nodes = sim.nodes();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            let gap = distance(a.position, b.position);
            assert!(
                gap >= a.radius + b.radius - 0.5,
                "nodes {} and {} overlap: {gap}",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn pinned_node_matches_pin_every_tick() {
    let graph = family();
    let mut sim = simulation(&graph);
    let pin = vec2(-35.5, 12.25);
    assert!(sim.pin(9, pin));

    for _ in 0..200 {
        sim.tick();
        assert_eq!(sim.position(9), Some(pin));
    }

    sim.unpin(9);
    for _ in 0..20 {
        sim.tick();
    }
    assert_ne!(sim.position(9), Some(pin));
}

#[test]
fn settled_layout_is_a_fixed_point() {
    let graph = family();
    let mut sim = simulation(&graph);
    sim.run_until_settled(MAX_TICKS);
    let before = sim.nodes().iter().map(|n| n.position).collect::<Vec<_>>();

    sim.tick();
    for (node, old) in sim.nodes().iter().zip(&before) {
        assert!(
            distance(node.position, *old) < 0.1,
            "node {} moved after settling",
            node.id
        );
    }
}

#[test]
fn wheel_zoom_is_clamped_and_keeps_point_under_cursor() {
    let graph = family();
    let mut sim = simulation(&graph);
    sim.run_until_settled(MAX_TICKS);
    let mut viewport = viewport();

    let target = sim.position(12).expect("node 12");
    let pointer = viewport.to_screen(target);
    for delta in [120.0, 480.0, -90.0, 2_000.0] {
        let transform = viewport.apply_gesture(Gesture::Wheel {
            position: pointer,
            delta,
        });
        assert!((0.05..=8.0).contains(&transform.k));
        assert!((viewport.to_screen(target) - pointer).length() < 1e-2);
    }

    let transform = viewport.apply_gesture(Gesture::Wheel {
        position: pointer,
        delta: 1.0e7,
    });
    assert_eq!(transform.k, 8.0);
}

#[test]
fn center_on_base_maps_base_to_viewport_center() {
    let graph = family();
    let mut sim = simulation(&graph);
    sim.run_until_settled(MAX_TICKS);
    let base = sim.base_position().expect("base node");

    let mut viewport = viewport();
    viewport.set_transform(ViewportTransform {
        x: 210.0,
        y: -75.0,
        k: 2.5,
    });
    assert!(viewport.center_on_base(&sim, Duration::ZERO));
    assert!((viewport.to_screen(base) - viewport.rect().center()).length() < 1e-3);

    viewport.set_transform(ViewportTransform {
        x: -40.0,
        y: 90.0,
        k: 0.5,
    });
    assert!(viewport.center_on_base(&sim, Duration::from_millis(750)));
    while viewport.advance(Duration::from_millis(16)) {}
    assert!((viewport.to_screen(base) - viewport.rect().center()).length() < 1e-3);
}

#[test]
fn chain_keeps_middle_node_between_its_ends() {
    let graph = graph(1, &[1, 2, 3], &[(1, 2), (2, 3)]);
    let mut sim = simulation(&graph);
    sim.run_until_settled(MAX_TICKS);

    let node = |id| sim.node(id).expect("chain node");
    let (a, b, c) = (node(1), node(2), node(3));
    for (p, q) in [(a, b), (b, c), (a, c)] {
        assert!(distance(p.position, q.position) >= p.radius + q.radius);
    }

    let span = distance(a.position, c.position);
    assert!(distance_to_line(b.position, a.position, c.position) < 0.5 * span);
    let along = (b.position - a.position).dot(c.position - a.position);
    assert!(along > 0.0 && along < span * span);
}

#[test]
fn dragged_node_lands_on_pointer_and_drifts_after_release() {
    let graph = graph(1, &[1, 2, 3], &[(1, 2), (2, 3)]);
    let mut sim = simulation(&graph);
    let mut drag = DragController::new(0.3);

    assert!(drag.on_drag_start(1, 2, &mut sim));
    assert!(drag.on_drag_move_world(1, vec2(100.0, 100.0), &mut sim));
    sim.tick();
    assert_eq!(sim.position(2), Some(vec2(100.0, 100.0)));
    assert_eq!(sim.node(2).map(|n| n.velocity), Some(Vec2::ZERO));

    assert!(drag.on_drag_end(1, &mut sim));
    assert_eq!(sim.node(2).map(|n| n.velocity), Some(Vec2::ZERO));
    for _ in 0..5 {
        sim.tick();
    }
    assert_ne!(sim.position(2), Some(vec2(100.0, 100.0)));
}

#[test]
fn drag_through_viewport_uses_inverse_transform() {
    let graph = family();
    let mut sim = simulation(&graph);
    let mut viewport = viewport();
    viewport.apply_gesture(Gesture::Wheel {
        position: Pos2::new(300.0, 200.0),
        delta: 350.0,
    });
    let mut drag = DragController::new(0.3);

    let screen = Pos2::new(700.0, 420.0);
    drag.on_drag_start(4, 5, &mut sim);
    drag.on_drag_move(4, screen, &mut sim, &viewport);
    sim.tick();
    let landed = sim.position(5).expect("node 5");
    assert!((viewport.to_screen(landed) - screen).length() < 1e-2);
}

#[test]
fn reloading_leaves_nothing_from_previous_graph() {
    let first = family();
    let second = graph(100, &[100, 101, 102, 103], &[(100, 101), (100, 102), (102, 103)]);

    let mut sim = simulation(&first);
    let mut viewport = viewport();
    let mut drag = DragController::new(0.3);
    drag.on_drag_start(1, 3, &mut sim);
    sim.run_until_settled(50);
    viewport.transition_to(
        ViewportTransform {
            x: 10.0,
            y: 10.0,
            k: 3.0,
        },
        Duration::from_secs(1),
    );

    drag.reset();
    sim.dispose();
    viewport.dispose();
    assert!(sim.nodes().is_empty());
    assert!(!viewport.advance(Duration::from_millis(16)));

    let mut sim = simulation(&second);
    let viewport = ViewportController::new(ViewportConfig::default(), viewport.rect());
    sim.run_until_settled(MAX_TICKS);

    let ids = sim.nodes().iter().map(|n| n.id).collect::<HashSet<_>>();
    assert_eq!(ids, HashSet::from([100, 101, 102, 103]));
    assert_eq!(sim.edges().len(), 3);
    assert!(sim.edges().iter().all(|e| e.source_id >= 100 && e.target_id >= 100));
    assert!(sim.nodes().iter().all(|n| n.fixed.is_none()));
    assert_eq!(viewport.transform(), ViewportTransform::IDENTITY);
    assert!(!drag.is_dragging());
}

#[test]
fn json_snapshot_runs_end_to_end() {
    let raw = json!({
        "base": 10,
        "generationsUp": 1,
        "generationsDown": 1,
        "numberOfNodes": 3,
        "numberOfEdges": 2,
        "nodes": [
            { "id": 10, "name": "Base Person", "numberofdescendents": 1 },
            { "id": 11, "name": "Advisor", "students": [{ "id": 10, "name": "Base Person" }] },
            { "id": 12, "name": "Student" }
        ],
        "edges": [
            { "fromNodeId": 11, "toNodeId": 10 },
            { "fromNodeId": 10, "toNodeId": 12 }
        ]
    })
    .to_string();

    let graph = parse_graph(&raw).expect("valid snapshot");
    let mut sim = simulation(&graph);
    let ticks = sim.run_until_settled(MAX_TICKS);
    assert!(ticks > 0 && ticks < MAX_TICKS);
    assert!(sim.nodes().iter().all(|n| n.position.x.is_finite()));
    assert_eq!(graph.nodes[1].students.as_ref().map(Vec::len), Some(1));
}

#[test]
fn dangling_edge_is_rejected_before_simulating() {
    let bad = graph(1, &[1, 2], &[(1, 2), (2, 7)]);
    let error = Simulation::new(&bad, &Notables::default(), &SimulationConfig::default())
        .expect_err("dangling edge");
    assert_eq!(
        error,
        GraphIntegrityError::DanglingEdge {
            from: 2,
            to: 7,
            missing: 7
        }
    );
}
