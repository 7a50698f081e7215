use approx::assert_relative_eq;
use procgraph_core::{
    builtin_registry, evaluate, AttributeType, EvalState, Graph, GraphError, InputRef, NodeId,
    NodeRegistry, OutputRef, ParamValue, PrimitiveKind, SceneSnapshot, INVALID_INDEX,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn registry() -> NodeRegistry {
    builtin_registry().expect("builtin registry")
}

fn add(graph: &mut Graph, registry: &NodeRegistry, name: &str) -> NodeId {
    graph.add(registry.create(name).expect("registered node"))
}

fn link(graph: &mut Graph, from: NodeId, to: NodeId, input: usize) {
    graph
        .connect(OutputRef::new(from, 0), InputRef::new(to, input))
        .expect("connect");
}

fn set(graph: &mut Graph, node: NodeId, name: &str, value: ParamValue) {
    graph
        .node_mut(node)
        .expect("node")
        .properties_mut()
        .set(name, value)
        .expect("property");
}

#[test]
fn box_into_output_produces_unit_cube() {
    let registry = registry();
    let mut graph = Graph::new();
    let cube = add(&mut graph, &registry, "Box");
    let output = graph.output();
    link(&mut graph, cube, output, 0);

    let mut state = EvalState::new();
    let report = evaluate(&mut graph, &mut state).unwrap();
    assert!(report.output_valid);

    let collection = state.output(&graph).unwrap();
    let mesh = collection.meshes().next().unwrap();
    assert_eq!(mesh.points.len(), 8);
    assert_eq!(mesh.polys.len(), 6);
    assert!(mesh.polys.iter().all(|p| p[3] != INVALID_INDEX));
    for p in &mesh.points {
        assert_eq!(p.abs().to_array(), [0.5, 0.5, 0.5]);
    }
    let bounds = mesh.bounds().unwrap();
    assert_eq!(bounds.min, [-0.5, -0.5, -0.5]);
    assert_eq!(bounds.max, [0.5, 0.5, 0.5]);
}

#[test]
fn torus_and_circle_golden_counts() {
    let registry = registry();
    let mut graph = Graph::new();
    let torus = add(&mut graph, &registry, "Torus");
    set(&mut graph, torus, "Major Segment", ParamValue::Int(4));
    set(&mut graph, torus, "Minor Segment", ParamValue::Int(4));
    let circle = add(&mut graph, &registry, "Circle");
    set(&mut graph, circle, "Vertices", ParamValue::Int(4));
    set(&mut graph, circle, "Radius", ParamValue::Float(1.0));

    let mut state = EvalState::new();
    evaluate(&mut graph, &mut state).unwrap();

    let torus_mesh = state.collection(torus).unwrap().meshes().next().unwrap().clone();
    assert_eq!(torus_mesh.points.len(), 16);
    assert_eq!(torus_mesh.polys.len(), 16);
    assert!(torus_mesh.polys.iter().flatten().all(|&i| i < 16));

    let circle_mesh = state.collection(circle).unwrap().meshes().next().unwrap().clone();
    assert_eq!(circle_mesh.points.len(), 5);
    assert_eq!(circle_mesh.polys.len(), 4);
    assert!(circle_mesh
        .polys
        .iter()
        .all(|p| p[3] == INVALID_INDEX && p[..3].iter().all(|&i| i < 5)));
}

#[test]
fn transform_translates_by_exact_offset() {
    let registry = registry();
    let mut graph = Graph::new();
    let cube = add(&mut graph, &registry, "Box");
    let transform = add(&mut graph, &registry, "Transform");
    let output = graph.output();
    set(&mut graph, transform, "Translate", ParamValue::Vec3([1.0, 0.0, 0.0]));
    link(&mut graph, cube, transform, 0);
    link(&mut graph, transform, output, 0);

    let mut state = EvalState::new();
    evaluate(&mut graph, &mut state).unwrap();
    let prim = state.output(&graph).unwrap().get(0).unwrap();
    let moved = prim.matrix().transform_point3(glam::Vec3::ZERO);
    assert_eq!(moved.to_array(), [1.0, 0.0, 0.0]);
    let bounds = prim.bounds().unwrap();
    assert_eq!(bounds.min, [0.5, -0.5, -0.5]);
}

#[test]
fn merge_collection_transfers_primitives() {
    let registry = registry();
    let mut graph = Graph::new();
    let first = add(&mut graph, &registry, "Box");
    let second_a = add(&mut graph, &registry, "Torus");
    let second_b = add(&mut graph, &registry, "Grid");
    let inner = add(&mut graph, &registry, "Merge Collection");
    let merge = add(&mut graph, &registry, "Merge Collection");
    let output = graph.output();

    link(&mut graph, second_a, inner, 0);
    link(&mut graph, second_b, inner, 1);
    link(&mut graph, first, merge, 0);
    link(&mut graph, inner, merge, 1);
    link(&mut graph, merge, output, 0);

    let mut state = EvalState::new();
    let report = evaluate(&mut graph, &mut state).unwrap();
    assert!(report.errors.is_empty());
    assert_eq!(report.nodes[&merge].primitive_count, 3);
    assert_eq!(state.output(&graph).unwrap().len(), 3);
    // the second collection was drained, not copied
    assert!(state.collection(inner).unwrap().is_empty());
}

#[test]
fn normal_node_on_quad_is_parallel() {
    let registry = registry();
    let mut graph = Graph::new();
    let grid = add(&mut graph, &registry, "Grid");
    let normal = add(&mut graph, &registry, "Normal");
    let output = graph.output();
    link(&mut graph, grid, normal, 0);
    link(&mut graph, normal, output, 0);

    for flip in [false, true] {
        set(&mut graph, normal, "Flip", ParamValue::Bool(flip));
        let mut state = EvalState::new();
        evaluate(&mut graph, &mut state).unwrap();

        let collection = state.output(&graph).unwrap();
        let prim = collection.get(0).unwrap();
        assert_eq!(prim.points().len(), 4);
        let normals = prim
            .attribute("normal", AttributeType::Vec3)
            .and_then(|a| a.as_vec3())
            .unwrap();
        let first = normals[0].normalize();
        for n in normals {
            let n = n.normalize();
            assert_relative_eq!(n.dot(first), 1.0, epsilon = 1e-5);
            assert_relative_eq!(n.y.abs(), 1.0, epsilon = 1e-5);
        }
        if flip {
            assert_relative_eq!(normals[0].length(), 1.0, epsilon = 1e-5);
        }
    }
}

#[test]
fn remove_cascades_and_leaves_no_dangling_links() {
    let registry = registry();
    let mut graph = Graph::new();
    let a = add(&mut graph, &registry, "Box");
    let b = add(&mut graph, &registry, "IcoSphere");
    let merge = add(&mut graph, &registry, "Merge Collection");
    let consumers: Vec<NodeId> = (0..3).map(|_| add(&mut graph, &registry, "Noise")).collect();
    link(&mut graph, a, merge, 0);
    link(&mut graph, b, merge, 1);
    for &consumer in &consumers {
        link(&mut graph, merge, consumer, 0);
    }

    let before = graph.stats().disconnects;
    graph.remove(merge).unwrap();
    assert_eq!(graph.stats().disconnects - before, 2 + 3);
    for (_, node) in graph.nodes() {
        assert!(node
            .inputs()
            .iter()
            .all(|s| s.link().map_or(true, |l| l.node != merge)));
        assert!(node
            .outputs()
            .iter()
            .all(|s| s.links().iter().all(|l| l.node != merge)));
    }

    let mut state = EvalState::new();
    let report = evaluate(&mut graph, &mut state).unwrap();
    assert_eq!(report.order.len(), graph.len());
}

#[test]
fn cycle_is_reported_not_accepted() {
    let registry = registry();
    let mut graph = Graph::new();
    let a = add(&mut graph, &registry, "Transform");
    let b = add(&mut graph, &registry, "Color");
    link(&mut graph, a, b, 0);
    let err = graph
        .connect(OutputRef::new(b, 0), InputRef::new(a, 0))
        .unwrap_err();
    assert_eq!(err, GraphError::WouldCycle { from: b, to: a });
    assert!(graph.build().is_ok());
}

#[test]
fn random_dags_sort_producers_first() {
    let registry = registry();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50 {
        let mut graph = Graph::new();
        let count = rng.random_range(2..24);
        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            nodes.push(add(&mut graph, &registry, "Merge Collection"));
        }
        // links only run from lower to higher creation index
        for (to_index, &to) in nodes.iter().enumerate().skip(1) {
            for input in 0..2 {
                if rng.random_bool(0.6) {
                    let from = nodes[rng.random_range(0..to_index)];
                    link(&mut graph, from, to, input);
                }
            }
        }
        let last = *nodes.last().unwrap();
        let output = graph.output();
        link(&mut graph, last, output, 0);

        graph.build().unwrap();
        let order = graph.finished_stack().to_vec();
        assert_eq!(order.len(), graph.len());
        let position = |id: NodeId| order.iter().position(|n| *n == id).unwrap();
        for (id, node) in graph.nodes() {
            for socket in node.inputs() {
                if let Some(link) = socket.link() {
                    assert!(position(link.node) < position(id));
                }
            }
        }

        let builds = graph.stats().builds;
        graph.build().unwrap();
        assert_eq!(graph.finished_stack(), order.as_slice());
        assert_eq!(graph.stats().builds, builds);

        let mut state = EvalState::new();
        let report = evaluate(&mut graph, &mut state).unwrap();
        assert!(report.errors.is_empty());
    }
}

#[test]
fn property_edits_reach_process() {
    let registry = registry();
    let mut graph = Graph::new();
    let cloud = add(&mut graph, &registry, "Point Cloud");
    set(&mut graph, cloud, "Points Count", ParamValue::Int(250));
    set(&mut graph, cloud, "BBox Min", ParamValue::Vec3([0.0, 0.0, 0.0]));

    let mut state = EvalState::new();
    evaluate(&mut graph, &mut state).unwrap();
    let first = state.collection(cloud).unwrap().clone();
    let prim = first.iter_kind(PrimitiveKind::Points).next().unwrap();
    assert_eq!(prim.points().len(), 250);
    assert!(prim
        .points()
        .iter()
        .all(|p| p.min_element() >= 0.0 && p.max_element() <= 1.0));

    // deterministic across passes
    evaluate(&mut graph, &mut state).unwrap();
    assert_eq!(state.collection(cloud).unwrap(), &first);
}

#[test]
fn warnings_do_not_stop_the_pass() {
    let registry = registry();
    let mut graph = Graph::new();
    let cube = add(&mut graph, &registry, "Box");
    let create = add(&mut graph, &registry, "Attribute Create");
    let again = add(&mut graph, &registry, "Attribute Create");
    let delete = add(&mut graph, &registry, "Attribute Delete");
    let missing = add(&mut graph, &registry, "Attribute Delete");
    let output = graph.output();
    link(&mut graph, cube, create, 0);
    link(&mut graph, create, again, 0);
    link(&mut graph, again, delete, 0);
    link(&mut graph, delete, missing, 0);
    link(&mut graph, missing, output, 0);

    let mut state = EvalState::new();
    let report = evaluate(&mut graph, &mut state).unwrap();
    assert!(report.errors.is_empty());
    assert!(report.output_valid);
    assert!(report.nodes[&create].warnings.is_empty());
    assert_eq!(report.nodes[&again].warnings.len(), 1);
    assert!(report.nodes[&delete].warnings.is_empty());
    assert_eq!(report.nodes[&missing].warnings.len(), 1);
    assert_eq!(report.warning_count(), 2);

    let prim = state.output(&graph).unwrap().get(0).unwrap();
    assert!(prim.attribute("attribute", AttributeType::Float).is_none());
}

#[test]
fn drained_input_does_not_starve_other_consumers() {
    let registry = registry();
    for transform_first in [false, true] {
        let mut graph = Graph::new();
        let grid = add(&mut graph, &registry, "Grid");
        let cube = add(&mut graph, &registry, "Box");
        let (merge, transform) = if transform_first {
            let transform = add(&mut graph, &registry, "Transform");
            (add(&mut graph, &registry, "Merge Collection"), transform)
        } else {
            let merge = add(&mut graph, &registry, "Merge Collection");
            (merge, add(&mut graph, &registry, "Transform"))
        };
        link(&mut graph, grid, merge, 0);
        if transform_first {
            link(&mut graph, cube, transform, 0);
            link(&mut graph, cube, merge, 1);
        } else {
            link(&mut graph, cube, merge, 1);
            link(&mut graph, cube, transform, 0);
        }

        let mut state = EvalState::new();
        let report = evaluate(&mut graph, &mut state).unwrap();
        assert!(report.errors.is_empty());
        assert_eq!(state.collection(merge).unwrap().len(), 2);
        assert_eq!(state.collection(transform).unwrap().len(), 1);
        assert_eq!(state.collection(transform).unwrap().point_count(), 8);
    }
}

#[test]
fn active_node_keeps_its_result_for_preview() {
    let registry = registry();
    let mut graph = Graph::new();
    let cube = add(&mut graph, &registry, "Box");
    let transform = add(&mut graph, &registry, "Transform");
    let output = graph.output();
    link(&mut graph, cube, transform, 0);
    link(&mut graph, transform, output, 0);
    graph.set_active_node(Some(transform)).unwrap();

    let mut state = EvalState::new();
    evaluate(&mut graph, &mut state).unwrap();
    assert_eq!(state.collection(transform).unwrap().len(), 1);
    assert_eq!(state.output(&graph).unwrap().len(), 1);
    // nodes that are not previewed still hand their collection on
    assert!(state.collection(cube).unwrap().is_empty());
}

#[test]
fn fur_grows_curves_from_mesh_points() {
    let registry = registry();
    let mut graph = Graph::new();
    let grid = add(&mut graph, &registry, "Grid");
    let fur = add(&mut graph, &registry, "Fur");
    let output = graph.output();
    set(&mut graph, fur, "Segments", ParamValue::Int(3));
    set(&mut graph, fur, "Length", ParamValue::Float(2.0));
    link(&mut graph, grid, fur, 0);
    link(&mut graph, fur, output, 0);

    let mut state = EvalState::new();
    let report = evaluate(&mut graph, &mut state).unwrap();
    assert!(report.nodes[&fur].warnings.is_empty());

    let collection = state.output(&graph).unwrap();
    let curves = collection.iter_kind(PrimitiveKind::Segments).next().unwrap();
    assert_eq!(curves.points().len(), 4 * 4);
    assert_eq!(curves.edges().unwrap().len(), 4 * 3);
    let tip = curves.points()[3];
    assert_relative_eq!(tip.y, 2.0, epsilon = 1e-5);

    let snapshot = SceneSnapshot::from_collection(collection);
    assert_eq!(snapshot.meshes.len(), 1);
    assert_eq!(snapshot.lines.len(), 1);
}

#[test]
fn scatter_and_color_feed_points() {
    let registry = registry();
    let mut graph = Graph::new();
    let sphere = add(&mut graph, &registry, "IcoSphere");
    let scatter = add(&mut graph, &registry, "Scatter Points");
    let color = add(&mut graph, &registry, "Color");
    let output = graph.output();
    set(&mut graph, scatter, "Points Count", ParamValue::Int(100));
    graph
        .node_mut(color)
        .unwrap()
        .properties_mut()
        .set_enum_label("Fill Method", "Random")
        .unwrap();
    link(&mut graph, sphere, scatter, 0);
    link(&mut graph, scatter, color, 0);
    link(&mut graph, color, output, 0);

    let mut state = EvalState::new();
    evaluate(&mut graph, &mut state).unwrap();
    let collection = state.output(&graph).unwrap();
    assert_eq!(collection.len(), 1);
    let points = collection.iter_kind(PrimitiveKind::Points).next().unwrap();
    assert_eq!(points.points().len(), 100);
    let colors = points
        .attribute("color", AttributeType::Vec3)
        .and_then(|a| a.as_vec3())
        .unwrap();
    assert!(colors.iter().any(|c| *c != colors[0]));
    for p in points.points() {
        assert!(p.length() <= 1.0 + 1e-4);
    }
}
