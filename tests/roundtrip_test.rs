//! Persistence round-trips: a written and re-read state reproduces
//! every estimator output bit for bit

use gravis::{DegreeSelector, GraphState, ScalarValue};

fn sample_state() -> GraphState {
    let mut state = GraphState::new();
    state.add_vertices(6);
    let edges = [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2), (5, 5)];
    for (u, v) in edges {
        state.add_edge(u, v).unwrap();
    }

    state.insert_vertex_property("w", 0.0).unwrap();
    // awkward floats to exercise exact round-tripping
    for (v, value) in [0.1, 1.0 / 3.0, 2.5e-7, 1e17, -0.0, 6.02e23]
        .into_iter()
        .enumerate()
    {
        state.set_vertex_property_value("w", v, value).unwrap();
    }
    state.insert_edge_property("label", "").unwrap();
    state.set_edge_property_value("label", 0, "spine").unwrap();
    state.insert_vertex_index_property("vid").unwrap();

    state.set_vertex_filter_property("w").unwrap();
    state.set_vertex_filter_range(-1.0, 1e18).unwrap();
    state
}

#[test]
fn roundtrip_reproduces_estimators() {
    let state = sample_state();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    state.write_to_file(&path).unwrap();

    let mut restored = GraphState::new();
    restored.read_from_file(&path).unwrap();

    assert_eq!(restored.get_directed(), state.get_directed());
    assert_eq!(restored.get_reversed(), state.get_reversed());
    assert_eq!(
        restored.get_vertex_filter_property(),
        state.get_vertex_filter_property()
    );
    assert_eq!(
        restored.get_vertex_filter_range(),
        state.get_vertex_filter_range()
    );

    assert_eq!(
        restored.num_vertices().unwrap(),
        state.num_vertices().unwrap()
    );
    assert_eq!(restored.num_edges().unwrap(), state.num_edges().unwrap());

    for selector in [
        DegreeSelector::In,
        DegreeSelector::Out,
        DegreeSelector::Total,
        DegreeSelector::scalar("w"),
    ] {
        assert_eq!(
            restored.degree_histogram(&selector).unwrap(),
            state.degree_histogram(&selector).unwrap()
        );
    }

    assert_eq!(
        restored.combined_degree_histogram().unwrap(),
        state.combined_degree_histogram().unwrap()
    );
    assert_eq!(
        restored
            .degree_correlation_histogram(&DegreeSelector::In, &DegreeSelector::Out)
            .unwrap(),
        state
            .degree_correlation_histogram(&DegreeSelector::In, &DegreeSelector::Out)
            .unwrap()
    );
    assert_eq!(
        restored.local_clustering_histogram().unwrap(),
        state.local_clustering_histogram().unwrap()
    );
    assert_eq!(
        restored.component_size_histogram().unwrap(),
        state.component_size_histogram().unwrap()
    );

    let (a, b) = (
        state.average_distance().unwrap(),
        restored.average_distance().unwrap(),
    );
    assert_eq!(a.mean.to_bits(), b.mean.to_bits());
    assert_eq!(
        a.reachable_fraction.to_bits(),
        b.reachable_fraction.to_bits()
    );
    assert_eq!(
        state.average_harmonic_distance().unwrap().to_bits(),
        restored.average_harmonic_distance().unwrap().to_bits()
    );
}

#[test]
fn roundtrip_preserves_property_values_exactly() {
    let state = sample_state();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    state.write_to_file(&path).unwrap();

    let mut restored = GraphState::new();
    restored.read_from_file(&path).unwrap();

    for v in 0..6 {
        assert_eq!(
            restored.get_vertex_property_value("w", v).unwrap(),
            state.get_vertex_property_value("w", v).unwrap()
        );
        assert_eq!(
            restored.get_vertex_property_value("vid", v).unwrap(),
            ScalarValue::Float(v as f64)
        );
    }
    assert_eq!(
        restored.get_edge_property_value("label", 0).unwrap(),
        ScalarValue::from("spine")
    );
}

#[test]
fn failed_read_leaves_state_untouched() {
    let mut state = sample_state();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.json");
    std::fs::write(&path, b"not a graph").unwrap();

    assert!(state.read_from_file(&path).is_err());
    assert_eq!(state.num_vertices().unwrap(), 6);
    assert_eq!(state.num_edges().unwrap(), 7);
    assert_eq!(state.get_vertex_filter_property(), Some("w"));
}

#[test]
fn generic_predicates_are_not_persisted() {
    let mut state = sample_state();
    state.set_generic_edge_filter(std::sync::Arc::new(|e| e % 2 == 0));
    assert!(state.is_edge_filter_active());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    state.write_to_file(&path).unwrap();

    let mut restored = GraphState::new();
    restored.read_from_file(&path).unwrap();
    assert!(!restored.is_edge_filter_active());
}
