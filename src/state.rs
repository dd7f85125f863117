//! The public graph session object
//!
//! `GraphState` owns the store, the property registry, the direction
//! flags, the filter configuration, and the cooperative abort flag.
//! Every public operation goes through it: mutation applies to the
//! owned store and is mirrored into the registry, analytics acquire a
//! view and dispatch to the estimator functions.
//!
//! View acquisition is the specialization boundary: the filtered and
//! unfiltered cases instantiate the same estimator code with
//! different mask types, so the unfiltered inner loops carry no
//! filter checks at all.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::analysis::degree::{self, AvgCorr, DegreeFn, DegreeSelector, Hist, Hist2d, Hist3d};
use crate::analysis::{clustering, components, correlation, distance};
use crate::analysis::distance::DistanceStats;
use crate::error::{GraphError, GraphResult};
use crate::filter::view::{filter_bits, DenseMask, View};
use crate::filter::{FilterConfig, ItemPredicate};
use crate::generate::{
    self, EdgeCorrelation, GenerationOptions, GenerationReport, JointDegreeDistribution,
};
use crate::graph::{
    EdgeIndex, MultiGraph, PropertyColumn, PropertyKind, PropertyRegistry, ScalarType,
    ScalarValue, VertexIndex,
};
use crate::{io, layout};

/// Acquire a view matching the current filter state and run `$body`
/// with it. The two branches instantiate `$body` against different
/// mask types; resolution errors propagate with `?`.
macro_rules! with_view {
    ($state:expr, |$view:ident| $body:expr) => {{
        if $state.vertex_filter.is_active() || $state.edge_filter.is_active() {
            let vf = $state
                .vertex_filter
                .resolve(PropertyKind::Vertex, &$state.registry)?;
            let ef = $state
                .edge_filter
                .resolve(PropertyKind::Edge, &$state.registry)?;
            let vbits = filter_bits(vf.as_ref(), $state.graph.vertex_count());
            let ebits = filter_bits(ef.as_ref(), $state.graph.edge_count());
            let $view = View::masked(
                &$state.graph,
                $state.directed,
                $state.reversed,
                DenseMask::new(vbits),
                ebits,
            );
            $body
        } else {
            let $view = View::unfiltered(&$state.graph, $state.directed, $state.reversed);
            $body
        }
    }};
}

/// A graph with its properties, filters, and direction flags
pub struct GraphState {
    graph: MultiGraph,
    registry: PropertyRegistry,
    directed: bool,
    reversed: bool,
    vertex_filter: FilterConfig,
    edge_filter: FilterConfig,
    abort: Arc<AtomicBool>,
}

impl Default for GraphState {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphState {
    /// Create an empty directed graph
    pub fn new() -> Self {
        GraphState {
            graph: MultiGraph::new(),
            registry: PropertyRegistry::new(),
            directed: true,
            reversed: false,
            vertex_filter: FilterConfig::default(),
            edge_filter: FilterConfig::default(),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    // ------------------------------------------------------------
    // queries
    // ------------------------------------------------------------

    /// Number of visible vertices under the current filters
    pub fn num_vertices(&self) -> GraphResult<usize> {
        with_view!(self, |view| Ok(view.num_vertices()))
    }

    /// Number of visible edges under the current filters
    pub fn num_edges(&self) -> GraphResult<usize> {
        with_view!(self, |view| Ok(view.num_edges()))
    }

    pub fn get_directed(&self) -> bool {
        self.directed
    }

    pub fn get_reversed(&self) -> bool {
        self.reversed
    }

    pub fn is_vertex_filter_active(&self) -> bool {
        self.vertex_filter.is_active()
    }

    pub fn is_edge_filter_active(&self) -> bool {
        self.edge_filter.is_active()
    }

    pub fn get_vertex_filter_property(&self) -> Option<&str> {
        self.vertex_filter.property()
    }

    pub fn get_vertex_filter_range(&self) -> Option<(f64, f64)> {
        self.vertex_filter.range()
    }

    pub fn get_edge_filter_property(&self) -> Option<&str> {
        self.edge_filter.property()
    }

    pub fn get_edge_filter_range(&self) -> Option<(f64, f64)> {
        self.edge_filter.range()
    }

    /// Endpoints of edge `e` in the underlying storage, ignoring
    /// filters and direction flags
    pub fn edge_endpoints(&self, e: EdgeIndex) -> GraphResult<(VertexIndex, VertexIndex)> {
        self.graph
            .endpoints(e)
            .map(|rec| (rec.source, rec.target))
            .ok_or_else(|| GraphError::InvalidArgument(format!("edge index {} out of range", e)))
    }

    /// Number of vertices in the underlying storage, ignoring filters
    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Number of edges in the underlying storage, ignoring filters
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Handle for cooperative cancellation: setting it to true makes
    /// long-running calls fail with [`GraphError::Aborted`]. Each
    /// such call clears the flag on entry.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    // ------------------------------------------------------------
    // direction and filter configuration
    // ------------------------------------------------------------

    pub fn set_directed(&mut self, directed: bool) {
        self.directed = directed;
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    /// Filter vertices by the named numeric property
    pub fn set_vertex_filter_property(&mut self, name: &str) -> GraphResult<()> {
        self.registry.numeric_checked(PropertyKind::Vertex, name)?;
        self.vertex_filter.set_property(name);
        Ok(())
    }

    pub fn set_vertex_filter_range(&mut self, lo: f64, hi: f64) -> GraphResult<()> {
        self.vertex_filter.set_range(lo, hi)
    }

    /// Filter edges by the named numeric property
    pub fn set_edge_filter_property(&mut self, name: &str) -> GraphResult<()> {
        self.registry.numeric_checked(PropertyKind::Edge, name)?;
        self.edge_filter.set_property(name);
        Ok(())
    }

    pub fn set_edge_filter_range(&mut self, lo: f64, hi: f64) -> GraphResult<()> {
        self.edge_filter.set_range(lo, hi)
    }

    /// Install a caller-supplied vertex predicate; supersedes a range
    /// filter while set
    pub fn set_generic_vertex_filter(&mut self, pred: ItemPredicate) {
        self.vertex_filter.set_generic(pred);
    }

    /// Install a caller-supplied edge predicate; supersedes a range
    /// filter while set
    pub fn set_generic_edge_filter(&mut self, pred: ItemPredicate) {
        self.edge_filter.set_generic(pred);
    }

    pub fn clear_generic_vertex_filter(&mut self) {
        self.vertex_filter.clear_generic();
    }

    pub fn clear_generic_edge_filter(&mut self) {
        self.edge_filter.clear_generic();
    }

    pub fn clear_vertex_filter(&mut self) {
        self.vertex_filter.clear();
    }

    pub fn clear_edge_filter(&mut self) {
        self.edge_filter.clear();
    }

    // ------------------------------------------------------------
    // structural mutation
    // ------------------------------------------------------------

    /// Add a vertex, growing every vertex property by its default
    pub fn add_vertex(&mut self) -> VertexIndex {
        let v = self.graph.add_vertex();
        self.registry.on_item_added(PropertyKind::Vertex);
        v
    }

    /// Add `n` vertices, returning the index of the first
    pub fn add_vertices(&mut self, n: usize) -> VertexIndex {
        let first = self.graph.vertex_count();
        for _ in 0..n {
            self.add_vertex();
        }
        first
    }

    /// Add an edge from `source` to `target`
    pub fn add_edge(&mut self, source: VertexIndex, target: VertexIndex) -> GraphResult<EdgeIndex> {
        let e = self.graph.add_edge(source, target).ok_or_else(|| {
            GraphError::InvalidArgument(format!(
                "edge endpoints ({}, {}) out of range",
                source, target
            ))
        })?;
        self.registry.on_item_added(PropertyKind::Edge);
        Ok(e)
    }

    /// Remove edge `e`; the last edge index is compacted into its slot
    pub fn remove_edge(&mut self, e: EdgeIndex) -> GraphResult<()> {
        if !self.graph.remove_edge(e) {
            return Err(GraphError::InvalidArgument(format!(
                "edge index {} out of range",
                e
            )));
        }
        self.registry.on_item_swap_removed(PropertyKind::Edge, e);
        Ok(())
    }

    /// Remove vertex `v` with its incident edges; the last vertex
    /// index is compacted into its slot
    pub fn remove_vertex(&mut self, v: VertexIndex) -> GraphResult<()> {
        let removal = self.graph.remove_vertex(v).ok_or_else(|| {
            GraphError::InvalidArgument(format!("vertex index {} out of range", v))
        })?;
        for &e in &removal.removed_edges {
            self.registry.on_item_swap_removed(PropertyKind::Edge, e);
        }
        self.registry.on_item_swap_removed(PropertyKind::Vertex, v);
        Ok(())
    }

    /// Drop duplicate edges so every ordered (source, target) pair
    /// keeps at most its first edge. Idempotent. Returns the number
    /// of edges removed.
    pub fn remove_parallel_edges(&mut self) -> usize {
        let dups = self.graph.parallel_duplicates();
        for &e in dups.iter().rev() {
            self.graph.remove_edge(e);
            self.registry.on_item_swap_removed(PropertyKind::Edge, e);
        }
        dups.len()
    }

    /// Remove everything: graph, properties, and filter configuration
    pub fn clear(&mut self) {
        self.graph.clear();
        self.registry.clear();
        self.vertex_filter.clear();
        self.edge_filter.clear();
    }

    // ------------------------------------------------------------
    // properties
    // ------------------------------------------------------------

    /// Register a vertex property filled with `default`
    pub fn insert_vertex_property(
        &mut self,
        name: &str,
        default: impl Into<ScalarValue>,
    ) -> GraphResult<()> {
        self.registry.insert(
            PropertyKind::Vertex,
            name,
            default.into(),
            self.graph.vertex_count(),
        )
    }

    /// Register an edge property filled with `default`
    pub fn insert_edge_property(
        &mut self,
        name: &str,
        default: impl Into<ScalarValue>,
    ) -> GraphResult<()> {
        self.registry.insert(
            PropertyKind::Edge,
            name,
            default.into(),
            self.graph.edge_count(),
        )
    }

    /// Register a vertex property carrying each vertex's own index
    pub fn insert_vertex_index_property(&mut self, name: &str) -> GraphResult<()> {
        self.registry
            .insert_index_property(PropertyKind::Vertex, name, self.graph.vertex_count())
    }

    /// Register an edge property carrying each edge's own index
    pub fn insert_edge_index_property(&mut self, name: &str) -> GraphResult<()> {
        self.registry
            .insert_index_property(PropertyKind::Edge, name, self.graph.edge_count())
    }

    /// Remove a vertex property; a vertex filter naming it is
    /// deactivated with a warning
    pub fn remove_vertex_property(&mut self, name: &str) -> GraphResult<()> {
        self.registry.remove(PropertyKind::Vertex, name)?;
        if self.vertex_filter.property() == Some(name) {
            warn!(
                property = name,
                "vertex filter referenced a removed property; filter deactivated"
            );
            self.vertex_filter.clear_property();
        }
        Ok(())
    }

    /// Remove an edge property; an edge filter naming it is
    /// deactivated with a warning
    pub fn remove_edge_property(&mut self, name: &str) -> GraphResult<()> {
        self.registry.remove(PropertyKind::Edge, name)?;
        if self.edge_filter.property() == Some(name) {
            warn!(
                property = name,
                "edge filter referenced a removed property; filter deactivated"
            );
            self.edge_filter.clear_property();
        }
        Ok(())
    }

    /// Names and element types of vertex properties
    pub fn vertex_properties(&self) -> Vec<(String, ScalarType)> {
        self.registry.list(PropertyKind::Vertex)
    }

    /// Names and element types of edge properties
    pub fn edge_properties(&self) -> Vec<(String, ScalarType)> {
        self.registry.list(PropertyKind::Edge)
    }

    pub fn get_vertex_property_value(
        &self,
        name: &str,
        v: VertexIndex,
    ) -> GraphResult<ScalarValue> {
        self.registry
            .get_checked(PropertyKind::Vertex, name)?
            .get(v)
            .ok_or_else(|| {
                GraphError::InvalidArgument(format!("vertex index {} out of range", v))
            })
    }

    pub fn set_vertex_property_value(
        &mut self,
        name: &str,
        v: VertexIndex,
        value: impl Into<ScalarValue>,
    ) -> GraphResult<()> {
        Self::set_property_value(&mut self.registry, PropertyKind::Vertex, name, v, value.into())
    }

    pub fn get_edge_property_value(&self, name: &str, e: EdgeIndex) -> GraphResult<ScalarValue> {
        self.registry
            .get_checked(PropertyKind::Edge, name)?
            .get(e)
            .ok_or_else(|| GraphError::InvalidArgument(format!("edge index {} out of range", e)))
    }

    pub fn set_edge_property_value(
        &mut self,
        name: &str,
        e: EdgeIndex,
        value: impl Into<ScalarValue>,
    ) -> GraphResult<()> {
        Self::set_property_value(&mut self.registry, PropertyKind::Edge, name, e, value.into())
    }

    fn set_property_value(
        registry: &mut PropertyRegistry,
        kind: PropertyKind,
        name: &str,
        item: usize,
        value: ScalarValue,
    ) -> GraphResult<()> {
        let column = registry
            .get_mut(kind, name)
            .ok_or_else(|| GraphError::NotFound(name.to_string()))?;
        if item >= column.len() {
            return Err(GraphError::InvalidArgument(format!(
                "{} index {} out of range",
                kind.label(),
                item
            )));
        }
        let value_type = value.scalar_type();
        column.set(item, value).map_err(|column_type| {
            GraphError::TypeMismatch {
                name: name.to_string(),
                expected: column_type.type_name(),
                actual: value_type.type_name(),
            }
        })
    }

    // ------------------------------------------------------------
    // analytics
    // ------------------------------------------------------------

    /// Histogram of visible vertices by degree
    pub fn degree_histogram(&self, selector: &DegreeSelector) -> GraphResult<Hist> {
        let deg = DegreeFn::resolve(selector, &self.registry)?;
        with_view!(self, |view| Ok(degree::degree_histogram(&view, &deg)))
    }

    /// 2D histogram over (in-degree, out-degree); directed views only
    pub fn combined_degree_histogram(&self) -> GraphResult<Hist2d> {
        with_view!(self, |view| degree::combined_degree_histogram(&view))
    }

    /// 2D histogram over (d1(source), d2(target)) of visible edges
    pub fn degree_correlation_histogram(
        &self,
        d1: &DegreeSelector,
        d2: &DegreeSelector,
    ) -> GraphResult<Hist2d> {
        let d1 = DegreeFn::resolve(d1, &self.registry)?;
        let d2 = DegreeFn::resolve(d2, &self.registry)?;
        with_view!(self, |view| Ok(correlation::degree_correlation_histogram(
            &view, &d1, &d2
        )))
    }

    /// 3D histogram over (d1(source), edge scalar, d2(target))
    pub fn edge_degree_correlation_histogram(
        &self,
        d1: &DegreeSelector,
        edge_scalar: &str,
        d2: &DegreeSelector,
    ) -> GraphResult<Hist3d> {
        let d1 = DegreeFn::resolve(d1, &self.registry)?;
        let d2 = DegreeFn::resolve(d2, &self.registry)?;
        let column = self.registry.numeric_checked(PropertyKind::Edge, edge_scalar)?;
        with_view!(self, |view| Ok(
            correlation::edge_degree_correlation_histogram(&view, &d1, column, &d2)
        ))
    }

    /// 2D histogram over (degree, vertex scalar) of visible vertices
    pub fn vertex_degree_scalar_correlation_histogram(
        &self,
        deg: &DegreeSelector,
        vertex_scalar: &str,
    ) -> GraphResult<Hist2d> {
        let deg = DegreeFn::resolve(deg, &self.registry)?;
        let column = self
            .registry
            .numeric_checked(PropertyKind::Vertex, vertex_scalar)?;
        with_view!(self, |view| Ok(
            correlation::vertex_degree_scalar_correlation_histogram(&view, &deg, column)
        ))
    }

    /// Mean neighbour degree per origin-degree bucket, with the
    /// standard error of each mean
    pub fn average_nearest_neighbours_degree(
        &self,
        origin: &DegreeSelector,
        neighbour: &DegreeSelector,
    ) -> GraphResult<AvgCorr> {
        let origin = DegreeFn::resolve(origin, &self.registry)?;
        let neighbour = DegreeFn::resolve(neighbour, &self.registry)?;
        with_view!(self, |view| Ok(
            correlation::average_nearest_neighbours_degree(&view, &origin, &neighbour)
        ))
    }

    /// Pearson correlation of endpoint degrees over visible edges
    pub fn assortativity_coefficient(&self, deg: &DegreeSelector) -> GraphResult<f64> {
        let deg = DegreeFn::resolve(deg, &self.registry)?;
        with_view!(self, |view| correlation::assortativity_coefficient(
            &view, &deg
        ))
    }

    /// Histogram of local clustering coefficients
    pub fn local_clustering_histogram(&self) -> GraphResult<Hist> {
        with_view!(self, |view| Ok(clustering::local_clustering_histogram(&view)))
    }

    /// Write each vertex's local clustering coefficient into the
    /// named float property, creating it if absent and overwriting a
    /// numeric one; invisible vertices read zero
    pub fn set_local_clustering_to_property(&mut self, name: &str) -> GraphResult<()> {
        self.ensure_float_writable(name)?;
        let values =
            with_view!(self, |view| Ok::<Vec<f64>, GraphError>(
                clustering::local_clustering_values(&view)
            ))?;
        self.write_float_vertex_property(name, values)
    }

    /// Global clustering coefficient (transitivity)
    pub fn global_clustering(&self) -> GraphResult<f64> {
        with_view!(self, |view| clustering::global_clustering(&view))
    }

    /// Histogram over connected-component sizes; weak components on
    /// directed views
    pub fn component_size_histogram(&self) -> GraphResult<Hist> {
        with_view!(self, |view| Ok(components::component_size_histogram(&view)))
    }

    /// Mean geodesic distance over reachable ordered pairs, with the
    /// fraction of the pair space that is reachable
    pub fn average_distance(&self) -> GraphResult<DistanceStats> {
        self.abort.store(false, Ordering::Relaxed);
        with_view!(self, |view| distance::average_distance(&view, &self.abort))
    }

    /// Mean inverse geodesic distance over all ordered pairs;
    /// unreachable pairs contribute zero
    pub fn average_harmonic_distance(&self) -> GraphResult<f64> {
        self.abort.store(false, Ordering::Relaxed);
        with_view!(self, |view| distance::average_harmonic_distance(
            &view,
            &self.abort
        ))
    }

    // ------------------------------------------------------------
    // generation
    // ------------------------------------------------------------

    /// Replace the graph with a correlated configurational-model
    /// sample. On success the previous content, every property, and
    /// any active filter are discarded; on failure the state is
    /// untouched.
    pub fn generate_correlated_configurational_model(
        &mut self,
        n: usize,
        degrees: &JointDegreeDistribution,
        correlation: &EdgeCorrelation,
        options: &GenerationOptions,
    ) -> GraphResult<GenerationReport> {
        self.abort.store(false, Ordering::Relaxed);
        let (graph, report) = generate::generate(n, degrees, correlation, options, &self.abort)?;

        if self.vertex_filter.is_active() || self.edge_filter.is_active() {
            warn!("generation replaced the graph; active filters deactivated");
        }
        self.graph = graph;
        self.registry.clear();
        self.vertex_filter.clear();
        self.edge_filter.clear();
        self.directed = !options.undirected;
        self.reversed = false;
        Ok(report)
    }

    // ------------------------------------------------------------
    // layout
    // ------------------------------------------------------------

    /// Topology-driven layout; writes `pos_x`/`pos_y` vertex
    /// properties
    pub fn compute_layout_gursoy(&mut self, iterations: usize, seed: u64) -> GraphResult<()> {
        self.ensure_float_writable("pos_x")?;
        self.ensure_float_writable("pos_y")?;
        self.abort.store(false, Ordering::Relaxed);
        let positions =
            with_view!(self, |view| layout::gursoy_atun(&view, iterations, seed, &self.abort))?;
        self.store_positions(positions)
    }

    /// Force-directed spring-block layout; writes `pos_x`/`pos_y`
    /// vertex properties
    pub fn compute_layout_spring_block(&mut self, iterations: usize, seed: u64) -> GraphResult<()> {
        self.ensure_float_writable("pos_x")?;
        self.ensure_float_writable("pos_y")?;
        self.abort.store(false, Ordering::Relaxed);
        let positions =
            with_view!(self, |view| layout::spring_block(&view, iterations, seed, &self.abort))?;
        self.store_positions(positions)
    }

    fn store_positions(&mut self, positions: Vec<(f64, f64)>) -> GraphResult<()> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = positions.into_iter().unzip();
        self.write_float_vertex_property("pos_x", xs)?;
        self.write_float_vertex_property("pos_y", ys)
    }

    /// Fail early when `name` exists as a non-numeric vertex property
    fn ensure_float_writable(&self, name: &str) -> GraphResult<()> {
        match self.registry.get(PropertyKind::Vertex, name) {
            Some(column) if !column.element_type().is_numeric() => {
                Err(GraphError::TypeMismatch {
                    name: name.to_string(),
                    expected: "float or int",
                    actual: column.element_type().type_name(),
                })
            }
            _ => Ok(()),
        }
    }

    fn write_float_vertex_property(&mut self, name: &str, values: Vec<f64>) -> GraphResult<()> {
        if let Some(column) = self.registry.get_mut(PropertyKind::Vertex, name) {
            if !column.element_type().is_numeric() {
                return Err(GraphError::TypeMismatch {
                    name: name.to_string(),
                    expected: "float or int",
                    actual: column.element_type().type_name(),
                });
            }
            *column = PropertyColumn::Float(values);
            Ok(())
        } else {
            let len = values.len();
            self.registry
                .insert(PropertyKind::Vertex, name, ScalarValue::Float(0.0), len)?;
            *self
                .registry
                .get_mut(PropertyKind::Vertex, name)
                .expect("property inserted above") = PropertyColumn::Float(values);
            Ok(())
        }
    }

    // ------------------------------------------------------------
    // persistence
    // ------------------------------------------------------------

    /// Serialize the full state to `path`
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        io::write_to_file(
            path.as_ref(),
            &self.graph,
            &self.registry,
            self.directed,
            self.reversed,
            &self.vertex_filter,
            &self.edge_filter,
        )
    }

    /// Replace the state with the contents of `path`. Generic filter
    /// predicates are not persisted and come back inactive. Failure
    /// leaves the current state untouched.
    pub fn read_from_file(&mut self, path: impl AsRef<Path>) -> GraphResult<()> {
        let loaded = io::read_from_file(path.as_ref())?;
        self.graph = loaded.graph;
        self.registry = loaded.registry;
        self.directed = loaded.directed;
        self.reversed = loaded.reversed;
        self.vertex_filter = loaded.vertex_filter;
        self.edge_filter = loaded.edge_filter;
        Ok(())
    }
}
