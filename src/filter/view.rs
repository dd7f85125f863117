//! Read-only filtered projection of the multigraph
//!
//! A `View` borrows the store for the duration of a single analytic
//! call. Visibility is decided by a `Mask` resolved once at view
//! acquisition: the unfiltered case uses the zero-sized [`AllVisible`]
//! mask whose check compiles to a constant, the filtered case a
//! materialized [`DenseMask`] whose edge bits are already intersected
//! with endpoint visibility. Estimators are generic over the mask
//! type, so their inner loops never test whether a filter is
//! configured.
//!
//! Direction is resolved here as well: a reversed directed view swaps
//! the in/out roles for every query, an undirected view unions them.

use crate::graph::{EdgeIndex, MultiGraph, VertexIndex};

use super::ResolvedFilter;

/// Per-item visibility test
pub trait Mask {
    fn visible(&self, item: usize) -> bool;
}

/// Mask of an unfiltered view; always true and zero-sized
#[derive(Debug, Clone, Copy, Default)]
pub struct AllVisible;

impl Mask for AllVisible {
    #[inline(always)]
    fn visible(&self, _item: usize) -> bool {
        true
    }
}

/// Materialized visibility bits for a filtered view
#[derive(Debug, Clone)]
pub struct DenseMask {
    bits: Vec<bool>,
}

impl DenseMask {
    pub fn new(bits: Vec<bool>) -> Self {
        DenseMask { bits }
    }
}

/// Evaluate an optional resolved filter into visibility bits; `None`
/// means every item of the kind is visible
pub(crate) fn filter_bits(filter: Option<&ResolvedFilter<'_>>, len: usize) -> Vec<bool> {
    match filter {
        Some(f) => (0..len).map(|i| f.accepts(i)).collect(),
        None => vec![true; len],
    }
}

impl Mask for DenseMask {
    #[inline(always)]
    fn visible(&self, item: usize) -> bool {
        self.bits[item]
    }
}

/// Neighbour iteration mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighbourMode {
    In,
    Out,
    All,
}

/// A filtered, direction-resolved projection of the graph
pub struct View<'a, M: Mask> {
    graph: &'a MultiGraph,
    vmask: M,
    emask: M,
    directed: bool,
    reversed: bool,
    visible_vertices: usize,
    visible_edges: usize,
}

impl<'a> View<'a, AllVisible> {
    /// Project the whole graph without filtering
    pub fn unfiltered(graph: &'a MultiGraph, directed: bool, reversed: bool) -> Self {
        View {
            graph,
            vmask: AllVisible,
            emask: AllVisible,
            directed,
            reversed,
            visible_vertices: graph.vertex_count(),
            visible_edges: graph.edge_count(),
        }
    }
}

impl<'a> View<'a, DenseMask> {
    /// Project through vertex and edge masks. Edge visibility is
    /// intersected with endpoint visibility here, once, so traversal
    /// only ever consults the edge bits.
    pub fn masked(
        graph: &'a MultiGraph,
        directed: bool,
        reversed: bool,
        vmask: DenseMask,
        mut edge_bits: Vec<bool>,
    ) -> Self {
        for (e, rec) in graph.edge_records() {
            if edge_bits[e] && !(vmask.visible(rec.source) && vmask.visible(rec.target)) {
                edge_bits[e] = false;
            }
        }
        let visible_vertices = (0..graph.vertex_count())
            .filter(|&v| vmask.visible(v))
            .count();
        let visible_edges = edge_bits.iter().filter(|&&b| b).count();
        View {
            graph,
            vmask,
            emask: DenseMask::new(edge_bits),
            directed,
            reversed,
            visible_vertices,
            visible_edges,
        }
    }
}

impl<'a, M: Mask> View<'a, M> {
    /// Number of visible vertices
    pub fn num_vertices(&self) -> usize {
        self.visible_vertices
    }

    /// Number of visible edges
    pub fn num_edges(&self) -> usize {
        self.visible_edges
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn graph(&self) -> &'a MultiGraph {
        self.graph
    }

    #[inline]
    pub fn vertex_visible(&self, v: VertexIndex) -> bool {
        self.vmask.visible(v)
    }

    #[inline]
    pub fn edge_visible(&self, e: EdgeIndex) -> bool {
        self.emask.visible(e)
    }

    /// Visible vertices in index order
    pub fn vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        (0..self.graph.vertex_count()).filter(move |&v| self.vmask.visible(v))
    }

    /// Visible edges in index order
    pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        (0..self.graph.edge_count()).filter(move |&e| self.emask.visible(e))
    }

    /// Endpoints of a visible edge as (source, target) under the
    /// view's direction: reversal swaps the roles
    #[inline]
    pub fn endpoints(&self, e: EdgeIndex) -> (VertexIndex, VertexIndex) {
        let rec = self.graph.endpoints(e).expect("edge index out of range");
        if self.directed && self.reversed {
            (rec.target, rec.source)
        } else {
            (rec.source, rec.target)
        }
    }

    /// Visible out-edges of `v` under the view's direction. On an
    /// undirected view this is every visible incident edge.
    pub fn out_edges(&self, v: VertexIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        let (primary, secondary) = if !self.directed {
            (self.graph.out_edges(v), self.graph.in_edges(v))
        } else if self.reversed {
            (self.graph.in_edges(v), &[][..])
        } else {
            (self.graph.out_edges(v), &[][..])
        };
        primary
            .iter()
            .chain(secondary.iter())
            .copied()
            .filter(move |&e| self.emask.visible(e))
    }

    /// Visible in-edges of `v` under the view's direction
    pub fn in_edges(&self, v: VertexIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        let (primary, secondary) = if !self.directed {
            (self.graph.out_edges(v), self.graph.in_edges(v))
        } else if self.reversed {
            (self.graph.out_edges(v), &[][..])
        } else {
            (self.graph.in_edges(v), &[][..])
        };
        primary
            .iter()
            .chain(secondary.iter())
            .copied()
            .filter(move |&e| self.emask.visible(e))
    }

    /// Count of visible out-edges
    pub fn out_degree(&self, v: VertexIndex) -> usize {
        self.out_edges(v).count()
    }

    /// Count of visible in-edges
    pub fn in_degree(&self, v: VertexIndex) -> usize {
        self.in_edges(v).count()
    }

    /// Count of all visible incident edges. On an undirected view
    /// in, out, and total coincide; a self-loop counts twice.
    pub fn total_degree(&self, v: VertexIndex) -> usize {
        if self.directed {
            self.out_degree(v) + self.in_degree(v)
        } else {
            self.out_degree(v)
        }
    }

    /// The endpoint of `e` other than `v` (`v` itself for self-loops)
    #[inline]
    pub fn edge_other(&self, e: EdgeIndex, v: VertexIndex) -> VertexIndex {
        let rec = self.graph.endpoints(e).expect("edge index out of range");
        if rec.source == v {
            rec.target
        } else {
            rec.source
        }
    }

    /// Visible neighbours of `v`, one occurrence per connecting edge
    pub fn neighbours(
        &self,
        v: VertexIndex,
        mode: NeighbourMode,
    ) -> Box<dyn Iterator<Item = VertexIndex> + '_> {
        match (mode, self.directed) {
            (NeighbourMode::Out, _) => Box::new(self.out_edges(v).map(move |e| self.edge_other(e, v))),
            (NeighbourMode::In, _) => Box::new(self.in_edges(v).map(move |e| self.edge_other(e, v))),
            (NeighbourMode::All, true) => Box::new(
                self.out_edges(v)
                    .chain(self.in_edges(v))
                    .map(move |e| self.edge_other(e, v)),
            ),
            // undirected: out already unions both directions
            (NeighbourMode::All, false) => {
                Box::new(self.out_edges(v).map(move |e| self.edge_other(e, v)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -> 1 -> 2, 2 -> 0, plus self-loop on 1
    fn triangle_with_loop() -> MultiGraph {
        let mut g = MultiGraph::with_vertices(3);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 2).unwrap();
        g.add_edge(2, 0).unwrap();
        g.add_edge(1, 1).unwrap();
        g
    }

    #[test]
    fn test_unfiltered_counts() {
        let g = triangle_with_loop();
        let view = View::unfiltered(&g, true, false);
        assert_eq!(view.num_vertices(), 3);
        assert_eq!(view.num_edges(), 4);
        assert_eq!(view.vertices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_directed_degrees() {
        let g = triangle_with_loop();
        let view = View::unfiltered(&g, true, false);
        assert_eq!(view.out_degree(0), 1);
        assert_eq!(view.in_degree(0), 1);
        // vertex 1: out 1->2 and loop, in 0->1 and loop
        assert_eq!(view.out_degree(1), 2);
        assert_eq!(view.in_degree(1), 2);
        assert_eq!(view.total_degree(1), 4);
    }

    #[test]
    fn test_reversed_swaps_roles() {
        let g = triangle_with_loop();
        let view = View::unfiltered(&g, true, true);
        // edge 0 is stored as 0 -> 1; reversed it reads 1 -> 0
        assert_eq!(view.endpoints(0), (1, 0));
        assert_eq!(view.out_degree(0), 1); // via stored in-edge 2->0
        assert_eq!(
            view.neighbours(0, NeighbourMode::Out).collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn test_undirected_unions_incidence() {
        let g = triangle_with_loop();
        let view = View::unfiltered(&g, false, false);
        // vertex 0 touches edges (0,1) and (2,0)
        assert_eq!(view.out_degree(0), 2);
        assert_eq!(view.in_degree(0), 2);
        assert_eq!(view.total_degree(0), 2);
        // self-loop counts twice
        assert_eq!(view.total_degree(1), 4);
    }

    #[test]
    fn test_masked_view_hides_endpoint_edges() {
        let g = triangle_with_loop();
        // hide vertex 2; edges (1,2) and (2,0) must vanish
        let vmask = DenseMask::new(vec![true, true, false]);
        let view = View::masked(&g, true, false, vmask, vec![true; 4]);
        assert_eq!(view.num_vertices(), 2);
        assert_eq!(view.num_edges(), 2); // (0,1) and the loop
        assert_eq!(view.out_degree(1), 1);
        assert_eq!(view.edges().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_masked_view_edge_bits() {
        let g = triangle_with_loop();
        let vmask = DenseMask::new(vec![true; 3]);
        // hide the self-loop only
        let view = View::masked(&g, true, false, vmask, vec![true, true, true, false]);
        assert_eq!(view.num_edges(), 3);
        assert_eq!(view.total_degree(1), 2);
    }

    #[test]
    fn test_neighbours_all_mode() {
        let g = triangle_with_loop();
        let view = View::unfiltered(&g, true, false);
        let mut all: Vec<_> = view.neighbours(1, NeighbourMode::All).collect();
        all.sort_unstable();
        // out: 2 and loop(1); in: 0 and loop(1)
        assert_eq!(all, vec![0, 1, 1, 2]);
    }
}
