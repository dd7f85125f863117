//! Owning multigraph container with dense, stable indices
//!
//! Vertices and edges are identified by dense `usize` indices.
//! Storage is bidirectional: both out- and in-edges of any vertex are
//! enumerable in O(deg). Parallel edges and self-loops are permitted.
//!
//! Removal compacts indices by swap-remove: the last item is moved
//! into the removed slot. Callers that keep per-index side arrays
//! (property columns) must mirror the same swap-remove, which is why
//! removal operations report exactly what was removed and in what
//! order.

use rustc_hash::FxHashSet;

/// Dense vertex index in `[0, vertex_count)`
pub type VertexIndex = usize;

/// Dense edge index in `[0, edge_count)`
pub type EdgeIndex = usize;

/// Endpoints of a stored edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    pub source: VertexIndex,
    pub target: VertexIndex,
}

/// Record of a vertex removal, listing the incident edge indices that
/// were removed first, in removal order
#[derive(Debug, Clone, Default)]
pub struct VertexRemoval {
    pub removed_edges: Vec<EdgeIndex>,
}

/// The owning multigraph store
#[derive(Debug, Clone, Default)]
pub struct MultiGraph {
    /// Edge endpoint records, indexed by edge id
    edges: Vec<EdgeRecord>,
    /// Outgoing edge ids per vertex
    out: Vec<Vec<EdgeIndex>>,
    /// Incoming edge ids per vertex
    in_: Vec<Vec<EdgeIndex>>,
}

impl MultiGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with `n` isolated vertices
    pub fn with_vertices(n: usize) -> Self {
        MultiGraph {
            edges: Vec::new(),
            out: vec![Vec::new(); n],
            in_: vec![Vec::new(); n],
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.out.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a vertex, returning its index
    pub fn add_vertex(&mut self) -> VertexIndex {
        self.out.push(Vec::new());
        self.in_.push(Vec::new());
        self.out.len() - 1
    }

    /// Add an edge from `source` to `target`, returning its index.
    /// `None` when either endpoint does not exist.
    pub fn add_edge(&mut self, source: VertexIndex, target: VertexIndex) -> Option<EdgeIndex> {
        if source >= self.vertex_count() || target >= self.vertex_count() {
            return None;
        }
        let e = self.edges.len();
        self.edges.push(EdgeRecord { source, target });
        self.out[source].push(e);
        self.in_[target].push(e);
        Some(e)
    }

    /// Endpoints of edge `e`
    pub fn endpoints(&self, e: EdgeIndex) -> Option<EdgeRecord> {
        self.edges.get(e).copied()
    }

    /// Source vertex of edge `e`
    pub fn source(&self, e: EdgeIndex) -> Option<VertexIndex> {
        self.edges.get(e).map(|r| r.source)
    }

    /// Target vertex of edge `e`
    pub fn target(&self, e: EdgeIndex) -> Option<VertexIndex> {
        self.edges.get(e).map(|r| r.target)
    }

    /// Outgoing edge ids of `v`
    pub fn out_edges(&self, v: VertexIndex) -> &[EdgeIndex] {
        self.out.get(v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Incoming edge ids of `v`
    pub fn in_edges(&self, v: VertexIndex) -> &[EdgeIndex] {
        self.in_.get(v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate all edge records in index order
    pub fn edge_records(&self) -> impl Iterator<Item = (EdgeIndex, EdgeRecord)> + '_ {
        self.edges.iter().copied().enumerate()
    }

    /// Remove edge `e`. The last edge is reindexed into slot `e`.
    /// Returns `false` when `e` does not exist.
    ///
    /// O(#incident adjacency entries of the affected endpoints).
    pub fn remove_edge(&mut self, e: EdgeIndex) -> bool {
        if e >= self.edges.len() {
            return false;
        }
        let rec = self.edges[e];
        detach(&mut self.out[rec.source], e);
        detach(&mut self.in_[rec.target], e);

        let moved_old = self.edges.len() - 1;
        self.edges.swap_remove(e);
        if e != moved_old {
            let moved = self.edges[e];
            reindex(&mut self.out[moved.source], moved_old, e);
            reindex(&mut self.in_[moved.target], moved_old, e);
        }
        true
    }

    /// Remove vertex `v` along with its incident edges. The last
    /// vertex is reindexed into slot `v`. Returns the removed edge
    /// indices in removal order so side arrays can mirror the same
    /// sequence of swap-removes.
    pub fn remove_vertex(&mut self, v: VertexIndex) -> Option<VertexRemoval> {
        if v >= self.vertex_count() {
            return None;
        }
        let mut removal = VertexRemoval::default();
        while let Some(&e) = self.out[v].first() {
            self.remove_edge(e);
            removal.removed_edges.push(e);
        }
        while let Some(&e) = self.in_[v].first() {
            self.remove_edge(e);
            removal.removed_edges.push(e);
        }

        let moved_old = self.vertex_count() - 1;
        if v != moved_old {
            // rewrite endpoint references to the vertex being moved
            for &e in &self.out[moved_old] {
                self.edges[e].source = v;
            }
            for &e in &self.in_[moved_old] {
                self.edges[e].target = v;
            }
        }
        self.out.swap_remove(v);
        self.in_.swap_remove(v);
        Some(removal)
    }

    /// Edge indices that duplicate an earlier edge with the same
    /// ordered (source, target) pair, in ascending index order
    pub fn parallel_duplicates(&self) -> Vec<EdgeIndex> {
        let mut seen = FxHashSet::default();
        let mut dups = Vec::new();
        for (e, rec) in self.edges.iter().enumerate() {
            if !seen.insert((rec.source, rec.target)) {
                dups.push(e);
            }
        }
        dups
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.edges.clear();
        self.out.clear();
        self.in_.clear();
    }
}

/// Remove one occurrence of `e` from an adjacency list
fn detach(adj: &mut Vec<EdgeIndex>, e: EdgeIndex) {
    if let Some(pos) = adj.iter().position(|&x| x == e) {
        adj.swap_remove(pos);
    }
}

/// Replace one occurrence of `old` with `new` in an adjacency list
fn reindex(adj: &mut [EdgeIndex], old: EdgeIndex, new: EdgeIndex) {
    if let Some(slot) = adj.iter_mut().find(|x| **x == old) {
        *slot = new;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> MultiGraph {
        let mut g = MultiGraph::with_vertices(n);
        for v in 1..n {
            g.add_edge(v - 1, v).unwrap();
        }
        g
    }

    #[test]
    fn test_add_vertex_and_edge() {
        let mut g = MultiGraph::new();
        let a = g.add_vertex();
        let b = g.add_vertex();
        assert_eq!((a, b), (0, 1));

        let e = g.add_edge(a, b).unwrap();
        assert_eq!(e, 0);
        assert_eq!(g.source(e), Some(a));
        assert_eq!(g.target(e), Some(b));
        assert_eq!(g.out_edges(a), &[e]);
        assert_eq!(g.in_edges(b), &[e]);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_add_edge_invalid_endpoint() {
        let mut g = MultiGraph::with_vertices(1);
        assert!(g.add_edge(0, 5).is_none());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_parallel_edges_and_self_loops() {
        let mut g = MultiGraph::with_vertices(2);
        g.add_edge(0, 1).unwrap();
        g.add_edge(0, 1).unwrap();
        g.add_edge(0, 0).unwrap();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.out_edges(0).len(), 3);
        assert_eq!(g.in_edges(0).len(), 1);
        assert_eq!(g.in_edges(1).len(), 2);
    }

    #[test]
    fn test_remove_edge_reindexes_last() {
        let mut g = path_graph(4); // edges 0:(0,1) 1:(1,2) 2:(2,3)
        assert!(g.remove_edge(0));
        assert_eq!(g.edge_count(), 2);
        // former edge 2 now occupies index 0
        assert_eq!(g.endpoints(0).unwrap(), EdgeRecord { source: 2, target: 3 });
        assert_eq!(g.out_edges(2), &[0]);
        assert_eq!(g.in_edges(3), &[0]);
        // untouched edge keeps its id
        assert_eq!(g.endpoints(1).unwrap(), EdgeRecord { source: 1, target: 2 });
    }

    #[test]
    fn test_remove_last_edge() {
        let mut g = path_graph(3);
        assert!(g.remove_edge(1));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.endpoints(0).unwrap(), EdgeRecord { source: 0, target: 1 });
    }

    #[test]
    fn test_remove_vertex_removes_incident_edges() {
        let mut g = path_graph(4);
        let removal = g.remove_vertex(1).unwrap();
        assert_eq!(removal.removed_edges.len(), 2);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 1);
        // surviving edge was (2,3); vertex 3 moved into slot 1
        let rec = g.endpoints(0).unwrap();
        assert_eq!(rec, EdgeRecord { source: 2, target: 1 });
    }

    #[test]
    fn test_remove_vertex_with_self_loop() {
        let mut g = MultiGraph::with_vertices(3);
        g.add_edge(1, 1).unwrap();
        g.add_edge(0, 2).unwrap();
        let removal = g.remove_vertex(1).unwrap();
        assert_eq!(removal.removed_edges.len(), 1);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
        // vertex 2 moved into slot 1
        assert_eq!(g.endpoints(0).unwrap(), EdgeRecord { source: 0, target: 1 });
    }

    #[test]
    fn test_parallel_duplicates() {
        let mut g = MultiGraph::with_vertices(2);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 0).unwrap(); // reversed pair is not a duplicate
        g.add_edge(0, 1).unwrap();
        g.add_edge(0, 1).unwrap();
        assert_eq!(g.parallel_duplicates(), vec![2, 3]);
    }

    #[test]
    fn test_clear() {
        let mut g = path_graph(3);
        g.clear();
        assert_eq!(g.vertex_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }
}
