//! Connected-component statistics
//!
//! Directed views use weak connectivity (edge direction ignored), so
//! one pass of union-find over the visible edge list covers both
//! cases.

use rustc_hash::FxHashMap;

use crate::filter::view::{Mask, View};

use super::degree::{bin, Hist};

/// Disjoint-set forest with path halving and union by size
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Histogram over component sizes (in visible vertices) of the
/// connected components of the view
pub(crate) fn component_size_histogram<M: Mask>(view: &View<'_, M>) -> Hist {
    let mut forest = UnionFind::new(view.graph().vertex_count());
    for e in view.edges() {
        let (u, v) = view.endpoints(e);
        forest.union(u, v);
    }

    let mut sizes: FxHashMap<usize, u64> = FxHashMap::default();
    let visible: Vec<_> = view.vertices().collect();
    for v in visible {
        *sizes.entry(forest.find(v)).or_insert(0) += 1;
    }

    let mut hist = Hist::default();
    for count in sizes.values() {
        *hist.entry(bin(*count as f64)).or_insert(0) += 1;
    }
    hist
}
