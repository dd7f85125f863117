//! Local and global clustering coefficients

use rustc_hash::FxHashSet;

use crate::error::{GraphError, GraphResult};
use crate::filter::view::{Mask, NeighbourMode, View};
use crate::graph::VertexIndex;

use super::degree::{bin, Hist};

/// Distinct visible neighbours of `v`, excluding `v` itself
fn neighbour_set<M: Mask>(view: &View<'_, M>, v: VertexIndex) -> FxHashSet<VertexIndex> {
    view.neighbours(v, NeighbourMode::All)
        .filter(|&w| w != v)
        .collect()
}

/// Number of connected (ordered on directed views, unordered on
/// undirected) neighbour pairs; parallel edges count once per
/// direction
fn connected_neighbour_pairs<M: Mask>(
    view: &View<'_, M>,
    neighbours: &FxHashSet<VertexIndex>,
) -> usize {
    let mut pairs: FxHashSet<(VertexIndex, VertexIndex)> = FxHashSet::default();
    for &a in neighbours {
        for e in view.out_edges(a) {
            let b = view.edge_other(e, a);
            if b == a || !neighbours.contains(&b) {
                continue;
            }
            // out_edges already orients the pair a -> b
            let key = if view.is_directed() {
                (a, b)
            } else {
                (a.min(b), a.max(b))
            };
            pairs.insert(key);
        }
    }
    pairs.len()
}

/// Local clustering coefficient of `v`: the density of edges among
/// its visible neighbours. Zero when fewer than two neighbours.
pub(crate) fn local_clustering<M: Mask>(view: &View<'_, M>, v: VertexIndex) -> f64 {
    let neighbours = neighbour_set(view, v);
    let k = neighbours.len();
    if k < 2 {
        return 0.0;
    }
    let links = connected_neighbour_pairs(view, &neighbours) as f64;
    let possible = if view.is_directed() {
        (k * (k - 1)) as f64
    } else {
        (k * (k - 1)) as f64 / 2.0
    };
    links / possible
}

/// Histogram of local clustering coefficients over visible vertices
pub(crate) fn local_clustering_histogram<M: Mask>(view: &View<'_, M>) -> Hist {
    let mut hist = Hist::default();
    for v in view.vertices() {
        *hist.entry(bin(local_clustering(view, v))).or_insert(0) += 1;
    }
    hist
}

/// Local clustering of every vertex, indexed by vertex id; invisible
/// vertices read 0
pub(crate) fn local_clustering_values<M: Mask>(view: &View<'_, M>) -> Vec<f64> {
    let mut values = vec![0.0; view.graph().vertex_count()];
    for v in view.vertices() {
        values[v] = local_clustering(view, v);
    }
    values
}

/// Global clustering coefficient: 3 x triangles over connected
/// triples on undirected views, the corresponding transitivity over
/// ordered neighbour pairs on directed views. `Degenerate` when the
/// view has no triples at all.
pub(crate) fn global_clustering<M: Mask>(view: &View<'_, M>) -> GraphResult<f64> {
    let mut triples = 0u64;
    let mut closed = 0u64;
    for v in view.vertices() {
        let neighbours = neighbour_set(view, v);
        let k = neighbours.len() as u64;
        if k < 2 {
            continue;
        }
        triples += if view.is_directed() {
            k * (k - 1)
        } else {
            k * (k - 1) / 2
        };
        closed += connected_neighbour_pairs(view, &neighbours) as u64;
    }
    if triples == 0 {
        return Err(GraphError::Degenerate(
            "no connected triples in the view".to_string(),
        ));
    }
    Ok(closed as f64 / triples as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::view::View;
    use crate::graph::MultiGraph;

    fn complete(n: usize) -> MultiGraph {
        let mut g = MultiGraph::with_vertices(n);
        for u in 0..n {
            for v in u + 1..n {
                g.add_edge(u, v).unwrap();
            }
        }
        g
    }

    fn path(n: usize) -> MultiGraph {
        let mut g = MultiGraph::with_vertices(n);
        for v in 1..n {
            g.add_edge(v - 1, v).unwrap();
        }
        g
    }

    #[test]
    fn test_complete_graph_clusters_fully() {
        let g = complete(4);
        let view = View::unfiltered(&g, false, false);
        for v in 0..4 {
            assert!((local_clustering(&view, v) - 1.0).abs() < 1e-12);
        }
        assert!((global_clustering(&view).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_path_has_no_triangles() {
        let g = path(5);
        let view = View::unfiltered(&g, false, false);
        let hist = local_clustering_histogram(&view);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[&bin(0.0)], 5);
        assert_eq!(global_clustering(&view).unwrap(), 0.0);
    }

    #[test]
    fn test_single_triangle() {
        // triangle plus a pendant vertex on 0
        let mut g = complete(3);
        let p = g.add_vertex();
        g.add_edge(0, p).unwrap();
        let view = View::unfiltered(&g, false, false);

        // vertex 0 has neighbours {1, 2, p}, one connected pair of 3
        assert!((local_clustering(&view, 0) - 1.0 / 3.0).abs() < 1e-12);
        assert!((local_clustering(&view, 1) - 1.0).abs() < 1e-12);
        assert_eq!(local_clustering(&view, p), 0.0);

        // triples: v0: 3 pairs, v1: 1, v2: 1; closed: 1 + 1 + 1
        assert!((global_clustering(&view).unwrap() - 3.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_edges_count_once() {
        let mut g = complete(3);
        g.add_edge(1, 2).unwrap(); // duplicate one side
        let view = View::unfiltered(&g, false, false);
        assert!((local_clustering(&view, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_self_loop_ignored() {
        let mut g = complete(3);
        g.add_edge(0, 0).unwrap();
        let view = View::unfiltered(&g, false, false);
        assert!((local_clustering(&view, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_directed_transitivity_complete() {
        // complete directed graph on 3 vertices (both directions)
        let mut g = MultiGraph::with_vertices(3);
        for u in 0..3 {
            for v in 0..3 {
                if u != v {
                    g.add_edge(u, v).unwrap();
                }
            }
        }
        let view = View::unfiltered(&g, true, false);
        assert!((global_clustering(&view).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_triples_is_degenerate() {
        let g = path(2);
        let view = View::unfiltered(&g, false, false);
        assert!(matches!(
            global_clustering(&view),
            Err(GraphError::Degenerate(_))
        ));
    }
}
