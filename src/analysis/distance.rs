//! Geodesic distance statistics
//!
//! Both estimators run one breadth-first search per visible source
//! vertex, fanned out across a rayon pool. The view is read-only for
//! the whole call, so the fan-out stays within the library's
//! single-threaded-mutation contract. The cooperative abort flag is
//! polled once per source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::{GraphError, GraphResult};
use crate::filter::view::{Mask, View};
use crate::graph::VertexIndex;

/// Average geodesic distance over reachable ordered vertex pairs
///
/// Unreachable pairs are excluded from the mean; `reachable_fraction`
/// reports how much of the ordered pair space the mean covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub mean: f64,
    pub reachable_fraction: f64,
}

const UNSEEN: u32 = u32::MAX;

/// Distances from `source` to every visible vertex, by BFS over
/// visible out-edges. The buffer is reused across calls of one task.
fn bfs<M: Mask>(
    view: &View<'_, M>,
    source: VertexIndex,
    dist: &mut Vec<u32>,
    queue: &mut VecDeque<VertexIndex>,
) {
    dist.clear();
    dist.resize(view.graph().vertex_count(), UNSEEN);
    queue.clear();
    dist[source] = 0;
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        let d = dist[u];
        for e in view.out_edges(u) {
            let w = view.edge_other(e, u);
            if dist[w] == UNSEEN {
                dist[w] = d + 1;
                queue.push_back(w);
            }
        }
    }
}

/// Per-source accumulation shared by both distance estimators
fn sweep<M, F, T>(view: &View<'_, M>, abort: &AtomicBool, fold: F) -> GraphResult<Vec<T>>
where
    M: Mask + Sync,
    F: Fn(&[u32]) -> T + Sync,
    T: Send,
{
    let sources: Vec<VertexIndex> = view.vertices().collect();
    sources
        .par_iter()
        .map_init(
            || (Vec::new(), VecDeque::new()),
            |(dist, queue), &s| {
                if abort.load(Ordering::Relaxed) {
                    return Err(GraphError::Aborted);
                }
                bfs(view, s, dist, queue);
                Ok(fold(dist))
            },
        )
        .collect()
}

/// Mean geodesic distance over ordered pairs of distinct visible
/// vertices; unreachable pairs are excluded and reported through the
/// reachable fraction
pub(crate) fn average_distance<M: Mask + Sync>(
    view: &View<'_, M>,
    abort: &AtomicBool,
) -> GraphResult<DistanceStats> {
    let nv = view.num_vertices();
    if nv < 2 {
        return Err(GraphError::InvalidArgument(
            "average distance needs at least two visible vertices".to_string(),
        ));
    }

    let per_source = sweep(view, abort, |dist| {
        let mut sum = 0u64;
        let mut reached = 0u64;
        for v in view.vertices() {
            let d = dist[v];
            if d != UNSEEN && d > 0 {
                sum += d as u64;
                reached += 1;
            }
        }
        (sum, reached)
    })?;

    let (sum, reached) = per_source
        .into_iter()
        .fold((0u64, 0u64), |(s, r), (ds, dr)| (s + ds, r + dr));
    if reached == 0 {
        return Err(GraphError::Degenerate(
            "no visible vertex pair is connected".to_string(),
        ));
    }
    let pairs = (nv * (nv - 1)) as f64;
    Ok(DistanceStats {
        mean: sum as f64 / reached as f64,
        reachable_fraction: reached as f64 / pairs,
    })
}

/// Mean of 1/d over all ordered pairs of distinct visible vertices;
/// unreachable pairs contribute zero
pub(crate) fn average_harmonic_distance<M: Mask + Sync>(
    view: &View<'_, M>,
    abort: &AtomicBool,
) -> GraphResult<f64> {
    let nv = view.num_vertices();
    if nv < 2 {
        return Err(GraphError::InvalidArgument(
            "harmonic distance needs at least two visible vertices".to_string(),
        ));
    }

    let per_source = sweep(view, abort, |dist| {
        let mut sum = 0.0;
        for v in view.vertices() {
            let d = dist[v];
            if d != UNSEEN && d > 0 {
                sum += 1.0 / d as f64;
            }
        }
        sum
    })?;

    let pairs = (nv * (nv - 1)) as f64;
    Ok(per_source.into_iter().sum::<f64>() / pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::view::View;
    use crate::graph::MultiGraph;

    fn no_abort() -> AtomicBool {
        AtomicBool::new(false)
    }

    fn directed_cycle(n: usize) -> MultiGraph {
        let mut g = MultiGraph::with_vertices(n);
        for v in 0..n {
            g.add_edge(v, (v + 1) % n).unwrap();
        }
        g
    }

    #[test]
    fn test_directed_cycle_distance() {
        let g = directed_cycle(4);
        let view = View::unfiltered(&g, true, false);
        let stats = average_distance(&view, &no_abort()).unwrap();
        // each source reaches the others at 1, 2, 3
        assert!((stats.mean - 2.0).abs() < 1e-12);
        assert!((stats.reachable_fraction - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unreachable_pairs_reported() {
        // 0 -> 1, 2 isolated
        let mut g = MultiGraph::with_vertices(3);
        g.add_edge(0, 1).unwrap();
        let view = View::unfiltered(&g, true, false);
        let stats = average_distance(&view, &no_abort()).unwrap();
        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert!((stats.reachable_fraction - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_harmonic_distance_path() {
        let mut g = MultiGraph::with_vertices(5);
        for v in 1..5 {
            g.add_edge(v - 1, v).unwrap();
        }
        let view = View::unfiltered(&g, false, false);
        let h = average_harmonic_distance(&view, &no_abort()).unwrap();
        // ordered pairs at distance 1,2,3,4 come in 8,6,4,2
        let expected = (8.0 + 6.0 / 2.0 + 4.0 / 3.0 + 2.0 / 4.0) / 20.0;
        assert!((h - expected).abs() < 1e-12);
    }

    #[test]
    fn test_fully_disconnected_is_degenerate() {
        let g = MultiGraph::with_vertices(3);
        let view = View::unfiltered(&g, false, false);
        assert!(matches!(
            average_distance(&view, &no_abort()),
            Err(GraphError::Degenerate(_))
        ));
        // harmonic is defined: every pair contributes zero
        let h = average_harmonic_distance(&view, &no_abort()).unwrap();
        assert_eq!(h, 0.0);
    }

    #[test]
    fn test_single_vertex_invalid() {
        let g = MultiGraph::with_vertices(1);
        let view = View::unfiltered(&g, false, false);
        assert!(matches!(
            average_distance(&view, &no_abort()),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_abort_flag() {
        let g = directed_cycle(8);
        let view = View::unfiltered(&g, true, false);
        let abort = AtomicBool::new(true);
        assert!(matches!(
            average_distance(&view, &abort),
            Err(GraphError::Aborted)
        ));
    }
}
