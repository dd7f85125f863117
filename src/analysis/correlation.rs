//! Degree correlation estimators
//!
//! Everything here is a single pass over the visible edge or vertex
//! list of the view. On undirected views edge-keyed estimators count
//! both orderings of every edge so the resulting histograms stay
//! symmetric in their axes.

use crate::error::{GraphError, GraphResult};
use crate::filter::view::{Mask, NeighbourMode, View};
use crate::graph::PropertyColumn;

use super::degree::{bin, AvgCorr, DegreeFn, Hist2d, Hist3d};

/// 2D histogram over (d1(source), d2(target)) of every visible edge
pub(crate) fn degree_correlation_histogram<M: Mask>(
    view: &View<'_, M>,
    d1: &DegreeFn<'_>,
    d2: &DegreeFn<'_>,
) -> Hist2d {
    let mut hist = Hist2d::default();
    for e in view.edges() {
        let (u, v) = view.endpoints(e);
        *hist
            .entry((bin(d1.eval(view, u)), bin(d2.eval(view, v))))
            .or_insert(0) += 1;
        if !view.is_directed() {
            *hist
                .entry((bin(d1.eval(view, v)), bin(d2.eval(view, u))))
                .or_insert(0) += 1;
        }
    }
    hist
}

/// 3D histogram over (d1(source), edge scalar, d2(target))
pub(crate) fn edge_degree_correlation_histogram<M: Mask>(
    view: &View<'_, M>,
    d1: &DegreeFn<'_>,
    edge_scalar: &PropertyColumn,
    d2: &DegreeFn<'_>,
) -> Hist3d {
    let mut hist = Hist3d::default();
    for e in view.edges() {
        let (u, v) = view.endpoints(e);
        let w = bin(edge_scalar
            .numeric(e)
            .expect("edge property column sized to edge count"));
        *hist
            .entry((bin(d1.eval(view, u)), w, bin(d2.eval(view, v))))
            .or_insert(0) += 1;
        if !view.is_directed() {
            *hist
                .entry((bin(d1.eval(view, v)), w, bin(d2.eval(view, u))))
                .or_insert(0) += 1;
        }
    }
    hist
}

/// 2D histogram over (degree, vertex scalar) of visible vertices
pub(crate) fn vertex_degree_scalar_correlation_histogram<M: Mask>(
    view: &View<'_, M>,
    deg: &DegreeFn<'_>,
    vertex_scalar: &PropertyColumn,
) -> Hist2d {
    let mut hist = Hist2d::default();
    for v in view.vertices() {
        let s = bin(vertex_scalar
            .numeric(v)
            .expect("vertex property column sized to vertex count"));
        *hist.entry((bin(deg.eval(view, v)), s)).or_insert(0) += 1;
    }
    hist
}

/// Average degree of the nearest neighbours, as a function of the
/// origin degree.
///
/// For every visible vertex with at least one visible neighbour the
/// mean neighbour degree is computed first (one term per connecting
/// edge); those vertex-means are then aggregated per origin-degree
/// bucket into (mean, standard error of the mean). Directed views
/// walk out-neighbours, undirected views all neighbours.
pub(crate) fn average_nearest_neighbours_degree<M: Mask>(
    view: &View<'_, M>,
    origin_deg: &DegreeFn<'_>,
    neighbour_deg: &DegreeFn<'_>,
) -> AvgCorr {
    let mode = if view.is_directed() {
        NeighbourMode::Out
    } else {
        NeighbourMode::All
    };

    // bucket -> (sum of vertex-means, sum of squares, count)
    let mut acc: rustc_hash::FxHashMap<ordered_float::OrderedFloat<f64>, (f64, f64, u64)> =
        Default::default();
    for u in view.vertices() {
        let mut sum = 0.0;
        let mut count = 0u64;
        for v in view.neighbours(u, mode) {
            sum += neighbour_deg.eval(view, v);
            count += 1;
        }
        if count == 0 {
            continue; // isolated vertices contribute nothing
        }
        let vertex_mean = sum / count as f64;
        let entry = acc.entry(bin(origin_deg.eval(view, u))).or_insert((0.0, 0.0, 0));
        entry.0 += vertex_mean;
        entry.1 += vertex_mean * vertex_mean;
        entry.2 += 1;
    }

    acc.into_iter()
        .map(|(k, (s, s2, n))| {
            let n_f = n as f64;
            let mean = s / n_f;
            let var = (s2 / n_f - mean * mean).max(0.0);
            (k, (mean, (var / n_f).sqrt()))
        })
        .collect()
}

/// Pearson correlation of endpoint degrees across the visible edge
/// list (Newman's assortativity coefficient).
///
/// Undirected views include both orderings of every edge, which
/// canonicalizes the pair list. Zero variance on either axis is
/// reported as `Degenerate`.
pub(crate) fn assortativity_coefficient<M: Mask>(
    view: &View<'_, M>,
    deg: &DegreeFn<'_>,
) -> GraphResult<f64> {
    let mut n = 0u64;
    let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let mut push = |x: f64, y: f64| {
        n += 1;
        sx += x;
        sy += y;
        sxx += x * x;
        syy += y * y;
        sxy += x * y;
    };

    for e in view.edges() {
        let (u, v) = view.endpoints(e);
        let (x, y) = (deg.eval(view, u), deg.eval(view, v));
        push(x, y);
        if !view.is_directed() {
            push(y, x);
        }
    }

    if n == 0 {
        return Err(GraphError::InvalidArgument(
            "assortativity is undefined on a view with no visible edges".to_string(),
        ));
    }
    let n_f = n as f64;
    let var_x = sxx / n_f - (sx / n_f) * (sx / n_f);
    let var_y = syy / n_f - (sy / n_f) * (sy / n_f);
    if var_x <= 0.0 || var_y <= 0.0 {
        return Err(GraphError::Degenerate(
            "endpoint degrees have zero variance".to_string(),
        ));
    }
    let cov = sxy / n_f - (sx / n_f) * (sy / n_f);
    Ok(cov / (var_x * var_y).sqrt())
}
