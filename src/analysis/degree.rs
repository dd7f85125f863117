//! Degree selectors and degree histograms
//!
//! Analytics are parameterized by a degree selector: in-, out-, or
//! total degree, or a named numeric vertex property used as a
//! pseudo-degree. The selector is a tagged variant resolved once at
//! the call boundary into an accessor; inner loops dispatch on a
//! resolved tag, never on property names.

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::error::{GraphError, GraphResult};
use crate::filter::view::{Mask, View};
use crate::graph::{PropertyColumn, PropertyKind, PropertyRegistry, VertexIndex};

/// Histogram over scalar keys
pub type Hist = FxHashMap<OrderedFloat<f64>, u64>;

/// Histogram over pairs of scalar keys
pub type Hist2d = FxHashMap<(OrderedFloat<f64>, OrderedFloat<f64>), u64>;

/// Histogram over triples of scalar keys
pub type Hist3d = FxHashMap<(OrderedFloat<f64>, OrderedFloat<f64>, OrderedFloat<f64>), u64>;

/// Per-bucket (mean, standard error) aggregation keyed by scalar
pub type AvgCorr = FxHashMap<OrderedFloat<f64>, (f64, f64)>;

/// Histogram key from a float value
#[inline]
pub(crate) fn bin(value: f64) -> OrderedFloat<f64> {
    OrderedFloat(value)
}

/// Choice of degree used by an estimator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegreeSelector {
    /// Visible in-degree (swapped with out when the view is reversed)
    In,
    /// Visible out-degree
    Out,
    /// All visible incident edges
    Total,
    /// A named numeric vertex property read as a pseudo-degree
    Scalar(String),
}

impl DegreeSelector {
    pub fn scalar(name: impl Into<String>) -> Self {
        DegreeSelector::Scalar(name.into())
    }
}

/// A selector resolved against the registry for one call
#[derive(Debug)]
pub(crate) enum DegreeFn<'a> {
    In,
    Out,
    Total,
    Scalar(&'a PropertyColumn),
}

impl<'a> DegreeFn<'a> {
    /// Resolve a selector, borrowing the scalar column when one is
    /// named. Missing property is `NotFound`, a string property is
    /// `TypeMismatch`.
    pub fn resolve(
        selector: &DegreeSelector,
        registry: &'a PropertyRegistry,
    ) -> GraphResult<DegreeFn<'a>> {
        Ok(match selector {
            DegreeSelector::In => DegreeFn::In,
            DegreeSelector::Out => DegreeFn::Out,
            DegreeSelector::Total => DegreeFn::Total,
            DegreeSelector::Scalar(name) => {
                DegreeFn::Scalar(registry.numeric_checked(PropertyKind::Vertex, name)?)
            }
        })
    }

    /// Degree value of `v` under the view
    #[inline]
    pub fn eval<M: Mask>(&self, view: &View<'_, M>, v: VertexIndex) -> f64 {
        match self {
            DegreeFn::In => view.in_degree(v) as f64,
            DegreeFn::Out => view.out_degree(v) as f64,
            DegreeFn::Total => view.total_degree(v) as f64,
            DegreeFn::Scalar(column) => column
                .numeric(v)
                .expect("vertex property column sized to vertex count"),
        }
    }
}

/// Count visible vertices bucketed by degree
pub(crate) fn degree_histogram<M: Mask>(view: &View<'_, M>, deg: &DegreeFn<'_>) -> Hist {
    let mut hist = Hist::default();
    for v in view.vertices() {
        *hist.entry(bin(deg.eval(view, v))).or_insert(0) += 1;
    }
    hist
}

/// 2D histogram over (in-degree, out-degree) of visible vertices.
/// Only defined on directed views.
pub(crate) fn combined_degree_histogram<M: Mask>(view: &View<'_, M>) -> GraphResult<Hist2d> {
    if !view.is_directed() {
        return Err(GraphError::InvalidArgument(
            "combined in/out degree histogram requires a directed view".to_string(),
        ));
    }
    let mut hist = Hist2d::default();
    for v in view.vertices() {
        let key = (bin(view.in_degree(v) as f64), bin(view.out_degree(v) as f64));
        *hist.entry(key).or_insert(0) += 1;
    }
    Ok(hist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MultiGraph, ScalarValue};

    /// directed 4-cycle
    fn cycle4() -> MultiGraph {
        let mut g = MultiGraph::with_vertices(4);
        for v in 0..4 {
            g.add_edge(v, (v + 1) % 4).unwrap();
        }
        g
    }

    #[test]
    fn test_degree_histogram_cycle() {
        let g = cycle4();
        let view = View::unfiltered(&g, true, false);
        let hist = degree_histogram(&view, &DegreeFn::In);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[&bin(1.0)], 4);

        let hist = degree_histogram(&view, &DegreeFn::Total);
        assert_eq!(hist[&bin(2.0)], 4);
    }

    #[test]
    fn test_scalar_selector() {
        let g = cycle4();
        let mut registry = PropertyRegistry::new();
        registry
            .insert(PropertyKind::Vertex, "w", ScalarValue::Float(0.0), 4)
            .unwrap();
        for v in 0..4 {
            registry
                .get_mut(PropertyKind::Vertex, "w")
                .unwrap()
                .set(v, ScalarValue::Float((v % 2) as f64))
                .unwrap();
        }

        let selector = DegreeSelector::scalar("w");
        let deg = DegreeFn::resolve(&selector, &registry).unwrap();
        let view = View::unfiltered(&g, true, false);
        let hist = degree_histogram(&view, &deg);
        assert_eq!(hist[&bin(0.0)], 2);
        assert_eq!(hist[&bin(1.0)], 2);
    }

    #[test]
    fn test_scalar_selector_errors() {
        let registry = PropertyRegistry::new();
        let err = DegreeFn::resolve(&DegreeSelector::scalar("ghost"), &registry).unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
    }

    #[test]
    fn test_combined_histogram_directed_only() {
        let g = cycle4();
        let view = View::unfiltered(&g, false, false);
        assert!(matches!(
            combined_degree_histogram(&view),
            Err(GraphError::InvalidArgument(_))
        ));

        let view = View::unfiltered(&g, true, false);
        let hist = combined_degree_histogram(&view).unwrap();
        assert_eq!(hist[&(bin(1.0), bin(1.0))], 4);
    }

    #[test]
    fn test_reversed_swaps_in_and_out() {
        let mut g = MultiGraph::with_vertices(2);
        g.add_edge(0, 1).unwrap();
        let forward = View::unfiltered(&g, true, false);
        let reversed = View::unfiltered(&g, true, true);
        let fwd_out = degree_histogram(&forward, &DegreeFn::Out);
        let rev_in = degree_histogram(&reversed, &DegreeFn::In);
        assert_eq!(fwd_out, rev_in);
    }
}
