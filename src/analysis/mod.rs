//! Statistical estimators over a filtered graph view
//!
//! Every estimator is a pure function of the view: it borrows the
//! projection for the duration of one call and returns plain values
//! (histograms, curves, scalars). The public entry points live on
//! [`GraphState`](crate::GraphState), which resolves selectors and
//! filters before dispatching here.

pub mod clustering;
pub mod components;
pub mod correlation;
pub mod degree;
pub mod distance;

pub use degree::{AvgCorr, DegreeSelector, Hist, Hist2d, Hist3d};
pub use distance::DistanceStats;
