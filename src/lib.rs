//! Gravis
//!
//! A library for statistical analysis and manipulation of large
//! directed and undirected multigraphs: degree distributions and
//! correlations, assortativity, clustering coefficients, component
//! and distance statistics, correlated configurational-model
//! generation, force-directed layouts, and plain-text persistence.
//!
//! Every analytic operates through a filtered view of the graph:
//! vertex and edge visibility predicates (numeric ranges over named
//! properties, or caller-supplied functions) compose with direction
//! reversal and directed/undirected reinterpretation without touching
//! the underlying storage.
//!
//! # Example
//!
//! ```rust
//! use gravis::{DegreeSelector, GraphState};
//!
//! // build an undirected triangle
//! let mut state = GraphState::new();
//! state.set_directed(false);
//! state.add_vertices(3);
//! state.add_edge(0, 1).unwrap();
//! state.add_edge(1, 2).unwrap();
//! state.add_edge(2, 0).unwrap();
//!
//! let hist = state.degree_histogram(&DegreeSelector::Total).unwrap();
//! assert_eq!(hist[&ordered_float::OrderedFloat(2.0)], 3);
//! assert_eq!(state.global_clustering().unwrap(), 1.0);
//! ```

pub mod analysis;
pub mod error;
pub mod filter;
pub mod generate;
pub mod graph;
pub mod io;
pub mod layout;
pub mod state;

pub use analysis::{AvgCorr, DegreeSelector, DistanceStats, Hist, Hist2d, Hist3d};
pub use error::{GraphError, GraphResult};
pub use filter::{FilterConfig, ItemPredicate};
pub use generate::{
    EdgeCorrelation, GenerationOptions, GenerationReport, JointDegreeDistribution,
};
pub use graph::{
    EdgeIndex, MultiGraph, PropertyKind, ScalarType, ScalarValue, VertexIndex,
};
pub use state::GraphState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
