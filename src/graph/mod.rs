//! Multigraph storage: the owning container, property columns, and
//! the named property registry

pub mod property;
pub mod registry;
pub mod store;

pub use property::{PropertyColumn, ScalarType, ScalarValue};
pub use registry::{PropertyKind, PropertyRegistry};
pub use store::{EdgeIndex, EdgeRecord, MultiGraph, VertexIndex, VertexRemoval};
