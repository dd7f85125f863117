//! Plain-text persistence of the whole graph state
//!
//! One JSON document per graph: direction flags, the edge list, every
//! named property column, and the range-filter configuration (generic
//! predicates are not representable on disk and are not persisted).
//! Floats are written in shortest round-trip form, so a write/read
//! cycle reproduces the state exactly.
//!
//! Reading is transactional: the document is parsed and validated
//! into a fresh state before the caller swaps it in, so a malformed
//! file leaves the previous state untouched.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::filter::FilterConfig;
use crate::graph::{MultiGraph, PropertyColumn, PropertyKind, PropertyRegistry};

pub(crate) const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredKind {
    Vertex,
    Edge,
}

impl From<PropertyKind> for StoredKind {
    fn from(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Vertex => StoredKind::Vertex,
            PropertyKind::Edge => StoredKind::Edge,
        }
    }
}

impl From<StoredKind> for PropertyKind {
    fn from(kind: StoredKind) -> Self {
        match kind {
            StoredKind::Vertex => PropertyKind::Vertex,
            StoredKind::Edge => PropertyKind::Edge,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredProperty {
    kind: StoredKind,
    name: String,
    #[serde(flatten)]
    column: PropertyColumn,
    #[serde(default)]
    index: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredFilter {
    property: Option<String>,
    range: Option<(f64, f64)>,
}

impl StoredFilter {
    fn of(config: &FilterConfig) -> Self {
        StoredFilter {
            property: config.property().map(str::to_string),
            range: config.range(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredGraph {
    schema_version: u32,
    directed: bool,
    reversed: bool,
    vertex_count: usize,
    edges: Vec<(usize, usize)>,
    properties: Vec<StoredProperty>,
    vertex_filter: StoredFilter,
    edge_filter: StoredFilter,
}

/// Everything read back from disk, ready to be swapped into a state
#[derive(Debug)]
pub(crate) struct LoadedState {
    pub graph: MultiGraph,
    pub registry: PropertyRegistry,
    pub directed: bool,
    pub reversed: bool,
    pub vertex_filter: FilterConfig,
    pub edge_filter: FilterConfig,
}

/// Serialize the full state to `path`
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_to_file(
    path: &Path,
    graph: &MultiGraph,
    registry: &PropertyRegistry,
    directed: bool,
    reversed: bool,
    vertex_filter: &FilterConfig,
    edge_filter: &FilterConfig,
) -> GraphResult<()> {
    let mut properties = Vec::new();
    for kind in [PropertyKind::Vertex, PropertyKind::Edge] {
        for (name, entry) in registry.entries(kind) {
            properties.push(StoredProperty {
                kind: kind.into(),
                name: name.clone(),
                column: entry.column.clone(),
                index: entry.is_index,
            });
        }
    }

    let stored = StoredGraph {
        schema_version: SCHEMA_VERSION,
        directed,
        reversed,
        vertex_count: graph.vertex_count(),
        edges: graph
            .edge_records()
            .map(|(_, rec)| (rec.source, rec.target))
            .collect(),
        properties,
        vertex_filter: StoredFilter::of(vertex_filter),
        edge_filter: StoredFilter::of(edge_filter),
    };

    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), &stored)?;
    debug!(path = %path.display(), "graph state written");
    Ok(())
}

/// Parse and validate a state document
pub(crate) fn read_from_file(path: &Path) -> GraphResult<LoadedState> {
    let file = File::open(path)?;
    let stored: StoredGraph = serde_json::from_reader(BufReader::new(file))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(GraphError::InvalidArgument(format!(
            "unsupported graph file schema version {}",
            stored.schema_version
        )));
    }

    let mut graph = MultiGraph::with_vertices(stored.vertex_count);
    for &(source, target) in &stored.edges {
        graph.add_edge(source, target).ok_or_else(|| {
            GraphError::InvalidArgument(format!(
                "edge ({}, {}) references a vertex beyond count {}",
                source, target, stored.vertex_count
            ))
        })?;
    }

    let mut registry = PropertyRegistry::new();
    for prop in stored.properties {
        let kind: PropertyKind = prop.kind.into();
        let expected = match kind {
            PropertyKind::Vertex => graph.vertex_count(),
            PropertyKind::Edge => graph.edge_count(),
        };
        if prop.column.len() != expected {
            return Err(GraphError::InvalidArgument(format!(
                "{} property '{}' has {} values, expected {}",
                kind.label(),
                prop.name,
                prop.column.len(),
                expected
            )));
        }
        registry.insert_column(kind, &prop.name, prop.column, prop.index)?;
    }

    let restore_filter = |stored: StoredFilter| -> GraphResult<FilterConfig> {
        let mut config = FilterConfig::default();
        if let Some(name) = stored.property {
            config.set_property(&name);
        }
        if let Some((lo, hi)) = stored.range {
            config.set_range(lo, hi)?;
        }
        Ok(config)
    };

    debug!(path = %path.display(), "graph state loaded");
    Ok(LoadedState {
        graph,
        registry,
        directed: stored.directed,
        reversed: stored.reversed,
        vertex_filter: restore_filter(stored.vertex_filter)?,
        edge_filter: restore_filter(stored.edge_filter)?,
    })
}
