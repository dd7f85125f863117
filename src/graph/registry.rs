//! Named property registry for vertex and edge columns
//!
//! Vertex and edge properties live in independent namespaces. Columns
//! are kept sized to the item count of their kind: the registry is
//! told about every structural change and mirrors the store's
//! swap-remove compaction. Index properties (columns that carry each
//! item's own index as a float) are repaired after every move.

use indexmap::IndexMap;

use super::property::{PropertyColumn, ScalarType, ScalarValue};
use crate::error::{GraphError, GraphResult};

/// Which namespace a property lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Vertex,
    Edge,
}

impl PropertyKind {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyKind::Vertex => "vertex",
            PropertyKind::Edge => "edge",
        }
    }
}

/// A registered property: its column, the fill value for items added
/// later, and whether it mirrors the item index
#[derive(Debug, Clone)]
pub struct PropertyEntry {
    pub column: PropertyColumn,
    pub default: ScalarValue,
    pub is_index: bool,
}

/// Registry of named, typed property columns
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    vertex: IndexMap<String, PropertyEntry>,
    edge: IndexMap<String, PropertyEntry>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: PropertyKind) -> &IndexMap<String, PropertyEntry> {
        match kind {
            PropertyKind::Vertex => &self.vertex,
            PropertyKind::Edge => &self.edge,
        }
    }

    fn table_mut(&mut self, kind: PropertyKind) -> &mut IndexMap<String, PropertyEntry> {
        match kind {
            PropertyKind::Vertex => &mut self.vertex,
            PropertyKind::Edge => &mut self.edge,
        }
    }

    /// Names and element types in insertion order
    pub fn list(&self, kind: PropertyKind) -> Vec<(String, ScalarType)> {
        self.table(kind)
            .iter()
            .map(|(name, entry)| (name.clone(), entry.column.element_type()))
            .collect()
    }

    pub fn contains(&self, kind: PropertyKind, name: &str) -> bool {
        self.table(kind).contains_key(name)
    }

    /// Register a new property filled with `default` for `len` items
    pub fn insert(
        &mut self,
        kind: PropertyKind,
        name: &str,
        default: ScalarValue,
        len: usize,
    ) -> GraphResult<()> {
        if self.contains(kind, name) {
            return Err(GraphError::InvalidArgument(format!(
                "{} property '{}' already exists",
                kind.label(),
                name
            )));
        }
        let column = PropertyColumn::filled(&default, len);
        self.table_mut(kind).insert(
            name.to_string(),
            PropertyEntry {
                column,
                default,
                is_index: false,
            },
        );
        Ok(())
    }

    /// Register a float property whose value on each item equals that
    /// item's index
    pub fn insert_index_property(
        &mut self,
        kind: PropertyKind,
        name: &str,
        len: usize,
    ) -> GraphResult<()> {
        if self.contains(kind, name) {
            return Err(GraphError::InvalidArgument(format!(
                "{} property '{}' already exists",
                kind.label(),
                name
            )));
        }
        let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
        self.table_mut(kind).insert(
            name.to_string(),
            PropertyEntry {
                column: PropertyColumn::Float(values),
                default: ScalarValue::Float(0.0),
                is_index: true,
            },
        );
        Ok(())
    }

    /// Install an already-built column, e.g. when restoring from
    /// disk. The fill value for later items is the zero of the
    /// column's element type.
    pub(crate) fn insert_column(
        &mut self,
        kind: PropertyKind,
        name: &str,
        column: PropertyColumn,
        is_index: bool,
    ) -> GraphResult<()> {
        if self.contains(kind, name) {
            return Err(GraphError::InvalidArgument(format!(
                "{} property '{}' already exists",
                kind.label(),
                name
            )));
        }
        let default = match column.element_type() {
            ScalarType::Float => ScalarValue::Float(0.0),
            ScalarType::Int => ScalarValue::Int(0),
            ScalarType::Str => ScalarValue::Str(String::new()),
        };
        self.table_mut(kind).insert(
            name.to_string(),
            PropertyEntry {
                column,
                default,
                is_index,
            },
        );
        Ok(())
    }

    /// Remove a property by name
    pub fn remove(&mut self, kind: PropertyKind, name: &str) -> GraphResult<()> {
        self.table_mut(kind)
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| GraphError::NotFound(name.to_string()))
    }

    pub fn get(&self, kind: PropertyKind, name: &str) -> Option<&PropertyColumn> {
        self.table(kind).get(name).map(|e| &e.column)
    }

    pub fn get_mut(&mut self, kind: PropertyKind, name: &str) -> Option<&mut PropertyColumn> {
        self.table_mut(kind).get_mut(name).map(|e| &mut e.column)
    }

    pub fn entries(&self, kind: PropertyKind) -> impl Iterator<Item = (&String, &PropertyEntry)> {
        self.table(kind).iter()
    }

    /// Column lookup that fails with `NotFound`
    pub fn get_checked(&self, kind: PropertyKind, name: &str) -> GraphResult<&PropertyColumn> {
        self.get(kind, name)
            .ok_or_else(|| GraphError::NotFound(name.to_string()))
    }

    /// Column lookup that additionally requires a numeric element type
    pub fn numeric_checked(&self, kind: PropertyKind, name: &str) -> GraphResult<&PropertyColumn> {
        let column = self.get_checked(kind, name)?;
        if !column.element_type().is_numeric() {
            return Err(GraphError::TypeMismatch {
                name: name.to_string(),
                expected: "float or int",
                actual: column.element_type().type_name(),
            });
        }
        Ok(column)
    }

    /// Mirror an item appended to the store
    pub fn on_item_added(&mut self, kind: PropertyKind) {
        for entry in self.table_mut(kind).values_mut() {
            if entry.is_index {
                let i = entry.column.len();
                if let PropertyColumn::Float(v) = &mut entry.column {
                    v.push(i as f64);
                }
            } else {
                let default = entry.default.clone();
                entry.column.push_default(&default);
            }
        }
    }

    /// Mirror a swap-remove of item `i` in the store
    pub fn on_item_swap_removed(&mut self, kind: PropertyKind, i: usize) {
        for entry in self.table_mut(kind).values_mut() {
            entry.column.swap_remove(i);
            if entry.is_index {
                if let PropertyColumn::Float(v) = &mut entry.column {
                    if let Some(slot) = v.get_mut(i) {
                        *slot = i as f64;
                    }
                }
            }
        }
    }

    /// Drop every property of one kind
    pub fn clear_kind(&mut self, kind: PropertyKind) {
        self.table_mut(kind).clear();
    }

    /// Drop every property
    pub fn clear(&mut self) {
        self.vertex.clear();
        self.edge.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_independent() {
        let mut reg = PropertyRegistry::new();
        reg.insert(PropertyKind::Vertex, "w", ScalarValue::Float(0.0), 3)
            .unwrap();
        reg.insert(PropertyKind::Edge, "w", ScalarValue::Int(0), 2)
            .unwrap();

        assert_eq!(
            reg.get(PropertyKind::Vertex, "w").unwrap().element_type(),
            ScalarType::Float
        );
        assert_eq!(
            reg.get(PropertyKind::Edge, "w").unwrap().element_type(),
            ScalarType::Int
        );
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut reg = PropertyRegistry::new();
        reg.insert(PropertyKind::Vertex, "w", ScalarValue::Float(0.0), 0)
            .unwrap();
        let err = reg
            .insert(PropertyKind::Vertex, "w", ScalarValue::Float(0.0), 0)
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut reg = PropertyRegistry::new();
        let err = reg.remove(PropertyKind::Edge, "nope").unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
    }

    #[test]
    fn test_index_property_tracks_moves() {
        let mut reg = PropertyRegistry::new();
        reg.insert_index_property(PropertyKind::Vertex, "idx", 4)
            .unwrap();

        // swap-remove item 1: item 3 moves into slot 1 and must read 1
        reg.on_item_swap_removed(PropertyKind::Vertex, 1);
        let col = reg.get(PropertyKind::Vertex, "idx").unwrap();
        assert_eq!(col.len(), 3);
        assert_eq!(col.numeric(1), Some(1.0));

        reg.on_item_added(PropertyKind::Vertex);
        let col = reg.get(PropertyKind::Vertex, "idx").unwrap();
        assert_eq!(col.numeric(3), Some(3.0));
    }

    #[test]
    fn test_defaults_fill_new_items() {
        let mut reg = PropertyRegistry::new();
        reg.insert(PropertyKind::Edge, "cap", ScalarValue::Int(5), 1)
            .unwrap();
        reg.on_item_added(PropertyKind::Edge);
        let col = reg.get(PropertyKind::Edge, "cap").unwrap();
        assert_eq!(col.get(1), Some(ScalarValue::Int(5)));
    }

    #[test]
    fn test_numeric_checked() {
        let mut reg = PropertyRegistry::new();
        reg.insert(PropertyKind::Vertex, "name", ScalarValue::from(""), 2)
            .unwrap();
        let err = reg.numeric_checked(PropertyKind::Vertex, "name").unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));

        let err = reg.numeric_checked(PropertyKind::Vertex, "ghost").unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut reg = PropertyRegistry::new();
        reg.insert(PropertyKind::Vertex, "b", ScalarValue::Float(0.0), 0)
            .unwrap();
        reg.insert(PropertyKind::Vertex, "a", ScalarValue::Float(0.0), 0)
            .unwrap();
        let names: Vec<String> = reg
            .list(PropertyKind::Vertex)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }
}
