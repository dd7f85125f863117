//! Vertex and edge filter configuration
//!
//! A filter selects items either by a numeric range on a named
//! property or by a caller-supplied predicate held by value. The
//! configuration is inert data; it is resolved against the property
//! registry once per analytic call, when the view is acquired.

pub mod view;

use std::fmt;
use std::sync::Arc;

use crate::error::{GraphError, GraphResult};
use crate::graph::{PropertyColumn, PropertyKind, PropertyRegistry};

/// Caller-supplied visibility predicate over item indices
pub type ItemPredicate = Arc<dyn Fn(usize) -> bool + Send + Sync>;

/// Filter configuration for one item kind (vertices or edges)
#[derive(Clone, Default)]
pub struct FilterConfig {
    property: Option<String>,
    range: Option<(f64, f64)>,
    generic: Option<ItemPredicate>,
}

impl FilterConfig {
    /// Select by numeric range on the named property. The range
    /// defaults to everything until [`set_range`](Self::set_range)
    /// narrows it.
    pub fn set_property(&mut self, name: &str) {
        self.property = Some(name.to_string());
    }

    /// Inclusive range of accepted property values
    pub fn set_range(&mut self, lo: f64, hi: f64) -> GraphResult<()> {
        if lo > hi {
            return Err(GraphError::InvalidArgument(format!(
                "filter range low {} exceeds high {}",
                lo, hi
            )));
        }
        self.range = Some((lo, hi));
        Ok(())
    }

    /// Install a generic predicate. While set it supersedes a
    /// configured range filter.
    pub fn set_generic(&mut self, pred: ItemPredicate) {
        self.generic = Some(pred);
    }

    /// Drop the generic predicate, restoring any range filter
    pub fn clear_generic(&mut self) {
        self.generic = None;
    }

    /// Drop the property/range selection
    pub fn clear_property(&mut self) {
        self.property = None;
    }

    /// Deactivate entirely
    pub fn clear(&mut self) {
        self.property = None;
        self.range = None;
        self.generic = None;
    }

    /// Whether either filter form is configured
    pub fn is_active(&self) -> bool {
        self.generic.is_some() || self.property.is_some()
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    pub fn has_generic(&self) -> bool {
        self.generic.is_some()
    }

    /// Resolve against the registry into a per-item predicate.
    /// `Ok(None)` when inactive; `NotFound`/`TypeMismatch` when the
    /// named property is missing or not numeric.
    pub(crate) fn resolve<'a>(
        &'a self,
        kind: PropertyKind,
        registry: &'a PropertyRegistry,
    ) -> GraphResult<Option<ResolvedFilter<'a>>> {
        if let Some(pred) = &self.generic {
            return Ok(Some(ResolvedFilter::Generic(pred)));
        }
        let Some(name) = &self.property else {
            return Ok(None);
        };
        let column = registry.numeric_checked(kind, name)?;
        let (lo, hi) = self.range.unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        Ok(Some(ResolvedFilter::Range { column, lo, hi }))
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("property", &self.property)
            .field("range", &self.range)
            .field("generic", &self.generic.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

/// A filter bound to concrete data for the duration of one call
pub(crate) enum ResolvedFilter<'a> {
    Generic(&'a ItemPredicate),
    Range {
        column: &'a PropertyColumn,
        lo: f64,
        hi: f64,
    },
}

impl ResolvedFilter<'_> {
    pub(crate) fn accepts(&self, item: usize) -> bool {
        match self {
            ResolvedFilter::Generic(pred) => pred(item),
            ResolvedFilter::Range { column, lo, hi } => column
                .numeric(item)
                .map(|v| *lo <= v && v <= *hi)
                .unwrap_or(false),
        }
    }
}
