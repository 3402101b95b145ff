//! Column and nested table implementation.

use serde::{Deserialize, Serialize};

use crate::array::{DenseArray, Resolver, ValueArray};
use crate::util::{ElementKind, Error, Result, ResultExt};

/// A titled array tagged with a property kind and a unit of measure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Column {
    /// Column title, unique within a table.
    pub title: String,
    /// Property kind tag. Opaque to this crate.
    pub kind: String,
    /// Unit of measure tag. Opaque to this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    pub values: ValueArray,
}

impl Column {
    /// Create a column without a unit.
    pub fn new(title: impl Into<String>, kind: impl Into<String>, values: ValueArray) -> Self {
        Self {
            title: title.into(),
            kind: kind.into(),
            uom: None,
            values,
        }
    }

    /// Set the unit of measure.
    pub fn with_uom(mut self, uom: impl Into<String>) -> Self {
        self.uom = Some(uom.into());
        self
    }

    /// Element kind of the wrapped array.
    pub fn element_kind(&self) -> ElementKind {
        self.values.element_kind()
    }

    /// Row count, when known without reading content.
    pub fn static_len(&self) -> Option<usize> {
        self.values.static_len()
    }

    /// Resolve the column values. Failures name the column.
    pub fn resolve(&self, resolver: &Resolver<'_>) -> Result<DenseArray> {
        resolver.resolve(&self.values).in_array(self.title.as_str())
    }

    /// Row count, reading content if needed.
    pub fn len(&self, resolver: &Resolver<'_>) -> Result<usize> {
        resolver.len(&self.values).in_array(self.title.as_str())
    }
}

/// Columns sharing one row count.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NestedTable {
    columns: Vec<Column>,
}

impl NestedTable {
    /// Start building a table.
    pub fn builder() -> NestedTableBuilder {
        NestedTableBuilder::default()
    }

    /// Columns in insertion order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get a column by title.
    pub fn column(&self, title: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.title == title)
    }

    /// Column titles in insertion order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.title.as_str())
    }

    /// Row count of the first column whose length is statically known.
    pub fn static_row_count(&self) -> Option<usize> {
        self.columns.iter().find_map(Column::static_len)
    }

    /// Resolve every column and check that row counts agree.
    pub fn resolve(&self, resolver: &Resolver<'_>) -> Result<Vec<DenseArray>> {
        let resolved = self
            .columns
            .iter()
            .map(|c| c.resolve(resolver))
            .collect::<Result<Vec<_>>>()?;
        if let Some(first) = resolved.first() {
            for (column, dense) in self.columns.iter().zip(&resolved) {
                if dense.len() != first.len() {
                    return Err(Error::malformed(format!(
                        "column has {} rows, expected {}",
                        dense.len(),
                        first.len()
                    ))
                    .in_array(column.title.as_str()));
                }
            }
        }
        Ok(resolved)
    }
}

/// Builder for [`NestedTable`].
#[derive(Default)]
pub struct NestedTableBuilder {
    columns: Vec<Column>,
}

impl NestedTableBuilder {
    /// Append a column.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Finish the table.
    ///
    /// Fails on duplicate titles and on columns whose statically known
    /// row counts differ.
    pub fn build(self) -> Result<NestedTable> {
        let mut rows: Option<(usize, &str)> = None;
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.title == column.title) {
                return Err(Error::malformed(format!("duplicate column title '{}'", column.title)));
            }
            let Some(n) = column.static_len() else {
                continue;
            };
            match rows {
                None => rows = Some((n, column.title.as_str())),
                Some((m, first)) if m != n => {
                    return Err(Error::malformed(format!(
                        "column '{}' has {} rows but '{}' has {}",
                        column.title, n, first, m
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(NestedTable { columns: self.columns })
    }
}
