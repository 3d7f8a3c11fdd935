//! Named-column tabular data shared by training and prediction.

use thiserror::Error;

/// Errors raised by typed column access.
#[derive(Debug, Error)]
pub enum FrameError {
    /// No column with the requested name.
    #[error("no column named \"{0}\"")]
    MissingColumn(String),
    /// The column exists but holds a different value type.
    #[error("column \"{name}\" holds {actual} values, expected {expected}")]
    ColumnType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// A column's row count differs from the frame's.
    #[error("column \"{name}\" has {actual} rows, expected {expected}")]
    RowCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// Two columns share one name.
    #[error("duplicate column \"{0}\"")]
    DuplicateColumn(String),
}

/// Values of a single named column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Free text, one entry per row.
    Text(Vec<String>),
    /// Binary/categorical label values, one entry per row.
    Values(Vec<i64>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Text(values) => values.len(),
            Column::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn type_name(&self) -> &'static str {
        match self {
            Column::Text(_) => "text",
            Column::Values(_) => "label",
        }
    }
}

/// Ordered collection of named columns with a shared row count.
///
/// Rows are independent observations; the frame is treated as
/// immutable within a training or prediction call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<(String, Column)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from ordered `(name, column)` pairs.
    pub fn from_columns(
        columns: impl IntoIterator<Item = (String, Column)>,
    ) -> Result<Self, FrameError> {
        let mut frame = Self::new();
        for (name, column) in columns {
            frame.push_column(name, column)?;
        }
        Ok(frame)
    }

    /// Append a column, enforcing name uniqueness and row alignment.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(FrameError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(FrameError::RowCountMismatch {
                name,
                expected: self.n_rows(),
                actual: column.len(),
            });
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// Row count shared by every column; 0 for a frame with no columns.
    pub fn n_rows(&self) -> usize {
        self.columns
            .first()
            .map(|(_, column)| column.len())
            .unwrap_or(0)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(column_name, _)| column_name == name)
            .map(|(_, column)| column)
    }

    /// Borrow a text column by name.
    pub fn text(&self, name: &str) -> Result<&[String], FrameError> {
        match self.column(name) {
            None => Err(FrameError::MissingColumn(name.to_string())),
            Some(Column::Text(values)) => Ok(values),
            Some(other) => Err(FrameError::ColumnType {
                name: name.to_string(),
                expected: "text",
                actual: other.type_name(),
            }),
        }
    }

    /// Borrow a label-value column by name.
    pub fn values(&self, name: &str) -> Result<&[i64], FrameError> {
        match self.column(name) {
            None => Err(FrameError::MissingColumn(name.to_string())),
            Some(Column::Values(values)) => Ok(values),
            Some(other) => Err(FrameError::ColumnType {
                name: name.to_string(),
                expected: "label",
                actual: other.type_name(),
            }),
        }
    }
}
