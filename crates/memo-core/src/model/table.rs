//! Datos tabulares: columnas con nombre y tipo (en orden) + filas.

use serde::{Deserialize, Serialize};

use super::Value;
use crate::errors::CoreError;

/// Tipo declarado de una columna. Forma parte del esquema hasheado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Any,
}

impl ColumnKind {
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Bool => 0,
            Self::Int => 1,
            Self::Float => 2,
            Self::Str => 3,
            Self::Bytes => 4,
            Self::Any => 5,
        }
    }

    /// `Unit` es el nulo y cabe en cualquier columna.
    pub fn accepts(&self, cell: &Value) -> bool {
        matches!((self, cell),
                 (Self::Any, _)
                 | (_, Value::Unit)
                 | (Self::Bool, Value::Bool(_))
                 | (Self::Int, Value::Int(_))
                 | (Self::Float, Value::Float(_))
                 | (Self::Str, Value::Str(_))
                 | (Self::Bytes, Value::Bytes(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self { name: name.into(),
               kind }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        Self { columns: columns.into_iter().collect(),
               rows: Vec::new() }
    }

    /// Construye la tabla a partir de columnas completas (estilo dataframe).
    /// Todas las columnas deben tener la misma longitud.
    pub fn from_columns(columns: Vec<(Column, Vec<Value>)>) -> Result<Self, CoreError> {
        let expected = columns.first().map(|(_, cells)| cells.len()).unwrap_or(0);
        for (col, cells) in &columns {
            if cells.len() != expected {
                return Err(CoreError::ColumnLength { column: col.name.clone(),
                                                     expected,
                                                     found: cells.len() });
            }
        }
        let mut heads = Vec::with_capacity(columns.len());
        let mut iters = Vec::with_capacity(columns.len());
        for (col, cells) in columns {
            heads.push(col);
            iters.push(cells.into_iter());
        }
        let mut table = Table::new(heads);
        for _ in 0..expected {
            let row: Vec<Value> = iters.iter_mut().filter_map(Iterator::next).collect();
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), CoreError> {
        if row.len() != self.columns.len() {
            return Err(CoreError::RowWidth { expected: self.columns.len(),
                                             found: row.len() });
        }
        if let Some((col, cell)) = self.columns.iter().zip(&row).find(|(col, cell)| !col.kind.accepts(cell)) {
            return Err(CoreError::CellKind { column: col.name.clone(),
                                             expected: col.kind,
                                             found: cell.kind_name() });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn with_row(mut self, row: Vec<Value>) -> Result<Self, CoreError> {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }
}
