use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Ordered rows of named columns. The shape every chart is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Serialize each record and keep `columns`, in that order.
    pub fn from_records<T: Serialize>(columns: &[&str], records: &[T]) -> Result<Self> {
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let value = serde_json::to_value(record)?;
            let Value::Object(mut fields) = value else {
                return Err(AppError::Render(format!(
                    "table rows must serialize to objects, got {value}"
                )));
            };
            let row = columns
                .iter()
                .map(|c| {
                    fields
                        .remove(*c)
                        .ok_or_else(|| AppError::Render(format!("row has no column {c:?}")))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AppError::Render(format!("table has no column {name:?}")))
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].clone()).collect())
    }

    pub fn column_u32(&self, name: &str) -> Result<Vec<u32>> {
        self.column(name)?
            .into_iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| AppError::Render(format!("column {name:?} holds non-integer {v}")))
            })
            .collect()
    }
}
