use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::common::error::{EtlError, Result};

/// A single dynamically-typed cell. Source data arrives as free text and is
/// coerced to a typed variant during cleaning; `Missing` covers both native
/// NULLs and the literal `"NULL"` marker after canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(*f),
            Cell::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render the cell for CSV caching and log output.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Date(d) => d.to_string(),
            Cell::Time(t) => t.to_string(),
            Cell::DateTime(dt) => dt.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// An ordered set of rows sharing a column schema — one table snapshot
/// moving through the pipeline. Created by an extraction call, consumed by
/// exactly one cleaning function, then handed to the loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(EtlError::RowWidth(format!(
                "expected {} cells, got {}",
                self.columns.len(),
                row.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column index, or an error naming the column that the entity requires.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Remove the named columns wherever present; unknown names are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let doomed: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| names.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();
        for &idx in doomed.iter().rev() {
            self.drop_column_at(idx);
        }
    }

    /// Remove a column by position (used for unnamed synthetic index columns).
    pub fn drop_column_at(&mut self, idx: usize) {
        if idx >= self.columns.len() {
            return;
        }
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
    }

    /// Keep only rows for which the predicate holds.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Cell]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Apply a coercion to every cell of the named column.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(())
    }

    /// Canonicalize the literal `"NULL"` marker into `Cell::Missing`.
    pub fn null_to_missing(&mut self) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if matches!(cell, Cell::Text(s) if s == "NULL") {
                    *cell = Cell::Missing;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordSet {
        let mut rs = RecordSet::new(vec!["a".into(), "b".into(), "c".into()]);
        rs.push_row(vec!["1".into(), "NULL".into(), "x".into()]).unwrap();
        rs.push_row(vec!["2".into(), "y".into(), "z".into()]).unwrap();
        rs
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut rs = RecordSet::new(vec!["a".into()]);
        assert!(rs.push_row(vec!["1".into(), "2".into()]).is_err());
    }

    #[test]
    fn null_marker_becomes_missing() {
        let mut rs = sample();
        rs.null_to_missing();
        assert!(rs.get(0, "b").unwrap().is_missing());
        assert_eq!(rs.get(1, "b").unwrap().as_text(), Some("y"));
    }

    #[test]
    fn drop_columns_ignores_unknown_names() {
        let mut rs = sample();
        rs.drop_columns(&["b", "nope"]);
        assert_eq!(rs.columns(), &["a".to_string(), "c".to_string()]);
        assert_eq!(rs.rows()[0].len(), 2);
    }

    #[test]
    fn drop_column_at_removes_cells() {
        let mut rs = sample();
        rs.drop_column_at(0);
        assert_eq!(rs.get(0, "b").unwrap().as_text(), Some("NULL"));
        assert_eq!(rs.rows()[1].len(), 2);
    }

    #[test]
    fn retain_rows_filters_in_place() {
        let mut rs = sample();
        let b = rs.require_column("b").unwrap();
        rs.retain_rows(|row| row[b].as_text() != Some("NULL"));
        assert_eq!(rs.len(), 1);
    }
}
