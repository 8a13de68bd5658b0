//! In-memory [`SheetStore`] used by the store tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Result, SheetStore};

#[derive(Default)]
pub struct MemorySheets {
    tables: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(name: &str, rows: Vec<Vec<String>>) -> Self {
        let store = Self::new();
        store.tables.lock().unwrap().insert(name.to_string(), rows);
        store
    }

    /// Snapshot of a worksheet for assertions; empty when absent.
    pub fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.tables
            .lock()
            .unwrap()
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }
}

/// "F2" -> (col 6, row 2), both 1-indexed.
fn parse_cell(cell: &str) -> (usize, usize) {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .expect("cell reference has a row number");
    let (letters, digits) = cell.split_at(split);
    let col = letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b.to_ascii_uppercase() - b'A' + 1) as usize);
    (col, digits.parse().expect("row number"))
}

impl SheetStore for MemorySheets {
    async fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        Ok(self.rows(sheet))
    }

    async fn col_values(&self, sheet: &str, col: usize) -> Result<Vec<String>> {
        Ok(self
            .rows(sheet)
            .iter()
            .map(|row| row.get(col - 1).cloned().unwrap_or_default())
            .collect())
    }

    async fn row_values(&self, sheet: &str, row: usize) -> Result<Vec<String>> {
        Ok(self.rows(sheet).get(row - 1).cloned().unwrap_or_default())
    }

    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .entry(sheet.to_string())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }

    async fn write_range(&self, sheet: &str, start_cell: &str, rows: &[Vec<String>]) -> Result<()> {
        let (start_col, start_row) = parse_cell(start_cell);
        let mut tables = self.tables.lock().unwrap();
        let grid = tables.entry(sheet.to_string()).or_default();
        for (i, cells) in rows.iter().enumerate() {
            let row_idx = start_row - 1 + i;
            while grid.len() <= row_idx {
                grid.push(Vec::new());
            }
            let row = &mut grid[row_idx];
            for (j, cell) in cells.iter().enumerate() {
                let col_idx = start_col - 1 + j;
                while row.len() <= col_idx {
                    row.push(String::new());
                }
                row[col_idx] = cell.clone();
            }
        }
        Ok(())
    }

    async fn ensure_sheet(&self, sheet: &str, _rows: u32, _cols: u32) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if tables.contains_key(sheet) {
            Ok(false)
        } else {
            tables.insert(sheet.to_string(), Vec::new());
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_references_parse() {
        assert_eq!(parse_cell("A1"), (1, 1));
        assert_eq!(parse_cell("F2"), (6, 2));
        assert_eq!(parse_cell("AA10"), (27, 10));
    }

    #[tokio::test]
    async fn write_range_grows_the_grid() {
        let store = MemorySheets::new();
        store
            .write_range("t", "F2", &[vec!["x".to_string(), "y".to_string()]])
            .await
            .unwrap();
        let rows = store.rows("t");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][5], "x");
        assert_eq!(rows[1][6], "y");
        assert!(rows[0].is_empty());
    }
}
