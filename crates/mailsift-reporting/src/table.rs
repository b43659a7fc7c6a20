use std::path::{Path, PathBuf};

use crate::TableError;

/// Row-oriented storage for job tables.
///
/// Rows are plain string cells; the header, when there is one, is just the
/// first row. Implemented by [`CsvTable`] for files and [`MemoryTable`] for tests.
pub trait Table {
    /// Read every row, header included.
    fn read_rows(&self) -> Result<Vec<Vec<String>>, TableError>;

    /// Replace the table contents with `header` (if any) followed by `rows`.
    fn write_rows(&mut self, header: Option<&[&str]>, rows: &[Vec<String>])
    -> Result<(), TableError>;

    /// Human-readable location, used in reports and logs.
    fn location(&self) -> String;
}

/// A CSV file on disk (RFC 4180 quoting, `\n` line endings, UTF-8).
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Table for CsvTable {
    fn read_rows(&self) -> Result<Vec<Vec<String>>, TableError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| TableError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(parse_csv(&content))
    }

    fn write_rows(
        &mut self,
        header: Option<&[&str]>,
        rows: &[Vec<String>],
    ) -> Result<(), TableError> {
        let mut out = String::new();
        if let Some(header) = header {
            push_record(&mut out, header.iter().copied());
        }
        for row in rows {
            push_record(&mut out, row.iter().map(String::as_str));
        }
        std::fs::write(&self.path, out).map_err(|source| TableError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "wrote table");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-memory table.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    rows: Vec<Vec<String>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl Table for MemoryTable {
    fn read_rows(&self) -> Result<Vec<Vec<String>>, TableError> {
        Ok(self.rows.clone())
    }

    fn write_rows(
        &mut self,
        header: Option<&[&str]>,
        rows: &[Vec<String>],
    ) -> Result<(), TableError> {
        self.rows.clear();
        if let Some(header) = header {
            self.rows.push(header.iter().map(|s| s.to_string()).collect());
        }
        self.rows.extend(rows.iter().cloned());
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

pub(crate) fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn push_record<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let escaped: Vec<String> = cells.map(csv_escape).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

/// Parse CSV content into rows. Quoted cells may contain commas, doubled
/// quotes and line breaks. Blank lines are skipped.
pub(crate) fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut cell));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => cell.push(c),
        }
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }
    rows
}
