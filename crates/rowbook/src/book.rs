use crate::cell::CellValue;
use crate::error::{Result, WorkbookError};
use indexmap::IndexMap;

/// Container format of a workbook.
///
/// Legacy binary workbooks (`.xls`) can be read but not written back;
/// see [`Book::save`](crate::book::Book::save).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Legacy binary container (`.xls`)
    Xls,
    /// Modern XML-zip container (`.xlsx`)
    Xlsx,
}

/// A named grid of rows within a [`Book`].
///
/// Rows are stored dense and may be ragged: each row keeps its own physical
/// width, and missing trailing cells are simply absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Sheet::default()
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
        }
    }

    /// Create a sheet from 2D data
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        Sheet {
            name: String::new(),
            data: data
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of physical rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the widest row's cell count
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Get the rows of this sheet
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.data
    }

    /// Append one row to the sheet
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.data.push(row);
    }
}

/// An in-memory workbook containing multiple sheets (preserves insertion order)
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    format: WorkbookFormat,
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book with the given container format
    #[must_use]
    pub fn new(format: WorkbookFormat) -> Self {
        Book {
            format,
            sheets: IndexMap::new(),
        }
    }

    /// Get the container format
    #[must_use]
    pub fn format(&self) -> WorkbookFormat {
        self.format
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book has no sheets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in storage order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    /// Check if a sheet exists
    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    /// Get the positional index of a sheet by name
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.sheets.get_index_of(name)
    }

    /// Get a sheet by index (0-based)
    pub fn sheet_at(&self, index: usize) -> Result<&Sheet> {
        self.sheets
            .get_index(index)
            .map(|(_, sheet)| sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound {
                name: format!("index {index}"),
            })
    }

    /// Get a mutable sheet by index (0-based)
    pub fn sheet_at_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        self.sheets
            .get_index_mut(index)
            .map(|(_, sheet)| sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound {
                name: format!("index {index}"),
            })
    }

    /// Get a sheet by name
    pub fn sheet_by_name(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| WorkbookError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Add a sheet to the book
    pub fn add_sheet(&mut self, name: &str, sheet: Sheet) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(WorkbookError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }

        let mut sheet = sheet;
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Add a new empty sheet with the given name
    pub fn add_empty_sheet(&mut self, name: &str) -> Result<()> {
        self.add_sheet(name, Sheet::new())
    }

    /// Rename the sheet at the given index (preserves position in sheet order).
    ///
    /// Renaming a sheet to its current name is a no-op.
    pub fn rename_sheet_at(&mut self, index: usize, new_name: &str) -> Result<()> {
        self.sheet_at(index)?;

        if let Some(existing) = self.sheets.get_index_of(new_name) {
            if existing == index {
                return Ok(());
            }
            return Err(WorkbookError::SheetAlreadyExists {
                name: new_name.to_string(),
            });
        }

        if let Some((_, mut sheet)) = self.sheets.shift_remove_index(index) {
            sheet.set_name(new_name);
            self.sheets.shift_insert(index, new_name.to_string(), sheet);
        }

        Ok(())
    }

    /// Iterate over sheets in storage order
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for Book {
    fn default() -> Self {
        Book::new(WorkbookFormat::Xlsx)
    }
}
