use crate::book::{Book, WorkbookFormat};
use crate::cell::CellValue;
use crate::error::{Result, WorkbookError};
use crate::reader::WorkbookReader;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Name given to the initial sheet of a freshly created workbook
const DEFAULT_SHEET_NAME: &str = "Sheet0";

/// Row-oriented writer that builds up a workbook sheet by sheet.
///
/// Values keep their native cell types on write: numbers are stored as
/// numeric cells at full precision, not as their display strings.
/// Heterogeneous rows are usually built with the [`row!`](crate::row) macro.
///
/// # Examples
///
/// ```no_run
/// use rowbook::{row, WorkbookWriter};
///
/// let mut writer = WorkbookWriter::new();
/// writer.add_row(row!["abc", 1.1, true, None::<&str>])?;
/// writer.save("out.xlsx")?;
/// # Ok::<(), rowbook::WorkbookError>(())
/// ```
#[derive(Debug)]
pub struct WorkbookWriter {
    book: Option<Book>,
    current: usize,
}

impl WorkbookWriter {
    /// Create a writer over a fresh modern-format workbook with a single
    /// empty sheet named `Sheet0`
    #[must_use]
    pub fn new() -> Self {
        Self::open_xlsx()
    }

    /// Create a writer over a fresh `.xlsx` workbook
    #[must_use]
    pub fn open_xlsx() -> Self {
        Self::from_book(Book::new(WorkbookFormat::Xlsx))
    }

    /// Create a writer over a fresh legacy-format workbook.
    ///
    /// Legacy `.xls` books can be built and read back in memory but refuse
    /// to serialize; see [`Book::save`].
    #[must_use]
    pub fn open_xls() -> Self {
        Self::from_book(Book::new(WorkbookFormat::Xls))
    }

    /// Wrap an existing in-memory book. A default sheet is created if the
    /// book has none.
    #[must_use]
    pub fn from_book(mut book: Book) -> Self {
        if book.is_empty() {
            // Name collision impossible on an empty book
            let _ = book.add_empty_sheet(DEFAULT_SHEET_NAME);
        }
        WorkbookWriter {
            book: Some(book),
            current: 0,
        }
    }

    /// Access the underlying book.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::Closed`] after [`close`](Self::close).
    pub fn book(&self) -> Result<&Book> {
        self.book.as_ref().ok_or(WorkbookError::Closed)
    }

    fn book_mut(&mut self) -> Result<&mut Book> {
        self.book.as_mut().ok_or(WorkbookError::Closed)
    }

    /// Take the underlying book back, consuming the writer
    pub fn into_book(self) -> Result<Book> {
        self.book.ok_or(WorkbookError::Closed)
    }

    /// Release the underlying book. Every later operation fails with
    /// [`WorkbookError::Closed`]. Calling close again is a no-op.
    pub fn close(&mut self) {
        if self.book.take().is_some() {
            debug!("writer closed");
        }
    }

    /// Get all sheet names in storage order
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.book()?.sheet_names())
    }

    /// Get the name of the current sheet
    pub fn current_sheet_name(&self) -> Result<&str> {
        Ok(self.book()?.sheet_at(self.current)?.name())
    }

    /// Rename the current sheet
    pub fn set_sheet_name(&mut self, name: &str) -> Result<&mut Self> {
        let current = self.current;
        self.book_mut()?.rename_sheet_at(current, name)?;
        Ok(self)
    }

    /// Append a new empty sheet without changing the current sheet
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut Self> {
        self.book_mut()?.add_empty_sheet(name)?;
        Ok(self)
    }

    /// Append a new empty sheet and make it current
    pub fn create_and_turn_to_sheet(&mut self, name: &str) -> Result<&mut Self> {
        self.create_sheet(name)?;
        self.turn_to_sheet_named(name)
    }

    /// Turn to the sheet at the given index
    pub fn turn_to_sheet(&mut self, index: usize) -> Result<&mut Self> {
        self.book()?.sheet_at(index)?;
        self.current = index;
        Ok(self)
    }

    /// Turn to the named sheet
    pub fn turn_to_sheet_named(&mut self, name: &str) -> Result<&mut Self> {
        let index = self
            .book()?
            .index_of(name)
            .ok_or_else(|| WorkbookError::SheetNotFound {
                name: name.to_string(),
            })?;
        self.current = index;
        Ok(self)
    }

    /// Append one row of cells to the current sheet.
    ///
    /// Accepts anything yielding [`CellValue`]s; mixed-type rows are built
    /// with the [`row!`](crate::row) macro:
    ///
    /// ```
    /// use rowbook::{row, WorkbookWriter};
    ///
    /// let mut writer = WorkbookWriter::new();
    /// writer.add_row(row![None::<&str>, true, 1.1, 123, "abc"]).unwrap();
    /// ```
    pub fn add_row<I>(&mut self, cells: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = CellValue>,
    {
        let current = self.current;
        self.book_mut()?
            .sheet_at_mut(current)?
            .push_row(cells.into_iter().collect());
        Ok(self)
    }

    /// Serialize the workbook to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.book()?.save(path)
    }

    /// Serialize the workbook to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.book()?.to_bytes()
    }

    /// Snapshot the current content as a reader (header mode enabled)
    pub fn to_reader(&self) -> Result<WorkbookReader> {
        Ok(WorkbookReader::from_book(self.book()?.clone()))
    }
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Two writers are equal when their workbook content is: same sheet order,
/// names, and cell data. This matches equality of their serialized bytes,
/// regardless of how each writer was constructed.
impl PartialEq for WorkbookWriter {
    fn eq(&self, other: &Self) -> bool {
        self.book == other.book
    }
}

impl fmt::Display for WorkbookWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sheet_map = self.to_reader().and_then(|reader| reader.to_sheet_map());
        let Ok(sheet_map) = sheet_map else {
            return write!(f, "WorkbookWriter{{closed}}");
        };
        write!(f, "WorkbookWriter{{")?;
        for (i, (name, rows)) in sheet_map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={rows:?}")?;
        }
        write!(f, "}}")
    }
}
