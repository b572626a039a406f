use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, WorkbookError};
use indexmap::IndexMap;
use std::path::Path;
use tracing::debug;

/// Row-oriented reader over a workbook.
///
/// The reader tracks one current sheet at a time and exposes its data rows
/// through four lazy shapes: delimited lines, lists, fixed arrays, and
/// header-keyed maps. Each shape call opens a fresh traversal; nothing is
/// consumed or cached across calls.
///
/// When header mode is active (the default), the first physical row of the
/// current sheet is cached as the header and skipped during row iteration.
///
/// # Examples
///
/// ```no_run
/// use rowbook::WorkbookReader;
///
/// let reader = WorkbookReader::open("data.xlsx")?;
/// for line in reader.to_csv()? {
///     println!("{line}");
/// }
/// # Ok::<(), rowbook::WorkbookError>(())
/// ```
#[derive(Debug)]
pub struct WorkbookReader {
    book: Option<Book>,
    current: usize,
    with_header: bool,
    header_active: bool,
    header: Vec<String>,
}

impl WorkbookReader {
    /// Open a workbook file with header mode enabled.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::Open`] if the file is missing or cannot be
    /// parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_header(path, true)
    }

    /// Open a workbook file with an explicit header mode.
    pub fn open_with_header<P: AsRef<Path>>(path: P, with_header: bool) -> Result<Self> {
        Ok(Self::from_book_with_header(Book::open(path)?, with_header))
    }

    /// Wrap an in-memory book with header mode enabled
    #[must_use]
    pub fn from_book(book: Book) -> Self {
        Self::from_book_with_header(book, true)
    }

    /// Wrap an in-memory book with an explicit header mode
    #[must_use]
    pub fn from_book_with_header(book: Book, with_header: bool) -> Self {
        let mut reader = WorkbookReader {
            book: Some(book),
            current: 0,
            with_header,
            header_active: with_header,
            header: Vec::new(),
        };
        reader.reload_header();
        reader
    }

    /// Disable header mode: the first physical row becomes ordinary data
    #[must_use]
    pub fn without_header(mut self) -> Self {
        self.with_header = false;
        self.header_active = false;
        self.header.clear();
        self
    }

    /// Enable header mode for the current sheet
    #[must_use]
    pub fn with_header(mut self) -> Self {
        self.with_header = true;
        self.header_active = true;
        self.reload_header();
        self
    }

    /// Access the underlying book.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::Closed`] after [`close`](Self::close).
    pub fn book(&self) -> Result<&Book> {
        self.book.as_ref().ok_or(WorkbookError::Closed)
    }

    /// Take the underlying book back, consuming the reader
    pub fn into_book(self) -> Result<Book> {
        self.book.ok_or(WorkbookError::Closed)
    }

    /// Release the underlying book. Every later operation fails with
    /// [`WorkbookError::Closed`]. Calling close again is a no-op.
    pub fn close(&mut self) {
        if self.book.take().is_some() {
            debug!("reader closed");
        }
        self.header.clear();
    }

    /// Get the cached header of the current sheet.
    ///
    /// Empty when header mode is disabled or the sheet has no rows.
    pub fn header(&self) -> Result<&[String]> {
        self.book()?;
        Ok(&self.header)
    }

    /// Get all sheet names in storage order
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.book()?.sheet_names())
    }

    /// Get the name of the current sheet
    pub fn current_sheet_name(&self) -> Result<&str> {
        Ok(self.book()?.sheet_at(self.current)?.name())
    }

    /// Turn to the sheet at the given index, keeping the open-time header mode
    pub fn turn_to_sheet(&mut self, index: usize) -> Result<&mut Self> {
        let with_header = self.with_header;
        self.turn_to_sheet_with_header(index, with_header)
    }

    /// Turn to the sheet at the given index with an explicit header mode
    pub fn turn_to_sheet_with_header(
        &mut self,
        index: usize,
        with_header: bool,
    ) -> Result<&mut Self> {
        self.book()?.sheet_at(index)?;
        self.current = index;
        self.header_active = with_header;
        self.reload_header();
        Ok(self)
    }

    /// Turn to the named sheet, keeping the open-time header mode
    pub fn turn_to_sheet_named(&mut self, name: &str) -> Result<&mut Self> {
        let with_header = self.with_header;
        self.turn_to_sheet_named_with_header(name, with_header)
    }

    /// Turn to the named sheet with an explicit header mode
    pub fn turn_to_sheet_named_with_header(
        &mut self,
        name: &str,
        with_header: bool,
    ) -> Result<&mut Self> {
        let index = self
            .book()?
            .index_of(name)
            .ok_or_else(|| WorkbookError::SheetNotFound {
                name: name.to_string(),
            })?;
        self.turn_to_sheet_with_header(index, with_header)
    }

    /// Stream the current sheet's data rows as comma-delimited lines
    pub fn to_csv(&self) -> Result<impl Iterator<Item = String> + '_> {
        self.to_csv_with_delimiter(',')
    }

    /// Stream the current sheet's data rows as delimited lines.
    ///
    /// A cell whose text contains the delimiter is wrapped in double quotes.
    /// Embedded quote characters are NOT escaped; this is deliberately
    /// simpler than RFC 4180.
    pub fn to_csv_with_delimiter(
        &self,
        delimiter: char,
    ) -> Result<impl Iterator<Item = String> + '_> {
        Ok(self
            .data_rows()?
            .map(move |row| delimited_line(row, delimiter)))
    }

    /// Stream the current sheet's data rows as lists of canonical cell texts
    pub fn to_lists(&self) -> Result<impl Iterator<Item = Vec<String>> + '_> {
        Ok(self
            .data_rows()?
            .map(|row| row.iter().map(CellValue::as_str).collect()))
    }

    /// Stream the current sheet's data rows as fixed-size arrays of texts
    pub fn to_arrays(&self) -> Result<impl Iterator<Item = Box<[String]>> + '_> {
        Ok(self
            .data_rows()?
            .map(|row| row.iter().map(CellValue::as_str).collect()))
    }

    /// Stream the current sheet's data rows as ordered header-to-text maps.
    ///
    /// Rows shorter than the header are padded with blank values; rows wider
    /// than the header are truncated to it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::HeaderMissing`] when header mode is disabled
    /// for the current sheet.
    pub fn to_maps(&self) -> Result<impl Iterator<Item = IndexMap<String, String>> + '_> {
        self.book()?;
        if !self.header_active {
            return Err(WorkbookError::HeaderMissing);
        }

        let header = &self.header;
        Ok(self.data_rows()?.map(move |row| {
            header
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let value = row.get(i).map(CellValue::as_str).unwrap_or_default();
                    (key.clone(), value)
                })
                .collect()
        }))
    }

    /// Snapshot every sheet's full content as canonical text rows, keyed by
    /// sheet name in storage order.
    ///
    /// Unlike the row shapes, this covers all sheets and never skips a
    /// header row.
    pub fn to_sheet_map(&self) -> Result<IndexMap<String, Vec<Vec<String>>>> {
        Ok(self
            .book()?
            .sheets()
            .map(|(name, sheet)| {
                let rows = sheet
                    .rows()
                    .iter()
                    .map(|row| row.iter().map(CellValue::as_str).collect())
                    .collect();
                (name.to_string(), rows)
            })
            .collect())
    }

    /// Fresh traversal over the current sheet's rows, skipping the physical
    /// header row when header mode is active
    fn data_rows(&self) -> Result<impl Iterator<Item = &[CellValue]> + '_> {
        let sheet = self.book()?.sheet_at(self.current)?;
        let skip = usize::from(self.header_active);
        Ok(sheet.rows().iter().skip(skip).map(Vec::as_slice))
    }

    /// Recompute the cached header from the current sheet's first row
    fn reload_header(&mut self) {
        self.header = match &self.book {
            Some(book) if self.header_active => book
                .sheet_at(self.current)
                .ok()
                .and_then(|sheet| sheet.rows().first())
                .map(|row| row.iter().map(CellValue::as_str).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
    }
}

fn delimited_line(row: &[CellValue], delimiter: char) -> String {
    row.iter()
        .map(|cell| {
            let text = cell.as_str();
            if text.contains(delimiter) {
                format!("\"{text}\"")
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Sheet;

    fn sample_book() -> Book {
        let mut book = Book::default();
        book.add_sheet(
            "people",
            Sheet::from_data(vec![
                vec!["Name", "Age", "Phone"],
                vec!["Alice", "30", "TEL0910,123,456"],
                vec!["Bob", "25", "NYC"],
            ]),
        )
        .unwrap();
        book.add_sheet("empty", Sheet::new()).unwrap();
        book
    }

    #[test]
    fn test_header_matches_first_row() {
        let reader = WorkbookReader::from_book(sample_book());
        assert_eq!(reader.header().unwrap(), ["Name", "Age", "Phone"]);
    }

    #[test]
    fn test_header_empty_without_header_mode() {
        let reader = WorkbookReader::from_book(sample_book()).without_header();
        assert!(reader.header().unwrap().is_empty());
    }

    #[test]
    fn test_header_row_skipped_in_data() {
        let reader = WorkbookReader::from_book(sample_book());
        let lists: Vec<_> = reader.to_lists().unwrap().collect();

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0], ["Alice", "30", "TEL0910,123,456"]);
    }

    #[test]
    fn test_header_row_included_without_header_mode() {
        let reader = WorkbookReader::from_book(sample_book()).without_header();
        let lists: Vec<_> = reader.to_lists().unwrap().collect();

        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0], ["Name", "Age", "Phone"]);
    }

    #[test]
    fn test_csv_quotes_cells_containing_delimiter() {
        let reader = WorkbookReader::from_book(sample_book());
        let first = reader.to_csv().unwrap().next().unwrap();
        assert_eq!(first, "Alice,30,\"TEL0910,123,456\"");
    }

    #[test]
    fn test_csv_custom_delimiter() {
        let reader = WorkbookReader::from_book(sample_book());
        let first = reader.to_csv_with_delimiter('\t').unwrap().next().unwrap();
        assert_eq!(first, "Alice\t30\tTEL0910,123,456");
    }

    #[test]
    fn test_arrays_equal_lists() {
        let reader = WorkbookReader::from_book(sample_book());
        let lists: Vec<Vec<String>> = reader.to_lists().unwrap().collect();
        let arrays: Vec<Box<[String]>> = reader.to_arrays().unwrap().collect();

        assert_eq!(lists.len(), arrays.len());
        for (list, array) in lists.iter().zip(arrays.iter()) {
            assert_eq!(list.as_slice(), array.as_ref());
        }
    }

    #[test]
    fn test_maps_zip_header_with_values() {
        let reader = WorkbookReader::from_book(sample_book());
        let maps: Vec<_> = reader.to_maps().unwrap().collect();

        assert_eq!(maps.len(), 2);
        let keys: Vec<_> = maps[0].keys().cloned().collect();
        assert_eq!(keys, reader.header().unwrap());
        assert_eq!(maps[0]["Name"], "Alice");
        assert_eq!(maps[1]["Phone"], "NYC");
    }

    #[test]
    fn test_maps_pad_short_rows_with_blanks() {
        let mut book = Book::default();
        book.add_sheet(
            "s",
            Sheet::from_data(vec![vec!["a", "b", "c"], vec!["1"]]),
        )
        .unwrap();

        let reader = WorkbookReader::from_book(book);
        let maps: Vec<_> = reader.to_maps().unwrap().collect();
        assert_eq!(maps[0]["a"], "1");
        assert_eq!(maps[0]["b"], "");
        assert_eq!(maps[0]["c"], "");

        // List shape keeps the physical width
        let lists: Vec<_> = reader.to_lists().unwrap().collect();
        assert_eq!(lists[0], ["1"]);
    }

    #[test]
    fn test_maps_require_header() {
        let mut reader = WorkbookReader::from_book(sample_book());
        reader.turn_to_sheet_with_header(0, false).unwrap();

        assert!(matches!(reader.to_maps(), Err(WorkbookError::HeaderMissing)));
    }

    #[test]
    fn test_shapes_are_restartable() {
        let reader = WorkbookReader::from_book(sample_book());
        assert_eq!(reader.to_csv().unwrap().count(), 2);
        assert_eq!(reader.to_csv().unwrap().count(), 2);
    }

    #[test]
    fn test_turn_to_sheet_rederives_header() {
        let mut reader = WorkbookReader::from_book(sample_book());
        reader.turn_to_sheet(1).unwrap();

        assert_eq!(reader.current_sheet_name().unwrap(), "empty");
        // Zero-row sheet yields an empty header without error
        assert!(reader.header().unwrap().is_empty());

        reader.turn_to_sheet(0).unwrap();
        assert_eq!(reader.header().unwrap(), ["Name", "Age", "Phone"]);
    }

    #[test]
    fn test_turn_to_sheet_header_override() {
        let mut reader = WorkbookReader::from_book(sample_book());
        reader.turn_to_sheet_with_header(0, false).unwrap();
        assert!(reader.header().unwrap().is_empty());
        assert_eq!(reader.to_lists().unwrap().count(), 3);

        reader.turn_to_sheet_named_with_header("people", true).unwrap();
        assert_eq!(reader.header().unwrap().len(), 3);
    }

    #[test]
    fn test_turn_to_unknown_sheet_fails() {
        let mut reader = WorkbookReader::from_book(sample_book());

        assert!(matches!(
            reader.turn_to_sheet(99),
            Err(WorkbookError::SheetNotFound { name }) if name == "index 99"
        ));
        assert!(matches!(
            reader.turn_to_sheet_named("hahaha"),
            Err(WorkbookError::SheetNotFound { name }) if name == "hahaha"
        ));
    }

    #[test]
    fn test_sheet_names() {
        let reader = WorkbookReader::from_book(sample_book());
        assert_eq!(reader.sheet_names().unwrap(), vec!["people", "empty"]);
        assert_eq!(reader.current_sheet_name().unwrap(), "people");
    }

    #[test]
    fn test_sheet_map_snapshots_all_sheets() {
        let reader = WorkbookReader::from_book(sample_book());
        let map = reader.to_sheet_map().unwrap();

        assert_eq!(
            map.keys().cloned().collect::<Vec<_>>(),
            ["people", "empty"]
        );
        // Full content per sheet, header row included
        assert_eq!(map["people"].len(), 3);
        assert_eq!(map["people"][0], ["Name", "Age", "Phone"]);
        assert_eq!(map["people"][1], ["Alice", "30", "TEL0910,123,456"]);
        assert!(map["empty"].is_empty());
    }

    #[test]
    fn test_every_operation_fails_after_close() {
        let mut reader = WorkbookReader::from_book(sample_book());
        reader.close();

        assert!(matches!(reader.header(), Err(WorkbookError::Closed)));
        assert!(matches!(reader.sheet_names(), Err(WorkbookError::Closed)));
        assert!(matches!(
            reader.current_sheet_name(),
            Err(WorkbookError::Closed)
        ));
        assert!(matches!(
            reader.turn_to_sheet(0),
            Err(WorkbookError::Closed)
        ));
        assert!(matches!(reader.to_csv().map(|_| ()), Err(WorkbookError::Closed)));
        assert!(matches!(reader.to_lists().map(|_| ()), Err(WorkbookError::Closed)));
        assert!(matches!(reader.to_arrays().map(|_| ()), Err(WorkbookError::Closed)));
        assert!(matches!(reader.to_maps().map(|_| ()), Err(WorkbookError::Closed)));
        assert!(matches!(reader.to_sheet_map(), Err(WorkbookError::Closed)));

        // A second close is a no-op
        reader.close();
    }
}
