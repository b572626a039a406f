use crate::book::{Book, Sheet, WorkbookFormat};
use crate::cell::CellValue;
use crate::error::{Result, WorkbookError};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::debug;

/// Convert a calamine cell to a CellValue
fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            // Out-of-range serial dates fall back to the raw serial number
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#ERROR: {e:?}")),
    }
}

fn format_for_path(path: &Path) -> WorkbookFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xls") => WorkbookFormat::Xls,
        _ => WorkbookFormat::Xlsx,
    }
}

impl Book {
    /// Open a workbook file, materializing every sheet with typed cells.
    ///
    /// The container format (`.xls` or `.xlsx`) is auto-detected.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::Open`] if the file is missing or cannot be
    /// parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path)?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut book = Book::new(format_for_path(path));
        for name in sheet_names {
            let range = workbook.worksheet_range(&name)?;

            let mut sheet = Sheet::with_name(&name);
            for row in range.rows() {
                sheet.push_row(row.iter().map(cell_from_data).collect());
            }

            book.add_sheet(&name, sheet)?;
        }

        debug!(
            path = %path.display(),
            sheets = book.sheet_count(),
            "opened workbook"
        );
        Ok(book)
    }

    /// Save the book to an `.xlsx` file.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::UnsupportedFormat`] for legacy `.xls` books
    /// (they are read-only), or [`WorkbookError::Write`] if encoding fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = self.to_xlsx_workbook()?;
        workbook.save(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "saved workbook");
        Ok(())
    }

    /// Serialize the book to `.xlsx` bytes.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Book::save`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = self.to_xlsx_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Encode the book into a rust_xlsxwriter workbook, cell by typed cell.
    fn to_xlsx_workbook(&self) -> Result<Workbook> {
        if self.format() == WorkbookFormat::Xls {
            return Err(WorkbookError::UnsupportedFormat(
                "legacy .xls workbooks are read-only".to_string(),
            ));
        }

        let mut workbook = Workbook::new();
        // Without an explicit number format the cell would be a bare serial
        // number and read back as a float
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;

            for (row_idx, row) in sheet.rows().iter().enumerate() {
                let row_num = row_idx as u32;
                for (col_idx, cell) in row.iter().enumerate() {
                    let col_num = col_idx as u16;
                    match cell {
                        CellValue::Blank => {}
                        CellValue::Bool(b) => {
                            worksheet.write_boolean(row_num, col_num, *b)?;
                        }
                        // Excel stores all numbers as f64; integers beyond
                        // 2^53 lose precision in the container itself
                        CellValue::Int(i) => {
                            worksheet.write_number(row_num, col_num, *i as f64)?;
                        }
                        CellValue::Float(f) => {
                            worksheet.write_number(row_num, col_num, *f)?;
                        }
                        CellValue::Text(s) | CellValue::RichText(s) => {
                            worksheet.write_string(row_num, col_num, s)?;
                        }
                        CellValue::DateTime(dt) => {
                            worksheet.write_datetime_with_format(
                                row_num,
                                col_num,
                                dt,
                                &datetime_format,
                            )?;
                        }
                        CellValue::Hyperlink(url) => {
                            worksheet.write_url(row_num, col_num, url.as_str())?;
                        }
                    }
                }
            }
        }

        Ok(workbook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_open_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.xlsx");

        let mut book = Book::default();
        book.add_sheet(
            "Data",
            Sheet::from_data(vec![vec!["Name", "Age"], vec!["Alice", "30"]]),
        )
        .unwrap();

        book.save(&path).unwrap();

        let loaded = Book::open(&path).unwrap();
        assert_eq!(loaded.sheet_names(), vec!["Data"]);
        let sheet = loaded.sheet_at(0).unwrap();
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.rows()[1][0], CellValue::Text("Alice".to_string()));
    }

    #[test]
    fn test_typed_cells_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.xlsx");

        let mut book = Book::default();
        let mut sheet = Sheet::new();
        sheet.push_row(vec![
            CellValue::Text("text".to_string()),
            CellValue::Float(2.1454),
            CellValue::Bool(true),
        ]);
        book.add_sheet("types", sheet).unwrap();

        book.save(&path).unwrap();
        let loaded = Book::open(&path).unwrap();
        let row = &loaded.sheet_at(0).unwrap().rows()[0];

        assert_eq!(row[0], CellValue::Text("text".to_string()));
        assert!(matches!(row[1], CellValue::Float(f) if (f - 2.1454).abs() < 1e-9));
        assert_eq!(row[2], CellValue::Bool(true));
    }

    #[test]
    fn test_datetime_round_trip_keeps_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dates.xlsx");

        let dt = chrono::NaiveDate::from_ymd_opt(2013, 3, 28)
            .unwrap()
            .and_hms_opt(15, 44, 17)
            .unwrap();

        let mut book = Book::default();
        let mut sheet = Sheet::new();
        sheet.push_row(vec![CellValue::DateTime(dt)]);
        book.add_sheet("dates", sheet).unwrap();
        book.save(&path).unwrap();

        let loaded = Book::open(&path).unwrap();
        assert_eq!(
            loaded.sheet_at(0).unwrap().rows()[0][0],
            CellValue::DateTime(dt)
        );
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = Book::open("no_such_file.xls");
        assert!(matches!(result, Err(WorkbookError::Open(_))));
    }

    #[test]
    fn test_xls_books_are_read_only() {
        let mut book = Book::new(WorkbookFormat::Xls);
        book.add_empty_sheet("Sheet0").unwrap();

        assert!(matches!(
            book.to_bytes(),
            Err(WorkbookError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_multi_sheet_order_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.xlsx");

        let mut book = Book::default();
        book.add_empty_sheet("zebra").unwrap();
        book.add_empty_sheet("alpha").unwrap();
        book.add_sheet("mid", Sheet::from_data(vec![vec![1]])).unwrap();

        book.save(&path).unwrap();
        let loaded = Book::open(&path).unwrap();
        assert_eq!(loaded.sheet_names(), vec!["zebra", "alpha", "mid"]);
    }
}
