//! Row-oriented access to spreadsheet workbooks
//!
//! Treats a multi-sheet workbook as a sequence of header-labeled or
//! headerless rows, independent of the container format: `calamine` parses
//! `.xls`/`.xlsx` input and `rust_xlsxwriter` encodes `.xlsx` output, while
//! this crate owns sheet navigation, header handling, and lazy row-shape
//! conversion.
//!
//! # Examples
//!
//! ## Reading rows in different shapes
//!
//! ```no_run
//! use rowbook::WorkbookReader;
//!
//! let reader = WorkbookReader::open("data.xlsx")?;
//! println!("columns: {:?}", reader.header()?);
//!
//! for line in reader.to_csv()? {
//!     println!("{line}");
//! }
//! for map in reader.to_maps()? {
//!     println!("{:?}", map.get("Name"));
//! }
//! # Ok::<(), rowbook::WorkbookError>(())
//! ```
//!
//! ## Building a workbook
//!
//! ```no_run
//! use rowbook::{row, WorkbookWriter};
//!
//! let mut writer = WorkbookWriter::new();
//! writer.add_row(row!["Name", "Score"])?;
//! writer.add_row(row!["Alice", 91.5])?;
//! writer.create_and_turn_to_sheet("notes")?;
//! writer.add_row(row!["reviewed", true])?;
//! writer.save("scores.xlsx")?;
//! # Ok::<(), rowbook::WorkbookError>(())
//! ```
//!
//! Once a reader or writer is closed its workbook is released and every
//! further operation fails with [`WorkbookError::Closed`].

mod book;
mod cell;
mod error;
mod reader;
mod writer;
mod xlsx;

/// Re-export the document model.
pub use book::{Book, Sheet, WorkbookFormat};
/// Re-export the cell value type.
pub use cell::CellValue;
/// Re-export error types.
pub use error::{Result, WorkbookError};
/// Re-export the reader.
pub use reader::WorkbookReader;
/// Re-export the writer.
pub use writer::WorkbookWriter;

/// Build a row of [`CellValue`]s from mixed-type expressions.
///
/// Each element is converted with `Into<CellValue>`; use `None::<&str>` (or
/// `CellValue::Blank`) for an empty cell.
///
/// ```
/// use rowbook::{row, CellValue};
///
/// let cells = row!["abc", 123, 1.1, true, None::<&str>];
/// assert_eq!(cells[1], CellValue::Int(123));
/// assert_eq!(cells[4], CellValue::Blank);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        ::std::vec::Vec::<$crate::CellValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::CellValue::from($value)),+]
    };
}
