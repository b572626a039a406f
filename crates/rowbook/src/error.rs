use thiserror::Error;

/// Errors that can occur while accessing a workbook
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("workbook has been released")]
    Closed,

    #[error("sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("header is not found")]
    HeaderMissing,

    #[error("failed to open workbook: {0}")]
    Open(#[from] calamine::Error),

    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkbookError>;
