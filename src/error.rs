use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("spreadsheet is not a readable workbook: {0}")]
    MalformedSpreadsheet(String),

    #[error("no usable serif font: {0}")]
    FontLoad(String),

    #[error("template image failed to decode: {0}")]
    TemplateLoad(String),

    #[error("row {0} has no recipient name in the first column")]
    MissingName(u32),

    #[error("rendered certificate could not be written: {0}")]
    ImageWrite(String),

    #[error("pdf serialization failed: {0}")]
    PdfWrite(String),

    #[error("workbook serialization failed: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
