//! Decoding of uploaded question files.
//!
//! CSV and XLSX uploads are turned into the same [`ParsedUploadRow`] shape:
//! a map from header cell to cell text, plus the spreadsheet row number for
//! error reporting.

use std::collections::HashMap;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use thiserror::Error;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const QUESTION_TEXT_FIELD: &str = "questionText";
pub const CATEGORIES_FIELD: &str = "categories";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Xlsx,
}

impl UploadFormat {
    /// Picks the decoder for a declared MIME type. Parameters such as
    /// `charset` are ignored.
    pub fn from_mime(mime: &str) -> Result<Self, UploadParseError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            CSV_MIME => Ok(Self::Csv),
            XLSX_MIME => Ok(Self::Xlsx),
            _ => Err(UploadParseError::UnsupportedFormat(essence)),
        }
    }
}

#[derive(MultipartForm)]
pub struct BulkUploadForm {
    #[multipart(limit = "10MB")]
    pub file: Option<TempFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUploadRow {
    /// 1-based row number in the source file, counting the header row.
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl ParsedUploadRow {
    /// Returns the trimmed value of `field`, or `None` when absent or blank.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum UploadParseError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Unsupported file format")]
    UnsupportedFormat(String),
    #[error("failed to read uploaded file")]
    ReadFailed,
    #[error("failed to parse CSV")]
    CsvParseFailed,
    #[error("failed to parse XLSX")]
    XlsxParseFailed,
    #[error("uploaded file has no worksheet")]
    XlsxMissingSheet,
}

impl From<std::io::Error> for UploadParseError {
    fn from(_: std::io::Error) -> Self {
        Self::ReadFailed
    }
}

impl From<csv::Error> for UploadParseError {
    fn from(_: csv::Error) -> Self {
        Self::CsvParseFailed
    }
}

impl From<calamine::Error> for UploadParseError {
    fn from(_: calamine::Error) -> Self {
        Self::XlsxParseFailed
    }
}

impl BulkUploadForm {
    /// Decodes the attached file according to its declared content type.
    pub fn decode(&mut self) -> Result<Vec<ParsedUploadRow>, UploadParseError> {
        let Some(upload) = self.file.as_mut() else {
            return Err(UploadParseError::MissingFile);
        };

        let mime = upload
            .content_type
            .as_ref()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        let format = UploadFormat::from_mime(&mime)?;

        let file = upload.file.as_file_mut();
        file.seek(SeekFrom::Start(0))?;

        decode_rows(BufReader::new(file), format)
    }
}

/// Decodes a whole upload into rows keyed by header cells.
///
/// CSV is streamed record by record; workbooks are buffered in memory first.
pub fn decode_rows<R: Read>(
    mut reader: R,
    format: UploadFormat,
) -> Result<Vec<ParsedUploadRow>, UploadParseError> {
    let (headers, rows) = match format {
        UploadFormat::Csv => parse_csv_rows(reader)?,
        UploadFormat::Xlsx => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            parse_xlsx_rows(bytes)?
        }
    };

    let headers = headers
        .into_iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect::<Vec<_>>();

    let parsed_rows = rows
        .into_iter()
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(row_number, row)| {
            let values = headers
                .iter()
                .zip(row)
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.clone(), value))
                .collect();
            ParsedUploadRow { row_number, values }
        })
        .collect();

    Ok(parsed_rows)
}

/// Header cells plus data rows tagged with their 1-based source row number.
type DecodedSheet = (Vec<String>, Vec<(usize, Vec<String>)>);

fn parse_csv_rows<R: Read>(reader: R) -> Result<DecodedSheet, UploadParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Blank lines and quoted newlines make record index and file line diverge.
        let row_number = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(idx + 2);
        rows.push((row_number, record.iter().map(|s| s.to_string()).collect()));
    }

    Ok((headers, rows))
}

fn parse_xlsx_rows(bytes: Vec<u8>) -> Result<DecodedSheet, UploadParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(UploadParseError::XlsxMissingSheet)??;

    // The range begins at the first used cell, not at sheet row 1.
    let header_row_number = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Ok((vec![], vec![]));
    };

    let headers = header_row.iter().map(cell_to_string).collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (idx, row) in iter.enumerate() {
        rows.push((
            header_row_number + idx + 1,
            row.iter().map(cell_to_string).collect::<Vec<_>>(),
        ));
    }

    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string(),
    }
}
