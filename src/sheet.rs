use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::io::Cursor;

use crate::error::{Error, Result};

// Issued IDs land in the second column, next to the names.
pub const ID_COLUMN: u16 = 1;

/// One data row of the input sheet. `row` is the 1-based spreadsheet row
/// (the header is row 1); `name` is `None` when the first column is blank.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub row: u32,
    pub name: Option<String>,
}

/// The workbook's cell values plus the IDs assigned so far. Values survive a
/// load/annotate/save cycle; cell styling does not.
#[derive(Debug)]
pub struct RecipientSheet {
    rows: Vec<Vec<Data>>,
    ids: Vec<Option<String>>,
}

impl RecipientSheet {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| Error::MalformedSpreadsheet(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::MalformedSpreadsheet("workbook contains no sheets".into()))?
            .map_err(|e| Error::MalformedSpreadsheet(e.to_string()))?;

        // Re-anchor the used range at A1 so row and column numbers below are
        // absolute, whatever corner the sheet's content starts in.
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Data>> = Vec::with_capacity(start_row as usize + range.height());
        rows.resize_with(start_row as usize, Vec::new);
        for cells in range.rows() {
            let mut row = vec![Data::Empty; start_col as usize];
            row.extend(cells.iter().cloned());
            rows.push(row);
        }

        let ids = vec![None; rows.len()];
        Ok(Self { rows, ids })
    }

    /// Data rows in sheet order, header skipped.
    pub fn recipients(&self) -> Vec<Recipient> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, cells)| Recipient {
                row: idx as u32 + 1,
                name: cells.first().and_then(cell_text),
            })
            .collect()
    }

    /// Records `certificate_id` for the given 1-based spreadsheet row. The
    /// recipient loaded from data position i (0-based) is always row i + 2.
    pub fn annotate(&mut self, row: u32, certificate_id: &str) {
        if row == 0 {
            return;
        }
        if let Some(slot) = self.ids.get_mut(row as usize - 1) {
            *slot = Some(certificate_id.to_string());
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, cells) in self.rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                write_cell(sheet, r as u32, c as u16, cell)?;
            }
            if let Some(id) = &self.ids[r] {
                sheet.write_string(r as u32, ID_COLUMN, id)?;
            }
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// Normalized text of a cell, `None` when blank. `row` is 1-based,
    /// `col` is 0-based, matching `annotate` and `ID_COLUMN`.
    pub fn cell_text(&self, row: u32, col: u16) -> Option<String> {
        if row == 0 {
            return None;
        }
        if let Some(id) = self.ids.get(row as usize - 1)?.as_ref() {
            if col == ID_COLUMN {
                return Some(id.clone());
            }
        }
        self.rows
            .get(row as usize - 1)?
            .get(col as usize)
            .and_then(cell_text)
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Data) -> Result<()> {
    match cell {
        Data::Empty => {}
        Data::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        Data::Float(f) => {
            sheet.write_number(row, col, *f)?;
        }
        Data::Int(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        Data::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Data::DateTime(dt) => {
            sheet.write_number(row, col, dt.as_f64())?;
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => {
            sheet.write_string(row, col, s)?;
        }
        Data::Error(e) => {
            sheet.write_string(row, col, e.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_bytes(names: &[&str]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Certificate ID").unwrap();
        for (i, name) in names.iter().enumerate() {
            sheet.write_string(i as u32 + 1, 0, *name).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn loader_skips_the_header_and_keeps_row_order() {
        let sheet = RecipientSheet::from_bytes(&sheet_bytes(&["Alice", "Bob"])).unwrap();
        let recipients = sheet.recipients();
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].row, 2);
        assert_eq!(recipients[0].name.as_deref(), Some("Alice"));
        assert_eq!(recipients[1].row, 3);
        assert_eq!(recipients[1].name.as_deref(), Some("Bob"));
    }

    #[test]
    fn blank_first_cells_surface_as_missing_names() {
        let sheet = RecipientSheet::from_bytes(&sheet_bytes(&["Alice", "  ", "Bob"])).unwrap();
        let recipients = sheet.recipients();
        assert_eq!(recipients.len(), 3);
        assert_eq!(recipients[1].row, 3);
        assert!(recipients[1].name.is_none());
        assert_eq!(recipients[2].name.as_deref(), Some("Bob"));
    }

    #[test]
    fn annotated_ids_come_back_in_the_second_column() {
        let mut sheet = RecipientSheet::from_bytes(&sheet_bytes(&["Alice", "Bob"])).unwrap();
        sheet.annotate(2, "AAAA-1111-NXSP01");
        sheet.annotate(3, "BBBB-2222-NXSP02");

        let reloaded = RecipientSheet::from_bytes(&sheet.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.cell_text(1, 0).as_deref(), Some("Name"));
        assert_eq!(reloaded.cell_text(2, 0).as_deref(), Some("Alice"));
        assert_eq!(reloaded.cell_text(2, 1).as_deref(), Some("AAAA-1111-NXSP01"));
        assert_eq!(reloaded.cell_text(3, 1).as_deref(), Some("BBBB-2222-NXSP02"));
    }

    #[test]
    fn header_only_sheets_have_no_recipients_but_still_serialize() {
        let sheet = RecipientSheet::from_bytes(&sheet_bytes(&[])).unwrap();
        assert!(sheet.recipients().is_empty());

        let reloaded = RecipientSheet::from_bytes(&sheet.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.cell_text(1, 0).as_deref(), Some("Name"));
    }

    #[test]
    fn non_workbook_bytes_are_rejected_as_malformed() {
        let err = RecipientSheet::from_bytes(b"not a workbook").unwrap_err();
        assert!(matches!(err, Error::MalformedSpreadsheet(_)));
    }

    #[test]
    fn numeric_names_are_read_as_text() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_number(1, 0, 4021.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheet = RecipientSheet::from_bytes(&bytes).unwrap();
        assert_eq!(sheet.recipients()[0].name.as_deref(), Some("4021"));
    }
}
