#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use nestnote::error::{AppError, Result};
use nestnote::sheets::{SheetInfo, SheetStore};

/// In-memory spreadsheet with the same addressing rules as the real store:
/// value ranges are 1-based with the header in row 1, structural deletes
/// are 0-based.
pub struct FakeSheetStore {
    sheets: Mutex<Vec<FakeSheet>>,
}

struct FakeSheet {
    title: String,
    sheet_id: i64,
    rows: Vec<Vec<String>>,
}

impl FakeSheetStore {
    pub fn new() -> Self {
        Self {
            sheets: Mutex::new(Vec::new()),
        }
    }

    pub fn with_sheet(self, title: &str, sheet_id: i64, rows: Vec<Vec<&str>>) -> Self {
        self.sheets.lock().unwrap().push(FakeSheet {
            title: title.to_string(),
            sheet_id,
            rows: owned(rows),
        });
        self
    }

    /// Raw rows of a sheet, header included.
    pub fn rows(&self, title: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.rows.clone())
            .unwrap_or_default()
    }
}

fn owned(rows: Vec<Vec<&str>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect()
}

fn range_title(range: &str) -> &str {
    range.split('!').next().unwrap_or(range)
}

/// 1-based starting row of an A1 range; `Sheet!A:C` has no digits and
/// addresses the whole sheet, so it starts at row 1.
fn range_start_row(range: &str) -> usize {
    range
        .split('!')
        .nth(1)
        .and_then(|cells| cells.split(':').next())
        .map(|cell| {
            cell.chars()
                .filter(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(1)
}

#[async_trait]
impl SheetStore for FakeSheetStore {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let sheets = self.sheets.lock().unwrap();
        sheets
            .iter()
            .find(|s| s.title == range_title(range))
            .map(|s| s.rows.clone())
            .ok_or_else(|| AppError::NotFound("Sheet".to_string()))
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets
            .iter_mut()
            .find(|s| s.title == range_title(range))
            .ok_or_else(|| AppError::NotFound("Sheet".to_string()))?;
        sheet.rows.push(row);
        Ok(())
    }

    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let start = range_start_row(range);
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets
            .iter_mut()
            .find(|s| s.title == range_title(range))
            .ok_or_else(|| AppError::NotFound("Sheet".to_string()))?;
        for (offset, row) in rows.into_iter().enumerate() {
            let index = start - 1 + offset;
            if sheet.rows.len() <= index {
                sheet.rows.resize(index + 1, Vec::new());
            }
            sheet.rows[index] = row;
        }
        Ok(())
    }

    async fn delete_row(&self, sheet_id: i64, start_index: i64) -> Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets
            .iter_mut()
            .find(|s| s.sheet_id == sheet_id)
            .ok_or_else(|| AppError::NotFound("Sheet".to_string()))?;
        let index = start_index as usize;
        if index >= sheet.rows.len() {
            return Err(AppError::Internal(format!(
                "row {start_index} out of range for sheet {sheet_id}"
            )));
        }
        sheet.rows.remove(index);
        Ok(())
    }

    async fn list_sheets(&self) -> Result<Vec<SheetInfo>> {
        let sheets = self.sheets.lock().unwrap();
        Ok(sheets
            .iter()
            .map(|s| SheetInfo {
                title: s.title.clone(),
                sheet_id: s.sheet_id,
            })
            .collect())
    }

    async fn add_sheet(&self, title: &str) -> Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let next_id = sheets.iter().map(|s| s.sheet_id).max().unwrap_or(-1) + 1;
        sheets.push(FakeSheet {
            title: title.to_string(),
            sheet_id: next_id,
            rows: Vec::new(),
        });
        Ok(())
    }

    async fn format_header_bold(&self, _sheet_id: i64, _column_count: i64) -> Result<()> {
        Ok(())
    }
}
