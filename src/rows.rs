//! Translation between client-facing indices and spreadsheet rows.
//!
//! Data rows are appended at the bottom of the sheet and presented to
//! clients newest-first, so frontend index 0 always refers to the
//! physically last data row. The sheet keeps its header in row 1, while
//! structural deletes address rows 0-based; `RowLocation` carries every
//! coordinate a caller needs so the off-by-one conversions live here only.

/// Coordinates of one data row, computed from a frontend index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLocation {
    /// 1-based position among data rows, counting from the top (header excluded).
    pub data_row_index: usize,
    /// 1-based sheet row number, header included. A1-notation ranges use this.
    pub sheet_row_index: usize,
    /// Index into the in-memory row array that still has the header at 0.
    pub array_index: usize,
}

impl RowLocation {
    /// 0-based row index for structural delete requests.
    pub fn delete_index(&self) -> usize {
        self.sheet_row_index - 1
    }
}

/// Maps a zero-based index into the reversed view onto sheet coordinates.
///
/// Returns `None` when `frontend_index` falls outside `[0, total_data_rows)`.
/// The mapping is only valid against the exact sheet state the row count was
/// taken from; any concurrent append or delete invalidates it.
pub fn locate_row(frontend_index: i64, total_data_rows: usize) -> Option<RowLocation> {
    if frontend_index < 0 || frontend_index as usize >= total_data_rows {
        return None;
    }

    // frontend 0 -> bottom-most data row -> data row `total_data_rows`
    let data_row_index = total_data_rows - frontend_index as usize;
    Some(RowLocation {
        data_row_index,
        sheet_row_index: data_row_index + 1,
        array_index: data_row_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_maps_to_last_row() {
        let loc = locate_row(0, 5).unwrap();
        assert_eq!(loc.data_row_index, 5);
        assert_eq!(loc.sheet_row_index, 6);
        assert_eq!(loc.array_index, 5);
        assert_eq!(loc.delete_index(), 5);
    }

    #[test]
    fn test_oldest_maps_to_first_data_row() {
        let loc = locate_row(4, 5).unwrap();
        assert_eq!(loc.data_row_index, 1);
        assert_eq!(loc.sheet_row_index, 2);
    }

    #[test]
    fn test_out_of_range_is_none() {
        assert_eq!(locate_row(5, 5), None);
        assert_eq!(locate_row(-1, 5), None);
        assert_eq!(locate_row(0, 0), None);
    }

    #[test]
    fn test_index_algebra_holds_for_every_position() {
        for total in 1..40usize {
            for frontend in 0..total {
                let loc = locate_row(frontend as i64, total).unwrap();
                assert_eq!(loc.sheet_row_index, total - frontend + 1);
                assert_eq!(loc.array_index, loc.data_row_index);
            }
            // one past the end is always rejected
            assert_eq!(locate_row(total as i64, total), None);
        }
    }
}
