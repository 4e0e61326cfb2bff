use crate::db::snapshots::{SnapshotRow, SNAPSHOT_COLUMNS};
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::Workbook;

/// Export a snapshot blob exactly as persisted: one sheet, the fixed column
/// order, text values. Numeric columns that parse are written as numbers so
/// the sheet sorts properly.
pub fn export_snapshot_xlsx(rows: &[SnapshotRow], snapshot_name: &str) -> ResultResp {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in SNAPSHOT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;

        for (col, value) in row.values().iter().enumerate() {
            let c = col as u16;
            let write_result = match value.parse::<f64>() {
                Ok(n) => worksheet.write_number(r, c, n),
                Err(_) => worksheet.write_string(r, c, *value),
            };
            write_result.map_err(|e| {
                ServerError::XlsxError(format!(
                    "Failed to write row {r}, column '{}': {e}",
                    SNAPSHOT_COLUMNS[col]
                ))
            })?;
        }
    }

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))?;

    xlsx_response(buffer, &format!("{snapshot_name}.xlsx"))
}
