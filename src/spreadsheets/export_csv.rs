use crate::db::snapshots::{SnapshotRow, SNAPSHOT_COLUMNS};
use crate::errors::ServerError;
use crate::responses::csv::csv_response;
use crate::responses::ResultResp;

/// Export a snapshot blob as CSV, same header and column order as the XLSX
/// export.
pub fn export_snapshot_csv(rows: &[SnapshotRow], snapshot_name: &str) -> ResultResp {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(SNAPSHOT_COLUMNS)
        .map_err(|e| ServerError::XlsxError(format!("Failed to write CSV header: {e}")))?;

    for row in rows {
        writer
            .write_record(row.values())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write CSV row: {e}")))?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| ServerError::XlsxError(format!("Failed to finish CSV: {e}")))?;

    csv_response(buffer, &format!("{snapshot_name}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_the_persisted_column_order() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(SNAPSHOT_COLUMNS).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("name,cnpj,seller_name,recency,frequency,value"));
    }

    #[test]
    fn values_with_commas_are_quoted() {
        let row = SnapshotRow {
            name: "Acme, Ltda".into(),
            cnpj: "123".into(),
            ..Default::default()
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(row.values()).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("\"Acme, Ltda\",123"));
    }
}
