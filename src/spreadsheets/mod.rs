pub mod export_csv;
pub mod export_xlsx;
