pub mod clients;
pub mod connection;
pub mod orders;
pub mod runs;
pub mod sellers;
pub mod snapshots;

pub use connection::Database;
