pub mod metrics;
pub mod order;
pub mod phone;
pub mod segment;
pub mod transition;
