pub mod dashboard;
pub mod login;

pub use dashboard::{dashboard_page, no_snapshot_page};
pub use login::login_page;
