pub mod ad_manager;
pub mod google_auth;
pub mod mock;
pub mod sheets;
pub mod soap;

pub use ad_manager::AdManagerClient;
pub use google_auth::GoogleAuth;
pub use sheets::SheetsClient;
