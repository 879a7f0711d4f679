//! Request middleware.

pub mod session;

pub use session::{ClientInfo, OsasAdmin, PresOrg, require_osas, require_pres};
