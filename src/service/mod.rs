//! Admin services: validation, dependency lookup and CRUD orchestration.

mod admin;
pub mod dependents;
mod validation;
pub use admin::{Action, AdminService, WriteOutcome, DEFAULT_LIMIT};
pub use dependents::{find_dependents, DEPENDENTS_LIMIT};
pub use validation::{check_format, RowValidator, WriteMode};
