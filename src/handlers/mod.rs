//! HTTP handlers for table CRUD and registry exposure.

pub mod entity;
pub mod schema;
pub use entity::*;
pub use schema::*;
