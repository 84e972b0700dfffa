//! Activity records, their classification and the markdown digest.

pub mod aggregate;
pub mod item;
pub mod report;
pub mod users;
