//! Business logic layer. Each service is a cheap `Clone` over an
//! `Arc<DbPool>`; handlers never touch the database directly.

pub mod assignments;
pub mod audit;
pub mod costs;
pub mod customs;
pub mod dashboard;
pub mod documents;
pub mod notifications;
pub mod orders;
pub mod projects;
pub mod settings;
pub mod shipments;
pub mod suppliers;
pub mod users;
