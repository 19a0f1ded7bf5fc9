//! Session Request Module
//! Mission: Manage the mentoring request lifecycle (pending -> accepted/rejected)

pub mod api;
pub mod models;
pub mod store;

pub use store::RequestStore;
