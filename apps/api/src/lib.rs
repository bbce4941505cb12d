//! Resume version families.
//!
//! A resume can be duplicated into versions that all hang off one root
//! record. This crate keeps that tree flat, numbers versions, tracks the
//! single master per family, and blocks deletes that would orphan or cascade
//! through other versions. It also compares and merges versions.

pub mod config;
pub mod db;
pub mod errors;
pub mod ids;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod versions;
