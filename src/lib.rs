//! Feedback reporting backend.
//!
//! Stores feedback records (complaint, suggestion, compliment) in Postgres and
//! serves three read-only aggregates over HTTP: the total count, counts by
//! type, and a per-ISO-week breakdown of the trailing four weeks.

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod server;
pub mod store;
pub mod weekly;
