//! admissions-engine - filtered access and demographic breakdowns over a
//! hospital-admissions table
//!
//! - `store`: record store boundary and its SQLite implementation
//! - `engine`: predicates, birth-year normalization, paging, aggregation
//! - `http_server`: dashboard API
//! - `cli`: serve and one-shot commands
//! - `observability`: structured logs and counters

pub mod cli;
pub mod engine;
pub mod http_server;
pub mod observability;
pub mod store;
