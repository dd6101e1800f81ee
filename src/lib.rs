pub mod api;
pub mod booking;
pub mod config;
pub mod error;
pub mod mcp;
pub mod model;
pub mod query;
pub mod results;
pub mod search;
pub mod table;
pub mod trips;
