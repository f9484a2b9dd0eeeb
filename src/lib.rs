//! Relational schema and loaders for a Pokemon reference dataset.
//!
//! Tables are declared as static [`schema::TableSchema`] values, records are
//! plain structs in [`model`], and [`db::Database`] is the only way to reach
//! storage. The [`seed`] module builds growth-rate rows from a JSON fixture.

pub mod cli;
pub mod config;
pub mod db;
pub mod filter;
pub mod model;
pub mod parser;
pub mod schema;
pub mod seed;

pub use cli::{Cli, Commands};
pub use db::Database;
pub use seed::SeedError;
