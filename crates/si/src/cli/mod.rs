//! CLI module for `si`
//!
//! One module per top-level command plus shared error, output and
//! connection helpers.

pub mod error;
pub mod output;
pub mod context;

pub mod change_set;
pub mod component;
pub mod config;
pub mod create_schema;
pub mod inspect;
pub mod schema;
pub mod whoami;
