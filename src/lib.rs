pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod network;
pub mod ranked;
pub mod record;
pub mod terms;
pub mod text;
pub mod timeline;

pub use error::{Error, Result};
