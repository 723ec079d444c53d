pub mod ai;
pub mod collate;
pub mod db;
pub mod error;
pub mod menu;
pub mod models;
pub mod normalize;
pub mod openai;
pub mod postgrest;
pub mod rotation;
pub mod service;
pub mod shopping;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
