pub mod config;
pub mod controller;
pub mod error;
pub mod link;
pub mod server;
pub mod storage;
pub mod validation;

mod types;

pub use error::{MaterialError, Result, StoreError};
pub use types::*;
