pub mod cache;
pub mod disk;
pub mod filter;
pub mod users;

pub use disk::{DiskStore, MaterialStore};
pub use filter::{MaterialFilter, SortOrder};
pub use users::{JsonUserDirectory, UserDirectory};
