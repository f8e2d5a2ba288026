pub mod cache;
pub mod converter;

pub use cache::{FileCache, MemoryCache, ResultCache};
