//! Weather state shared by the watch and phone sides of Sunshine
//!
//! Provides the condition-code classification used to pick an icon and the
//! lock-protected cache the sync listeners write and the render path reads.

pub mod cache;
pub mod types;

pub use cache::WeatherCache;
pub use types::*;
