//! Concrete filtering policies

pub mod keyword;
pub mod shorts;

pub use keyword::{KeywordGroup, KeywordPolicy};
pub use shorts::{ActionButton, ShortsGroup, ShortsPolicy};
