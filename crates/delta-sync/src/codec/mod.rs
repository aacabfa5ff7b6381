//! Wire codecs for updates and operations.

pub mod json;
