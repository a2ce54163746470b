//! Kompile Core Types
//!
//! This crate provides the foundational types used throughout the compiler:
//! - Attribute store (the `Attributes` map and the tagged `AttrValue`)
//! - Sorts and sort signatures
//! - Source locations
//! - Common error types

mod attributes;
mod error;
mod location;
mod sort;

pub use attributes::*;
pub use error::*;
pub use location::*;
pub use sort::*;
