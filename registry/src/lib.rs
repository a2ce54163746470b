//! Kompile Symbol Registry
//!
//! Interns labels into canonical symbols with dense ordinals, and
//! reconciles persisted symbols with a live registry.

mod error;
mod registry;
mod symbol;

pub use error::{RegistryError, RegistryResult};
pub use registry::SymbolRegistry;
pub use symbol::{Symbol, SymbolRecord};
