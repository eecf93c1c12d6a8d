//! Domain layer: record types, validation and conversion.

pub mod conversion;
pub mod definitions;
pub mod entities;
pub mod errors;
pub mod groups;
pub mod hex;
pub mod value_objects;

pub use conversion::*;
pub use definitions::*;
pub use entities::*;
pub use errors::*;
pub use groups::*;
pub use hex::*;
pub use value_objects::*;
