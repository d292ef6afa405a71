// Resource description and the default data access it builds on

pub mod records;
pub mod traits;

pub use traits::{ApiResource, WriteKind};
