pub mod aggregate;

pub use aggregate::{UnitOfMeasure, UnitOfMeasureId};
