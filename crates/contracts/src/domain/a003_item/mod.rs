pub mod aggregate;

pub use aggregate::{CreateItemRequest, ItemId, ItemSummary};
