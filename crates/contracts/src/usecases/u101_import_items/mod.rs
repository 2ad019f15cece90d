pub mod request;
pub mod response;
pub mod session;

pub use request::BulkCreateItemsRequest;
pub use response::{BulkCreateItemsResponse, CommitResult, RowFailure};
pub use session::{ImportSessionView, ImportStage, ValidatedRow};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportItems;

impl UseCaseMetadata for ImportItems {
    fn usecase_index() -> &'static str {
        "u101"
    }

    fn usecase_name() -> &'static str {
        "import_items"
    }

    fn display_name() -> &'static str {
        "Import items from CSV"
    }
}
