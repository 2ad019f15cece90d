pub mod commit;
pub mod csv_tokenizer;
pub mod error;
pub mod executor;
pub mod file_check;
pub mod items_api_client;
pub mod reference_matcher;
pub mod row_normalizer;
pub mod row_validator;
pub mod session;
pub mod session_store;
pub mod template;

pub use error::ImportError;
pub use executor::{spawn_session_cleanup, ImportExecutor};
pub use file_check::FileLimits;
pub use items_api_client::{HttpItemsApi, ItemsApi};
pub use session_store::SessionStore;
