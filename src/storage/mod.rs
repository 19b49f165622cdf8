mod clicks;
mod local_storage;
mod schema;
mod types;

pub use clicks::{CLICKS_KEY, MAX_CLICK_HISTORY};
pub use local_storage::THEME_KEY;
pub use schema::Database;
pub use types::{ClickRecord, DatabaseError};
