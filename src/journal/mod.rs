pub mod models;
pub mod reader;
pub mod writer;

pub use models::PredictionLogEntry;
pub use reader::read_recent;
pub use writer::{spawn_journal, JournalHandle};
