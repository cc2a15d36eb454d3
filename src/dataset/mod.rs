pub mod loader;
pub mod price;
pub mod stats;

pub use loader::load_snapshot;
