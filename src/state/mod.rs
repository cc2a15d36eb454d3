pub mod price_snapshot;

pub use price_snapshot::PriceSnapshot;
