pub mod pricing;

pub use pricing::estimate;
