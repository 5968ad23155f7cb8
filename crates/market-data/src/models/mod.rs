//! Market data models.

mod price;

pub use price::LatestPrice;
