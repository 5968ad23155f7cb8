//! Price provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceProvider` trait that all providers implement
//! - Rate limiting configuration
//! - Concrete provider implementations (Alpha Vantage)

mod capabilities;
mod traits;

pub mod alpha_vantage;

// Re-exports
pub use capabilities::RateLimit;
pub use traits::PriceProvider;
