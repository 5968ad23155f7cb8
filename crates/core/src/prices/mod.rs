pub mod prices_model;
pub mod prices_traits;

pub use prices_model::*;
pub use prices_traits::PriceRepositoryTrait;
