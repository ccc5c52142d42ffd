//! Sales-tax rate lookup and normalization.

pub mod lookup;
pub mod normalize;

#[cfg(feature = "static_rates")]
pub mod static_rates;
