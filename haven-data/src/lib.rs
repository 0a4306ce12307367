//! Environmental data access for the Haven engine.
//!
//! Responsibilities:
//! - Sample upstream gridded datasets through a [`GeoDataSource`].
//! - Convert raw variables into [`EnvironmentalProfile`] characteristics.
//! - Absorb upstream failures behind a defaults table.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `haven-scorer`).
//! - Keep blocking I/O off async executors; the HTTP source owns its runtime.
//!
//! Invariants:
//! - [`GeoDataGateway::get_characteristics`] always returns a complete
//!   profile, whatever the providers do.
//! - No global mutable state.
//!
//! [`GeoDataSource`]: haven_core::GeoDataSource
//! [`EnvironmentalProfile`]: haven_core::EnvironmentalProfile

pub mod conversions;
mod defaults;
mod gateway;
pub mod http;

#[doc(hidden)]
pub mod test_support;

pub use defaults::default_characteristics;
pub use gateway::{DEFAULT_BUFFER_DEGREES, GatewayConfig, GeoDataGateway, derive};
