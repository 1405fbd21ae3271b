//! Domain models for the WMS Basic warehouse platform

mod dashboard;
mod movement;
mod pallet;
mod position;
mod product;
mod rack;
mod stock;
mod warehouse;

pub use dashboard::*;
pub use movement::*;
pub use pallet::*;
pub use position::*;
pub use product::*;
pub use rack::*;
pub use stock::*;
pub use warehouse::*;
