//! HTTP handlers for the WMS Basic API

mod dashboard;
mod health;
mod movement;
mod pallet;
mod position;
mod product;
mod stock;
mod warehouse;

pub use dashboard::*;
pub use health::*;
pub use movement::*;
pub use pallet::*;
pub use position::*;
pub use product::*;
pub use stock::*;
pub use warehouse::*;
