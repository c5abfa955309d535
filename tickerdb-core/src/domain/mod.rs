//! Domain types shared by the provider, the store and the CLI.

pub mod bar;
pub mod period;
pub mod ticker;

pub use bar::PriceBar;
pub use period::Period;
pub use ticker::{InfoPayload, TickerInfo};
