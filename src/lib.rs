pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{Services, StorefrontSession};
pub use config::StorefrontConfig;
pub use core::{
    cart::CartStore,
    checkout::{CheckoutError, CheckoutReceipt, CheckoutSequencer, LineRejection, PartialFailure},
};
pub use utils::error::{InventoryError, Result, StoreError};
