pub mod session;

pub use session::{Services, StorefrontSession};
