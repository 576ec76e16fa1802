//! Token models: redacted secrets, genuine bearer credentials, and held state.

pub mod held;
pub mod record;
pub mod secret;

pub use held::*;
pub use record::*;
pub use secret::*;
