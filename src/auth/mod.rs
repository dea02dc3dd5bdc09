pub use authenticator::{AuthError, Authenticator};

pub mod authenticator;
pub mod storage;
pub mod token;
