pub mod config;
pub mod error;
pub mod horizon;
pub mod options;
pub mod types;

pub use config::Config;
pub use error::SocialDssError;
pub use horizon::TimeHorizon;
pub use options::{CollectOptions, VerifyOptions};
pub use types::*;
