mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use settings::DEFAULT_JWT_ISSUER;
pub(crate) use types::{ConfigError, Environment, SeedAccount, SecuritySettings, Settings};
