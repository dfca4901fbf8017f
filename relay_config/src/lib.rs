use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{Environment, File, FileFormat};
pub use duration::Duration;
use relay_models::{email_address::EmailAddressWithName, Sensitive};
use serde::Deserialize;

mod duration;

/// Defaults compiled into the binary, see `config.toml` in the workspace root.
pub const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

/// Colon separated list of additional config files.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG_PATH";

pub const ENV_PREFIX: &str = "RELAY";

/// Variables understood for compatibility with existing deployments.
const LEGACY_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "http.port"),
    ("MAIL_USER", "email.username"),
    ("MAIL_PASS", "email.password"),
];

/// The mailbox used to log in historically doubled as sender and recipient.
const LEGACY_DEFAULTS: &[(&str, &str)] = &[
    ("MAIL_USER", "email.from"),
    ("MAIL_USER", "contact.recipient"),
];

/// Loads `.env`, the bundled defaults, all files in `RELAY_CONFIG_PATH` and
/// the process environment.
pub fn load() -> anyhow::Result<Config> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("Failed to load .env file");
        }
    }

    let env = std::env::vars().collect::<config::Map<_, _>>();
    let paths = env
        .get(CONFIG_PATH_ENV)
        .map(|paths| std::env::split_paths(paths).collect::<Vec<_>>())
        .unwrap_or_default();

    load_from(&paths, env)
}

/// Loads the config from the bundled defaults, the given files and the given
/// environment, in increasing order of precedence.
pub fn load_from(
    paths: &[impl AsRef<Path>],
    env: config::Map<String, String>,
) -> anyhow::Result<Config> {
    let builder = LEGACY_DEFAULTS
        .iter()
        .filter_map(|&(var, key)| env.get(var).map(|value| (key, value)))
        .try_fold(config::Config::builder(), |builder, (key, value)| {
            builder.set_default(key, value.as_str())
        })?
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    let builder = paths.iter().try_fold(builder, |builder, path| {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let source = File::from_str(&content, FileFormat::Toml);
        anyhow::Ok(builder.add_source(source))
    })?;

    let legacy = LEGACY_OVERRIDES
        .iter()
        .filter_map(|&(var, key)| env.get(var).map(|value| (key.replace('.', "__"), value.clone())))
        .collect::<config::Map<_, _>>();

    builder
        .add_source(Environment::default().separator("__").source(Some(legacy)))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(Some(env)),
        )
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub username: String,
    pub password: Sensitive<String>,
    pub from: EmailAddressWithName,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub recipient: EmailAddressWithName,
    pub max_name_length: usize,
    pub max_email_length: usize,
    pub max_message_length: usize,
    pub send_timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_concurrent_sends: usize,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}
