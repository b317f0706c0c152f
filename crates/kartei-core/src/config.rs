use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{DEFAULT_CHARSET, DEFAULT_LINE_BUDGET, DEFAULT_VERSION};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub codec: CodecConfig,
    pub compat: CompatConfig,
    pub logging: LoggingConfig,
}

/// Options shared by the reader and the writer.
#[derive(Debug, Clone, Deserialize)]
pub struct CodecConfig {
    /// Target version token for serialization (`2.1`, `3.0` or `4.0`).
    pub version: String,
    /// Content octets per physical line, excluding the CRLF.
    pub line_budget: usize,
    /// Charset declared for quoted-printable output.
    pub charset: String,
    /// Emit properties whose value is empty.
    pub keep_empty: bool,
    /// Keep unknown parameters when parsing.
    pub preserve_non_standard_parameters: bool,
    /// Emit unknown parameters when serializing.
    pub write_non_standard_parameters: bool,
}

/// Opt-in vendor extensions for 2.1/3.0 output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompatConfig {
    pub x_gender: bool,
    pub x_spouse: bool,
    pub x_anniversary: bool,
    pub x_instant_messenger: bool,
    pub all_address_labels: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional `kartei.toml` and
    /// environment variables, each overriding the one before. Environment
    /// variables use the `KARTEI__SECTION__KEY` form.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_from("kartei.toml", None)
    }

    /// Layers `file` and then the environment over the defaults. `env`
    /// replaces the process environment when given.
    fn load_from(file: &str, env: Option<config::Map<String, String>>) -> Result<Self> {
        Ok(Config::builder()
            .set_default("codec.version", DEFAULT_VERSION)?
            .set_default("codec.line_budget", DEFAULT_LINE_BUDGET as u64)?
            .set_default("codec.charset", DEFAULT_CHARSET)?
            .set_default("codec.keep_empty", false)?
            .set_default("codec.preserve_non_standard_parameters", true)?
            .set_default("codec.write_non_standard_parameters", true)?
            .set_default("compat.x_gender", false)?
            .set_default("compat.x_spouse", false)?
            .set_default("compat.x_anniversary", false)?
            .set_default("compat.x_instant_messenger", false)?
            .set_default("compat.all_address_labels", false)?
            .set_default("logging.level", "info")?
            // TOML file
            .add_source(config::File::new(file, config::FileFormat::Toml).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("KARTEI")
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            line_budget: DEFAULT_LINE_BUDGET,
            charset: DEFAULT_CHARSET.to_string(),
            keep_empty: false,
            preserve_non_standard_parameters: true,
            write_non_standard_parameters: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
