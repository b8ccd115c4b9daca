//! Provider configuration
//!
//! Each setting comes from the provider block when it is set there and from
//! its `HASHICUPS_*` environment variable otherwise. Unknown values and empty
//! results are reported as one diagnostic per setting.

use std::fmt;
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

pub const ENV_HOST: &str = "HASHICUPS_HOST";
pub const ENV_USERNAME: &str = "HASHICUPS_USERNAME";
pub const ENV_PASSWORD: &str = "HASHICUPS_PASSWORD";

/// A secret that never shows up in Debug or Display output
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for Sensitive<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub host: String,
    pub username: String,
    pub password: Sensitive<String>,
}

struct Setting {
    attribute: &'static str,
    label: &'static str,
    env: &'static str,
}

static SETTINGS: [Setting; 3] = [
    Setting {
        attribute: "host",
        label: "Host",
        env: ENV_HOST,
    },
    Setting {
        attribute: "username",
        label: "Username",
        env: ENV_USERNAME,
    },
    Setting {
        attribute: "password",
        label: "Password",
        env: ENV_PASSWORD,
    },
];

impl ProviderConfig {
    /// Resolve settings from `config`, falling back to `env` lookups
    pub fn resolve<F>(config: &DynamicValue, env: F) -> Result<Self, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let unknown: Vec<Diagnostic> = SETTINGS
            .iter()
            .filter(|s| matches!(config_value(config, s), Some(Dynamic::Unknown)))
            .map(|s| {
                Diagnostic::error(
                    format!("Unknown HashiCups API {}", s.label),
                    format!(
                        "The provider cannot create the HashiCups API client as there is an unknown \
                         configuration value for the HashiCups API {}. Either target apply the source \
                         of the value first, set the value statically in the configuration, or use \
                         the {} environment variable.",
                        s.attribute, s.env
                    ),
                )
                .with_attribute(AttributePath::new(s.attribute))
            })
            .collect();

        if !unknown.is_empty() {
            return Err(unknown);
        }

        let mut diagnostics = Vec::new();
        let [host, username, password] = SETTINGS.each_ref().map(|setting| {
            let value = match config_value(config, setting) {
                Some(Dynamic::String(s)) => s.clone(),
                _ => env(setting.env).unwrap_or_default(),
            };

            if value.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Missing HashiCups API {}", setting.label),
                        format!(
                            "The provider cannot create the HashiCups API client as there is a missing \
                             or empty value for the HashiCups API {}. Set the {} value in the \
                             configuration or use the {} environment variable. If either is already \
                             set, ensure the value is not empty.",
                            setting.attribute, setting.attribute, setting.env
                        ),
                    )
                    .with_attribute(AttributePath::new(setting.attribute)),
                );
            }
            value
        });

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        Ok(Self {
            host,
            username,
            password: Sensitive::new(password),
        })
    }

    /// Resolve against the process environment
    pub fn from_env(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }
}

/// A missing attribute or a null provider block both read as unset
fn config_value<'a>(config: &'a DynamicValue, setting: &Setting) -> Option<&'a Dynamic> {
    config.get(&AttributePath::new(setting.attribute)).ok()
}
