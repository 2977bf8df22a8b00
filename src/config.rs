use std::env;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TOKEN_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";
pub const DEFAULT_COMPLETIONS_URL: &str =
    "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/completions_pro";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "你是一名资深的专业的猫科医生，你能够根据猫的症状，诊断出猫的疾病，并简短地给出治疗方案，不超过50字。";
pub const DEFAULT_HISTORY_WINDOW: usize = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Provider credentials. The secret is kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub trusted_hosts: Vec<String>,
    pub credentials: Credentials,
    pub token_url: String,
    pub completions_url: String,
    pub system_prompt: String,
    pub history_window: usize,
    pub timeouts: Timeouts,
}

impl AppConfig {
    /// Build the service configuration from process environment variables.
    ///
    /// Required: `QIANFAN_AK`, `QIANFAN_SK`.
    ///
    /// Optional: `HOST`, `PORT`, `TRUSTED_HOSTS` (comma separated),
    /// `TOKEN_URL`, `COMPLETIONS_URL`, `SYSTEM_PROMPT`, `HISTORY_WINDOW`,
    /// `REQUEST_TIMEOUT_SECS`, `CONNECT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Missing(key.to_string()))
        };

        let credentials = Credentials {
            client_id: required("QIANFAN_AK")?,
            client_secret: required("QIANFAN_SK")?,
        };

        let history_window = parse_positive(&lookup, "HISTORY_WINDOW", DEFAULT_HISTORY_WINDOW)?;
        let request_secs =
            parse_positive(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let connect_secs =
            parse_positive(&lookup, "CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let timeouts = Timeouts {
            request_secs,
            connect_secs,
        };

        let trusted_hosts = lookup("TRUSTED_HOSTS")
            .map(|raw| {
                raw.split(',')
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|hosts| !hosts.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            trusted_hosts,
            credentials,
            token_url: lookup("TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            completions_url: lookup("COMPLETIONS_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETIONS_URL.to_string()),
            system_prompt: lookup("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            history_window,
            timeouts,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            value: raw,
        }),
    }
}

/// Like [`parse_or`] but rejects zero.
fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Default + PartialEq + ToString,
{
    let value = parse_or(lookup, key, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            var: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}
