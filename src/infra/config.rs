use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// 网关配置，启动时读一次
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub access_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = get("SYNTHGEN_API_BASE_URL")
            .or_else(|| get("API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(anyhow!("API base url must be http(s): {}", api_base_url));
        }

        let bind_raw = get("SYNTHGEN_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .with_context(|| format!("invalid SYNTHGEN_BIND_ADDR: {}", bind_raw))?;

        let timeout_secs = match get("SYNTHGEN_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("invalid SYNTHGEN_REQUEST_TIMEOUT_SECS: {}", raw))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("SYNTHGEN_REQUEST_TIMEOUT_SECS must be greater than 0"));
        }

        Ok(Self {
            api_base_url,
            bind_addr,
            request_timeout: Duration::from_secs(timeout_secs),
            access_token: get("SYNTHGEN_ACCESS_TOKEN"),
        })
    }

    pub fn for_remote(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            access_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert_eq!(cfg.request_timeout, Duration::from_secs(120));
        assert!(cfg.access_token.is_none());
    }

    #[test]
    fn overrides_and_fallback_key() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "https://gen.example.com/"),
            ("SYNTHGEN_BIND_ADDR", "127.0.0.1:8081"),
            ("SYNTHGEN_REQUEST_TIMEOUT_SECS", "15"),
            ("SYNTHGEN_ACCESS_TOKEN", "abc"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_base_url, "https://gen.example.com");
        assert_eq!(cfg.bind_addr.port(), 8081);
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
        assert_eq!(cfg.access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup(&[("SYNTHGEN_REQUEST_TIMEOUT_SECS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SYNTHGEN_BIND_ADDR", "nope")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SYNTHGEN_API_BASE_URL", "ftp://x")])).is_err());
    }
}
