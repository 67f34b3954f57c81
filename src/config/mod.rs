use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PLATFORM: &str = "instagram";

/// Runtime configuration injected by the hosting page as `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub log_level: String,
    pub platform: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut config = Self::defaults();

        let Some(env) = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object())
        else {
            return config;
        };

        // Both `API_URL` (documented) and `api_url` spellings are accepted.
        let read = |upper: &str, lower: &str| -> Option<String> {
            [upper, lower].into_iter().find_map(|key| {
                js_sys::Reflect::get(&env, &key.into())
                    .ok()
                    .and_then(|v| v.as_string())
                    .filter(|s| !s.trim().is_empty())
            })
        };

        if let Some(v) = read("API_URL", "api_url") {
            config.api_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = read("LOG_LEVEL", "log_level") {
            config.log_level = v;
        }
        if let Some(v) = read("PLATFORM", "platform") {
            config.platform = v;
        }

        config
    }

    pub fn defaults() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = EnvConfig::defaults();
        assert_eq!(c.api_url, "http://localhost:8000");
        assert_eq!(c.log_level, "info");
        assert_eq!(c.platform, "instagram");
    }
}
