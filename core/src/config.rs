//! Client configuration: server address and credentials.
//!
//! A `ClientConfig` is built once and never mutated. Empty strings are
//! normalised to `None` so that an unset credential never produces a header.

/// Environment variable holding the server base address.
pub const SERVER_ENV: &str = "DRONE_SERVER";
/// Environment variable holding the personal bearer token.
pub const TOKEN_ENV: &str = "DRONE_TOKEN";
/// Environment variable holding the anti-forgery token.
pub const CSRF_ENV: &str = "DRONE_CSRF";

/// Server address plus optional bearer and CSRF tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    server: String,
    token: Option<String>,
    csrf: Option<String>,
}

impl ClientConfig {
    pub fn new(server: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            token: non_empty(token.into()),
            csrf: None,
        }
    }

    /// Attach an anti-forgery token, sent as `X-CSRF-TOKEN`.
    pub fn with_csrf(mut self, csrf: impl Into<String>) -> Self {
        self.csrf = non_empty(csrf.into());
        self
    }

    /// Read `DRONE_SERVER`, `DRONE_TOKEN` and `DRONE_CSRF` from the process
    /// environment. Missing variables leave the field empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: lookup(SERVER_ENV).unwrap_or_default(),
            token: lookup(TOKEN_ENV).and_then(non_empty),
            csrf: lookup(CSRF_ENV).and_then(non_empty),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn csrf(&self) -> Option<&str> {
        self.csrf.as_deref()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn new_keeps_server_and_token() {
        let config = ClientConfig::new("https://drone.example.com", "abc");
        assert_eq!(config.server(), "https://drone.example.com");
        assert_eq!(config.token(), Some("abc"));
        assert_eq!(config.csrf(), None);
    }

    #[test]
    fn empty_token_is_treated_as_absent() {
        let config = ClientConfig::new("https://drone.example.com", "").with_csrf("");
        assert_eq!(config.token(), None);
        assert_eq!(config.csrf(), None);
    }

    #[test]
    fn lookup_reads_all_three_variables() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("DRONE_SERVER", "http://ci"),
            ("DRONE_TOKEN", "t"),
            ("DRONE_CSRF", "c"),
        ]));
        assert_eq!(config.server(), "http://ci");
        assert_eq!(config.token(), Some("t"));
        assert_eq!(config.csrf(), Some("c"));
    }

    #[test]
    fn lookup_with_subset_leaves_missing_fields_empty() {
        let config = ClientConfig::from_lookup(lookup_from(&[("DRONE_SERVER", "http://ci")]));
        assert_eq!(config.server(), "http://ci");
        assert_eq!(config.token(), None);
        assert_eq!(config.csrf(), None);

        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.server(), "");
    }

    #[test]
    #[serial_test::serial]
    fn from_env_reads_process_environment() {
        std::env::set_var(SERVER_ENV, "http://env-ci");
        std::env::set_var(TOKEN_ENV, "env-token");
        std::env::remove_var(CSRF_ENV);

        let config = ClientConfig::from_env();
        assert_eq!(config.server(), "http://env-ci");
        assert_eq!(config.token(), Some("env-token"));
        assert_eq!(config.csrf(), None);

        std::env::remove_var(SERVER_ENV);
        std::env::remove_var(TOKEN_ENV);
    }
}
