// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the PIM client.
//!
//! The configuration file is a small JSON document:
//!
//! ```json
//! {
//!     "version": 1,
//!     "pim": {
//!         "uri": "dns:pim.svc.com:80",
//!         "headers": { "metadata-info": "value" },
//!         "tls": false
//!     }
//! }
//! ```
//!
//! With `"tls": true`, the headers must contain an `authorization` header
//! carrying a bearer token. It is moved out of the headers and sent as the
//! credential of the secure channel.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{PimError, Result};

/// Environment variable naming the configuration file.
pub const CONFIGURATION_PATH_ENVIRONMENT_VARIABLE: &str = "ANSYS_PLATFORM_INSTANCEMANAGEMENT_CONFIG";

/// Only supported version of the configuration file.
pub const CONFIGURATION_VERSION: u64 = 1;

const BEARER_PREFIX: &str = "Bearer ";
const BEARER_REQUIRED: &str =
    "An authorization header with a bearer token is required for a secure connection.";

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("variable pattern is valid")
});

/// Whether the environment names a configuration file.
pub fn is_configured() -> bool {
    std::env::var_os(CONFIGURATION_PATH_ENVIRONMENT_VARIABLE).is_some()
}

/// Validated settings to reach the PIM API.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    uri: String,
    headers: Vec<(String, String)>,
    tls: bool,
    access_token: Option<String>,
}

impl Configuration {
    /// Create a configuration from its parts.
    ///
    /// A secure configuration requires an access token.
    pub fn new(
        uri: impl Into<String>,
        headers: Vec<(String, String)>,
        tls: bool,
        access_token: Option<String>,
    ) -> Result<Self> {
        if tls && access_token.is_none() {
            return Err(PimError::InvalidConfiguration {
                path: "<inline configuration>".to_string(),
                reason: BEARER_REQUIRED.to_string(),
            });
        }

        Ok(Self {
            uri: uri.into(),
            headers,
            tls,
            access_token: if tls { access_token } else { None },
        })
    }

    /// Load the configuration file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        debug!(path = %label, "Loading PIM configuration");

        let content = std::fs::read_to_string(path).map_err(|e| PimError::InvalidConfiguration {
            path: label.clone(),
            reason: format!("The file cannot be read: {e}."),
        })?;

        Self::parse(&label, &content)
    }

    /// Load the configuration file named by the environment.
    ///
    /// Variables referenced in the path (`$VAR` or `${VAR}`) are expanded.
    pub fn from_environment() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Configuration::from_environment`], reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(CONFIGURATION_PATH_ENVIRONMENT_VARIABLE).ok_or(PimError::NotConfigured)?;
        let path = expand_vars(&raw, &lookup);
        Self::from_file(path)
    }

    /// Parse and validate the content of a configuration file.
    ///
    /// `path` only labels errors.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        let invalid = |reason: String| PimError::InvalidConfiguration {
            path: path.to_string(),
            reason,
        };

        let document: Value =
            serde_json::from_str(content).map_err(|_| invalid("Invalid json.".to_string()))?;
        let Value::Object(root) = document else {
            return Err(invalid("Invalid json.".to_string()));
        };

        let version = entry(&root, "version").map_err(&invalid)?;
        // A JSON number compares by value, so `1.0` names version 1 too.
        if version.as_f64() != Some(CONFIGURATION_VERSION as f64) {
            let version = match version {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(invalid(format!(
                "Unsupported version \"{version}\". Consider upgrading pim-client."
            )));
        }

        let pim = entry(&root, "pim")
            .map_err(&invalid)?
            .as_object()
            .ok_or_else(|| invalid(must_be("pim", "an object")))?;

        let tls = entry(pim, "tls")
            .map_err(&invalid)?
            .as_bool()
            .ok_or_else(|| invalid(must_be("tls", "a boolean")))?;
        let uri = entry(pim, "uri")
            .map_err(&invalid)?
            .as_str()
            .ok_or_else(|| invalid(must_be("uri", "a string")))?
            .to_string();
        let mut headers = entry(pim, "headers")
            .map_err(&invalid)?
            .as_object()
            .ok_or_else(|| invalid(must_be("headers", "an object")))?
            .iter()
            .map(|(key, value)| match value {
                Value::String(value) => Ok((key.clone(), value.clone())),
                _ => Err(invalid(must_be(&format!("headers.{key}"), "a string"))),
            })
            .collect::<Result<Vec<_>>>()?;

        let access_token = if tls {
            info!("The connection to the server will use a secure channel.");
            let position = headers
                .iter()
                .position(|(key, value)| {
                    key.eq_ignore_ascii_case("authorization") && value.starts_with(BEARER_PREFIX)
                })
                .ok_or_else(|| invalid(BEARER_REQUIRED.to_string()))?;
            let (_, value) = headers.remove(position);
            Some(value[BEARER_PREFIX.len()..].to_string())
        } else {
            None
        };

        Ok(Self {
            uri,
            headers,
            tls,
            access_token,
        })
    }

    /// Address of the PIM API, in gRPC name-resolution syntax.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Headers added to every request, in file order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Whether the connection is encrypted and authenticated.
    pub fn tls(&self) -> bool {
        self.tls
    }

    /// Bearer token of a secure connection.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("uri", &self.uri)
            .field("headers", &self.headers)
            .field("tls", &self.tls)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn entry<'a>(object: &'a Map<String, Value>, key: &str) -> std::result::Result<&'a Value, String> {
    object
        .get(key)
        .ok_or_else(|| format!("The configuration is missing the entry {key}."))
}

fn must_be(key: &str, kind: &str) -> String {
    format!("The entry {key} must be {kind}.")
}

/// Expand `$VAR` and `${VAR}` references. Unknown variables are kept as written.
fn expand_vars<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
