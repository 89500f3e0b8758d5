// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Channel construction for the PIM API.
//!
//! Targets are written in gRPC name-resolution syntax (`dns:host:port`,
//! `ipv4:addr:port`, bare `host:port`...) and translated into the HTTP/2
//! endpoint URI tonic expects.

use std::time::Duration;

use thiserror::Error;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::debug;

use crate::SERVICE_NAME;
use crate::metadata::MetadataInjector;

/// Port used when the target does not name one.
pub const DEFAULT_PORT: u16 = 443;

/// A lazily connected channel that adds the configured metadata to every call.
pub type PimChannel = InterceptedService<Channel, MetadataInjector>;

/// Errors raised while building a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The target address cannot be used.
    #[error("invalid target \"{uri}\": {reason}")]
    InvalidUri { uri: String, reason: String },

    /// A metadata entry cannot be sent.
    #[error("invalid header \"{key}\": {reason}")]
    InvalidHeader { key: String, reason: String },

    /// The transport rejected the endpoint settings.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Transport settings applied on top of the target address.
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Timeout for establishing the connection.
    pub connect_timeout: Option<Duration>,
    /// Interval of HTTP/2 keep-alive pings.
    pub keep_alive_interval: Option<Duration>,
    /// TCP keep-alive.
    pub tcp_keepalive: Option<Duration>,
    /// Prefix of the `user-agent` header.
    pub user_agent: Option<String>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
            keep_alive_interval: None,
            tcp_keepalive: None,
            user_agent: None,
        }
    }
}

impl ChannelOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Enable HTTP/2 keep-alive pings, also while the connection is idle.
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = Some(interval);
        self
    }

    /// Enable TCP keep-alive.
    pub fn with_tcp_keepalive(mut self, interval: Duration) -> Self {
        self.tcp_keepalive = Some(interval);
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Translate a gRPC target into an HTTP/2 endpoint URI.
///
/// Supported forms:
/// - `dns:host:port`, `dns:///host:port` and `dns://authority/host:port`
///   (the DNS authority is ignored)
/// - `ipv4:addr:port[,addr:port...]` and `ipv6:[addr]:port[,...]`, only the
///   first address is used
/// - bare `host:port` or `host`
/// - `http://...` and `https://...`, passed through when the scheme agrees
///   with `secure`
///
/// The port defaults to [`DEFAULT_PORT`].
pub fn endpoint_uri(target: &str, secure: bool) -> Result<String, ChannelError> {
    let invalid = |reason: &str| ChannelError::InvalidUri {
        uri: target.to_string(),
        reason: reason.to_string(),
    };

    let scheme = if secure { "https" } else { "http" };

    if let Some(rest) = target.strip_prefix("http://") {
        if secure {
            return Err(invalid("a secure channel cannot use http"));
        }
        return pass_through(target, rest);
    }
    if let Some(rest) = target.strip_prefix("https://") {
        if !secure {
            return Err(invalid("https requires a secure channel"));
        }
        return pass_through(target, rest);
    }

    let host_port = if let Some(rest) = target.strip_prefix("dns:") {
        match rest.strip_prefix("//") {
            Some(with_authority) => match with_authority.split_once('/') {
                Some((_authority, host_port)) => host_port,
                None => return Err(invalid("missing host after the DNS authority")),
            },
            None => rest,
        }
    } else if let Some(rest) = target.strip_prefix("ipv4:") {
        first_address(rest)
    } else if let Some(rest) = target.strip_prefix("ipv6:") {
        let address = first_address(rest);
        if !address.starts_with('[') && address.contains(':') {
            // Bare IPv6 literal without port.
            return Ok(format!("{scheme}://[{address}]:{DEFAULT_PORT}"));
        }
        address
    } else {
        target
    };

    let authority = authority(target, host_port)?;
    Ok(format!("{scheme}://{authority}"))
}

fn first_address(addresses: &str) -> &str {
    addresses.split(',').next().unwrap_or_default()
}

fn pass_through(target: &str, rest: &str) -> Result<String, ChannelError> {
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ChannelError::InvalidUri {
            uri: target.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(target.to_string())
}

/// Normalize `host[:port]` into `host:port`.
fn authority(target: &str, host_port: &str) -> Result<String, ChannelError> {
    let invalid = |reason: String| ChannelError::InvalidUri {
        uri: target.to_string(),
        reason,
    };

    if host_port.is_empty() {
        return Err(invalid("missing host".to_string()));
    }

    if host_port.starts_with('[') {
        let Some(end) = host_port.find(']') else {
            return Err(invalid("unterminated IPv6 address".to_string()));
        };
        let (host, rest) = host_port.split_at(end + 1);
        return match rest {
            "" => Ok(format!("{host}:{DEFAULT_PORT}")),
            _ => match rest.strip_prefix(':') {
                Some(port) if is_port(port) => Ok(host_port.to_string()),
                _ => Err(invalid(format!("invalid port in \"{host_port}\""))),
            },
        };
    }

    match host_port.rsplit_once(':') {
        None => Ok(format!("{host_port}:{DEFAULT_PORT}")),
        Some((host, port)) if !host.is_empty() && !host.contains(':') && is_port(port) => {
            Ok(host_port.to_string())
        }
        Some(_) => match host_port.split_once(':') {
            Some((scheme, _)) if is_scheme(scheme) => {
                Err(invalid(format!("unsupported target scheme \"{scheme}\"")))
            }
            _ => Err(invalid(format!("invalid address \"{host_port}\""))),
        },
    }
}

fn is_scheme(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_port(port: &str) -> bool {
    !port.is_empty() && port.parse::<u16>().is_ok()
}

/// Build a channel to `target` that adds `metadata` to every call.
///
/// With `tls`, the channel verifies the server against the webpki root
/// certificates. The channel connects lazily on the first call, so building it
/// performs no I/O, but it must be called from within a Tokio runtime.
pub fn build_channel(
    target: &str,
    metadata: MetadataInjector,
    tls: bool,
    options: &ChannelOptions,
) -> Result<PimChannel, ChannelError> {
    let uri = endpoint_uri(target, tls)?;
    let mut endpoint = Endpoint::from_shared(uri.clone())?;

    if let Some(timeout) = options.connect_timeout {
        endpoint = endpoint.connect_timeout(timeout);
    }
    if let Some(interval) = options.keep_alive_interval {
        endpoint = endpoint
            .http2_keep_alive_interval(interval)
            .keep_alive_while_idle(true);
    }
    if let Some(interval) = options.tcp_keepalive {
        endpoint = endpoint.tcp_keepalive(Some(interval));
    }
    if let Some(user_agent) = &options.user_agent {
        endpoint = endpoint.user_agent(user_agent.as_str())?;
    }
    if tls {
        endpoint = endpoint.tls_config(ClientTlsConfig::new().with_webpki_roots())?;
    }

    debug!(
        service = SERVICE_NAME,
        address = %target,
        endpoint = %uri,
        tls,
        headers = metadata.len(),
        "Built PIM channel"
    );

    Ok(InterceptedService::new(endpoint.connect_lazy(), metadata))
}
