// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Metadata injection for outgoing calls.
//!
//! [`MetadataInjector`] is a tonic interceptor. Interceptors run on the request
//! head before the body is streamed, so the same injector covers unary and
//! streaming calls alike.

use std::fmt;
use std::sync::Arc;

use tonic::metadata::{
    AsciiMetadataKey, AsciiMetadataValue, BinaryMetadataKey, BinaryMetadataValue,
};
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::channel::ChannelError;

/// Metadata key carrying the bearer credential.
pub const AUTHORIZATION_KEY: &str = "authorization";

#[derive(Clone)]
enum Entry {
    Ascii(AsciiMetadataKey, AsciiMetadataValue),
    Binary(BinaryMetadataKey, BinaryMetadataValue),
}

impl Entry {
    fn key(&self) -> &str {
        match self {
            Entry::Ascii(key, _) => key.as_str(),
            Entry::Binary(key, _) => key.as_str(),
        }
    }
}

/// Interceptor appending a fixed, ordered list of metadata entries to every call.
///
/// Entries are appended after whatever metadata the caller already set.
/// Existing entries are never removed or deduplicated, and duplicate keys in
/// the configured list are all sent.
#[derive(Clone)]
pub struct MetadataInjector {
    entries: Arc<[Entry]>,
}

impl MetadataInjector {
    /// Build an injector from `(key, value)` pairs.
    ///
    /// Keys are normalized to lowercase. Keys ending in `-bin` are sent as
    /// binary metadata carrying the raw bytes of the value.
    pub fn new<I, K, V>(headers: I) -> Result<Self, ChannelError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries = headers
            .into_iter()
            .map(|(key, value)| parse_entry(key.as_ref(), value.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entries: entries.into(),
        })
    }

    /// An injector that adds nothing.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new().into(),
        }
    }

    /// Add the bearer credential sent as `authorization: Bearer <token>`.
    ///
    /// The value is flagged as sensitive so that it is never printed by the
    /// HTTP/2 stack.
    pub fn with_bearer_token(self, token: &str) -> Result<Self, ChannelError> {
        let mut value: AsciiMetadataValue =
            format!("Bearer {token}")
                .parse()
                .map_err(|_| ChannelError::InvalidHeader {
                    key: AUTHORIZATION_KEY.to_string(),
                    reason: "the access token is not a valid header value".to_string(),
                })?;
        value.set_sensitive(true);

        let mut entries = self.entries.to_vec();
        entries.push(Entry::Ascii(
            AsciiMetadataKey::from_static(AUTHORIZATION_KEY),
            value,
        ));

        Ok(Self {
            entries: entries.into(),
        })
    }

    /// Number of entries added to each call.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the injector adds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys added to each call, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::key)
    }
}

fn parse_entry(key: &str, value: &str) -> Result<Entry, ChannelError> {
    let invalid = |reason: &str| ChannelError::InvalidHeader {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.to_ascii_lowercase().ends_with("-bin") {
        let key = BinaryMetadataKey::from_bytes(key.as_bytes())
            .map_err(|_| invalid("not a valid metadata key"))?;
        Ok(Entry::Binary(key, BinaryMetadataValue::from_bytes(value.as_bytes())))
    } else {
        let key = AsciiMetadataKey::from_bytes(key.as_bytes())
            .map_err(|_| invalid("not a valid metadata key"))?;
        let value: AsciiMetadataValue = value
            .parse()
            .map_err(|_| invalid("the value is not printable ASCII"))?;
        Ok(Entry::Ascii(key, value))
    }
}

impl fmt::Debug for MetadataInjector {
    // Values may hold credentials: only keys are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataInjector")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Interceptor for MetadataInjector {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let metadata = request.metadata_mut();
        for entry in self.entries.iter() {
            match entry {
                Entry::Ascii(key, value) => {
                    metadata.append(key.clone(), value.clone());
                }
                Entry::Binary(key, value) => {
                    metadata.append_bin(key.clone(), value.clone());
                }
            }
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intercept(injector: &mut MetadataInjector, request: Request<()>) -> Request<()> {
        injector.call(request).unwrap()
    }

    #[test]
    fn test_appends_configured_headers_in_order() {
        let mut injector = MetadataInjector::new([("k", "v1"), ("other", "x"), ("k", "v2")]).unwrap();

        let request = intercept(&mut injector, Request::new(()));
        let values: Vec<_> = request
            .metadata()
            .get_all("k")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(values, vec!["v1", "v2"]);
        assert_eq!(request.metadata().get("other").unwrap(), "x");
    }

    #[test]
    fn test_keeps_caller_metadata() {
        let mut injector = MetadataInjector::new([("k", "injected")]).unwrap();

        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("k", "from-caller".parse().unwrap());
        request
            .metadata_mut()
            .insert("caller-only", "kept".parse().unwrap());

        let request = intercept(&mut injector, request);
        let values: Vec<_> = request
            .metadata()
            .get_all("k")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(values, vec!["from-caller", "injected"]);
        assert_eq!(request.metadata().get("caller-only").unwrap(), "kept");
    }

    #[test]
    fn test_every_call_gets_the_headers() {
        let mut injector = MetadataInjector::new([("k", "v")]).unwrap();

        for _ in 0..3 {
            let request = intercept(&mut injector, Request::new(()));
            assert_eq!(request.metadata().get_all("k").iter().count(), 1);
        }
    }

    #[test]
    fn test_keys_are_lowercased() {
        let injector = MetadataInjector::new([("X-Custom-Header", "v")]).unwrap();
        assert_eq!(injector.keys().collect::<Vec<_>>(), vec!["x-custom-header"]);
    }

    #[test]
    fn test_binary_header() {
        let mut injector = MetadataInjector::new([("trace-bin", "raw")]).unwrap();

        let request = intercept(&mut injector, Request::new(()));
        let value = request.metadata().get_bin("trace-bin").unwrap();
        assert_eq!(value.to_bytes().unwrap().as_ref(), b"raw");
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let err = MetadataInjector::new([("bad key", "v")]).unwrap_err();
        assert!(matches!(err, ChannelError::InvalidHeader { ref key, .. } if key == "bad key"));
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let err = MetadataInjector::new([("k", "line\nbreak")]).unwrap_err();
        assert!(matches!(err, ChannelError::InvalidHeader { .. }));
    }

    #[test]
    fn test_bearer_token() {
        let mut injector = MetadataInjector::new([("k", "v")])
            .unwrap()
            .with_bearer_token("007")
            .unwrap();

        assert_eq!(injector.len(), 2);
        let request = intercept(&mut injector, Request::new(()));
        assert_eq!(request.metadata().get("authorization").unwrap(), "Bearer 007");
        assert_eq!(request.metadata().get("k").unwrap(), "v");
    }

    #[test]
    fn test_empty_injector_leaves_request_untouched() {
        let mut injector = MetadataInjector::empty();
        assert!(injector.is_empty());

        let request = intercept(&mut injector, Request::new(()));
        assert!(request.metadata().is_empty());
    }

    #[test]
    fn test_debug_hides_values() {
        let injector = MetadataInjector::new([("k", "secret-value")])
            .unwrap()
            .with_bearer_token("top-secret")
            .unwrap();

        let debug = format!("{:?}", injector);
        assert!(debug.contains("authorization"));
        assert!(!debug.contains("secret-value"));
        assert!(!debug.contains("top-secret"));
    }
}
