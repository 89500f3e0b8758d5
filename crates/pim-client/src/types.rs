// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Records of the PIM API and their translation from and to the wire.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pim_protocol::pim_v1;
use pim_protocol::{ChannelOptions, MetadataInjector, PimChannel, build_channel};
use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::{PimError, Result};
use crate::instance::Instance;
use crate::stub::PimStub;

/// Prefix of every definition name.
pub const DEFINITION_NAME_PREFIX: &str = "definitions/";

/// Prefix of every assigned instance name.
pub const INSTANCE_NAME_PREFIX: &str = "instances/";

/// Handle on the remote API shared by the records that issue calls.
#[derive(Clone)]
pub(crate) struct Connection {
    pub(crate) stub: Arc<dyn PimStub>,
    pub(crate) configuration: Option<Arc<Configuration>>,
}

impl Connection {
    pub(crate) fn new(stub: Arc<dyn PimStub>, configuration: Option<Arc<Configuration>>) -> Self {
        Self {
            stub,
            configuration,
        }
    }

    /// Bearer token to reuse for instance channels.
    pub(crate) fn access_token(&self) -> Option<&str> {
        self.configuration
            .as_deref()
            .filter(|configuration| configuration.tls())
            .and_then(Configuration::access_token)
    }
}

/// Lifecycle state of an [`Instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// Requested, the server has not assigned a name yet.
    Creating,
    /// Named but not ready to serve.
    NotReady,
    /// Services are available.
    Ready,
    /// Deleted through this handle.
    Deleted,
}

/// Endpoint of one API exposed by a ready instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Address of the service.
    ///
    /// For gRPC, a target in gRPC name-resolution syntax. For HTTP, the base
    /// URL of the API.
    pub uri: String,
    /// Headers to send with every request to the service.
    pub headers: BTreeMap<String, String>,
}

impl Service {
    /// Build a channel to this service carrying its headers.
    ///
    /// With an access token the channel is secure and authenticated with it.
    pub fn build_channel(
        &self,
        access_token: Option<&str>,
        options: &ChannelOptions,
    ) -> Result<PimChannel> {
        let mut metadata = MetadataInjector::new(&self.headers)?;
        if let Some(token) = access_token {
            metadata = metadata.with_bearer_token(token)?;
        }
        Ok(build_channel(
            &self.uri,
            metadata,
            access_token.is_some(),
            options,
        )?)
    }
}

impl TryFrom<pim_v1::Service> for Service {
    type Error = PimError;

    fn try_from(service: pim_v1::Service) -> Result<Self> {
        if service.uri.is_empty() {
            return Err(PimError::Validation("A service must have an uri.".to_string()));
        }
        Ok(Self {
            uri: service.uri,
            headers: service.headers.into_iter().collect(),
        })
    }
}

impl From<&Service> for pim_v1::Service {
    fn from(service: &Service) -> Self {
        Self {
            uri: service.uri.clone(),
            headers: service
                .headers
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

pub(crate) fn services_from_v1(
    services: HashMap<String, pim_v1::Service>,
) -> Result<BTreeMap<String, Service>> {
    services
        .into_iter()
        .map(|(name, service)| Ok((name, Service::try_from(service)?)))
        .collect()
}

/// A product that can be started remotely.
#[derive(Clone, Serialize)]
pub struct Definition {
    name: String,
    product_name: String,
    product_version: String,
    available_service_names: Vec<String>,
    #[serde(skip)]
    connection: Connection,
}

impl Definition {
    pub(crate) fn from_v1(definition: pim_v1::Definition, connection: Connection) -> Result<Self> {
        if !definition.name.starts_with(DEFINITION_NAME_PREFIX) {
            return Err(PimError::Validation(format!(
                "A definition must have a name that starts with `{DEFINITION_NAME_PREFIX}`, got \"{}\".",
                definition.name
            )));
        }
        if definition.product_name.is_empty() {
            return Err(PimError::Validation(
                "A definition must have a product name.".to_string(),
            ));
        }
        if definition.product_version.is_empty() {
            return Err(PimError::Validation(
                "A definition must have a product version.".to_string(),
            ));
        }
        if definition.available_service_names.is_empty() {
            return Err(PimError::Validation(
                "A definition must have at least one service name.".to_string(),
            ));
        }

        Ok(Self {
            name: definition.name,
            product_name: definition.product_name,
            product_version: definition.product_version,
            available_service_names: definition.available_service_names,
            connection,
        })
    }

    /// Server assigned name, starting with `definitions/`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the product, for example `mapdl`.
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Version of the product, for example `221`.
    pub fn product_version(&self) -> &str {
        &self.product_version
    }

    /// Services an instance of this product exposes (`grpc`, `http`...).
    pub fn available_service_names(&self) -> &[String] {
        &self.available_service_names
    }

    /// Start an instance of this product.
    ///
    /// The instance is not ready yet, see [`Instance::wait_for_ready`].
    pub async fn create_instance(&self, timeout: Option<Duration>) -> Result<Instance> {
        Instance::create(self.connection.clone(), &self.name, timeout).await
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.product_name == other.product_name
            && self.product_version == other.product_version
            && self.available_service_names == other.available_service_names
    }
}

impl Eq for Definition {}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("product_name", &self.product_name)
            .field("product_version", &self.product_version)
            .field("available_service_names", &self.available_service_names)
            .finish()
    }
}

impl From<&Definition> for pim_v1::Definition {
    fn from(definition: &Definition) -> Self {
        Self {
            name: definition.name.clone(),
            product_name: definition.product_name.clone(),
            product_version: definition.product_version.clone(),
            available_service_names: definition.available_service_names.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedStub;

    fn connection() -> Connection {
        Connection::new(Arc::new(ScriptedStub::new()), None)
    }

    fn wire_definition() -> pim_v1::Definition {
        pim_v1::Definition {
            name: "definitions/d1".to_string(),
            product_name: "p".to_string(),
            product_version: "1".to_string(),
            available_service_names: vec!["grpc".to_string()],
        }
    }

    #[test]
    fn test_definition_from_v1() {
        let definition = Definition::from_v1(wire_definition(), connection()).unwrap();
        assert_eq!(definition.name(), "definitions/d1");
        assert_eq!(definition.product_name(), "p");
        assert_eq!(definition.product_version(), "1");
        assert_eq!(definition.available_service_names(), ["grpc".to_string()]);
        assert_eq!(pim_v1::Definition::from(&definition), wire_definition());
    }

    #[test]
    fn test_definition_validation() {
        let cases = [
            pim_v1::Definition {
                name: "d1".to_string(),
                ..wire_definition()
            },
            pim_v1::Definition {
                name: String::new(),
                ..wire_definition()
            },
            pim_v1::Definition {
                product_name: String::new(),
                ..wire_definition()
            },
            pim_v1::Definition {
                product_version: String::new(),
                ..wire_definition()
            },
            pim_v1::Definition {
                available_service_names: vec![],
                ..wire_definition()
            },
        ];

        for case in cases {
            let err = Definition::from_v1(case, connection()).unwrap_err();
            assert!(matches!(err, PimError::Validation(_)));
        }
    }

    #[test]
    fn test_definition_equality_ignores_connection() {
        let a = Definition::from_v1(wire_definition(), connection()).unwrap();
        let b = Definition::from_v1(wire_definition(), connection()).unwrap();
        assert_eq!(a, b);
        assert!(!format!("{:?}", a).contains("stub"));
    }

    #[test]
    fn test_service_round_trip() {
        let wire = pim_v1::Service {
            uri: "dns:10.0.0.1:50052".to_string(),
            headers: HashMap::from([("token".to_string(), "t".to_string())]),
        };

        let service = Service::try_from(wire.clone()).unwrap();
        assert_eq!(service.uri, "dns:10.0.0.1:50052");
        assert_eq!(service.headers.get("token").map(String::as_str), Some("t"));
        assert_eq!(pim_v1::Service::from(&service), wire);
    }

    #[test]
    fn test_service_requires_uri() {
        let err = Service::try_from(pim_v1::Service::default()).unwrap_err();
        assert!(err.to_string().contains("uri"));
    }

    #[test]
    fn test_access_token_only_with_tls() {
        let secure = Configuration::new("dns:h:443", vec![], true, Some("t".to_string())).unwrap();
        let connection = Connection::new(Arc::new(ScriptedStub::new()), Some(Arc::new(secure)));
        assert_eq!(connection.access_token(), Some("t"));

        let plain = Configuration::new("dns:h:80", vec![], false, None).unwrap();
        let connection = Connection::new(Arc::new(ScriptedStub::new()), Some(Arc::new(plain)));
        assert_eq!(connection.access_token(), None);
    }

    #[tokio::test]
    async fn test_service_build_channel() {
        let service = Service {
            uri: "dns:127.0.0.1:1".to_string(),
            headers: BTreeMap::from([("k".to_string(), "v".to_string())]),
        };

        assert!(service.build_channel(None, &ChannelOptions::default()).is_ok());
        assert!(
            service
                .build_channel(Some("t"), &ChannelOptions::default())
                .is_ok()
        );
    }
}
