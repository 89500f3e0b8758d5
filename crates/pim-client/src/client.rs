// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client for the PIM API.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pim_protocol::pim_v1::{GetInstanceRequest, ListDefinitionsRequest, ListInstancesRequest};
use pim_protocol::{ChannelOptions, MetadataInjector, PimChannel, build_channel};
use tracing::{debug, info, instrument};

use crate::config::Configuration;
use crate::error::{PimError, Result};
use crate::instance::Instance;
use crate::stub::{GrpcStub, PimStub};
use crate::types::{Connection, Definition};

/// High-level client for the product instance management API.
///
/// The client owns one channel. It is released when the client is closed or
/// dropped; definitions and instances obtained from the client keep it alive
/// as long as they exist.
pub struct Client {
    connection: Connection,
}

impl Client {
    /// Create a client issuing its calls through `stub`.
    pub fn new(stub: Arc<dyn PimStub>) -> Self {
        Self {
            connection: Connection::new(stub, None),
        }
    }

    /// Create a client over an existing channel.
    pub fn from_channel(channel: PimChannel) -> Self {
        info!("Connecting");
        Self::new(Arc::new(GrpcStub::new(channel)))
    }

    /// Create a client from a validated configuration.
    pub fn from_configuration(configuration: Configuration) -> Result<Self> {
        Self::from_configuration_with_options(configuration, &ChannelOptions::default())
    }

    /// Same as [`Client::from_configuration`], with extra transport options.
    #[instrument(skip_all, fields(uri = %configuration.uri(), tls = configuration.tls()))]
    pub fn from_configuration_with_options(
        configuration: Configuration,
        options: &ChannelOptions,
    ) -> Result<Self> {
        let mut metadata = MetadataInjector::new(configuration.headers().iter().cloned())?;
        if let Some(token) = configuration.access_token() {
            metadata = metadata.with_bearer_token(token)?;
        }

        let channel = build_channel(
            configuration.uri(),
            metadata,
            configuration.tls(),
            options,
        )?;
        info!("Connecting");

        Ok(Self {
            connection: Connection::new(
                Arc::new(GrpcStub::new(channel)),
                Some(Arc::new(configuration)),
            ),
        })
    }

    /// Create a client from the configuration file at `path`.
    pub fn from_configuration_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_configuration(Configuration::from_file(path)?)
    }

    /// Create a client from the configuration file named by the environment.
    ///
    /// Fails with [`PimError::NotConfigured`] when the environment does not
    /// name one, see [`crate::is_configured`].
    pub fn connect() -> Result<Self> {
        Self::from_configuration(Configuration::from_environment()?)
    }

    /// The configuration the client was created from, if any.
    pub fn configuration(&self) -> Option<&Configuration> {
        self.connection.configuration.as_deref()
    }

    /// Close the client.
    pub fn close(self) {
        debug!("Closing the PIM client");
    }

    /// List the product definitions the server can start.
    #[instrument(skip(self))]
    pub async fn list_definitions(
        &self,
        product_name: Option<&str>,
        product_version: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Vec<Definition>> {
        debug!("Listing definitions");

        let request = ListDefinitionsRequest {
            product_name: product_name.map(str::to_string),
            product_version: product_version.map(str::to_string),
        };

        let response = self
            .connection
            .stub
            .list_definitions(request, timeout)
            .await
            .map_err(PimError::remote)?;

        response
            .definitions
            .into_iter()
            .map(|definition| Definition::from_v1(definition, self.connection.clone()))
            .collect()
    }

    /// List the existing instances.
    #[instrument(skip(self))]
    pub async fn list_instances(&self, timeout: Option<Duration>) -> Result<Vec<Instance>> {
        debug!("Listing instances");

        let response = self
            .connection
            .stub
            .list_instances(ListInstancesRequest {}, timeout)
            .await
            .map_err(PimError::remote)?;

        response
            .instances
            .into_iter()
            .map(|instance| Instance::from_v1(instance, self.connection.clone()))
            .collect()
    }

    /// Get an instance by name, for example `instances/mapdl-1212`.
    #[instrument(skip(self))]
    pub async fn get_instance(&self, name: &str, timeout: Option<Duration>) -> Result<Instance> {
        debug!("Getting instance");

        let request = GetInstanceRequest {
            name: name.to_string(),
        };

        let instance = self
            .connection
            .stub
            .get_instance(request, timeout)
            .await
            .map_err(|status| PimError::from_instance_status(name, status))?;

        Instance::from_v1(instance, self.connection.clone())
    }

    /// Start an instance of a product.
    ///
    /// The first definition matching the product name and version is used.
    /// The instance is not ready yet, see [`Instance::wait_for_ready`].
    #[instrument(skip(self))]
    pub async fn create_instance(
        &self,
        product_name: &str,
        product_version: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Instance> {
        debug!("Creating instance");

        let definitions = self
            .list_definitions(Some(product_name), product_version, timeout)
            .await?;

        let Some(definition) = definitions.first() else {
            return Err(PimError::UnsupportedProduct {
                product_name: product_name.to_string(),
                product_version: product_version.map(str::to_string),
            });
        };

        definition.create_instance(timeout).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("configuration", &self.configuration())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pim_protocol::pim_v1::{self, CreateInstanceRequest, ListDefinitionsResponse};

    use super::*;
    use crate::testing::ScriptedStub;

    fn ready_services() -> HashMap<String, pim_v1::Service> {
        HashMap::from([
            (
                "grpc".to_string(),
                pim_v1::Service {
                    uri: "dns:127.0.0.1:1".to_string(),
                    headers: HashMap::new(),
                },
            ),
            (
                "http".to_string(),
                pim_v1::Service {
                    uri: "http://127.0.0.1:2".to_string(),
                    headers: HashMap::new(),
                },
            ),
        ])
    }

    fn script() -> ScriptedStub {
        let created = pim_v1::Instance {
            name: "instances/i1".to_string(),
            definition_name: "definitions/d1".to_string(),
            ready: false,
            status_message: "starting".to_string(),
            services: HashMap::new(),
        };

        ScriptedStub::new()
            .on_list_definitions(
                ListDefinitionsRequest {
                    product_name: Some("p".to_string()),
                    product_version: None,
                },
                Ok(ListDefinitionsResponse {
                    definitions: vec![pim_v1::Definition {
                        name: "definitions/d1".to_string(),
                        product_name: "p".to_string(),
                        product_version: "1".to_string(),
                        available_service_names: vec!["grpc".to_string(), "http".to_string()],
                    }],
                }),
            )
            .on_create_instance(
                CreateInstanceRequest {
                    instance: Some(pim_v1::Instance {
                        definition_name: "definitions/d1".to_string(),
                        ..Default::default()
                    }),
                },
                Ok(created.clone()),
            )
            .on_get_instance(
                GetInstanceRequest {
                    name: "instances/i1".to_string(),
                },
                Ok(pim_v1::Instance {
                    ready: true,
                    status_message: String::new(),
                    services: ready_services(),
                    ..created
                }),
            )
    }

    fn client(configuration: Configuration) -> Client {
        Client {
            connection: Connection::new(Arc::new(script()), Some(Arc::new(configuration))),
        }
    }

    #[tokio::test]
    async fn test_created_instance_inherits_secure_configuration() {
        let configuration =
            Configuration::new("dns:pim.example.com:443", vec![], true, Some("007".to_string()))
                .unwrap();
        let client = client(configuration);

        let mut instance = client.create_instance("p", None, None).await.unwrap();
        instance.update(None).await.unwrap();

        assert!(instance.ready());
        assert_eq!(instance.connection.access_token(), Some("007"));
        assert!(
            instance
                .build_channel("grpc", &ChannelOptions::default())
                .is_ok()
        );
        // A plain http:// service cannot be reached over TLS.
        let err = instance
            .build_channel("http", &ChannelOptions::default())
            .unwrap_err();
        assert!(matches!(err, PimError::InvalidUri { .. }));
    }

    #[tokio::test]
    async fn test_created_instance_inherits_plain_configuration() {
        let configuration = Configuration::new("dns:pim:80", vec![], false, None).unwrap();
        let client = client(configuration);

        let mut instance = client.create_instance("p", None, None).await.unwrap();
        instance.update(None).await.unwrap();

        assert_eq!(instance.connection.access_token(), None);
        assert!(
            instance
                .build_channel("http", &ChannelOptions::default())
                .is_ok()
        );
    }
}
