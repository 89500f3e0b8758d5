// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote product instances and their lifecycle.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use pim_protocol::pim_v1::{self, CreateInstanceRequest, DeleteInstanceRequest, GetInstanceRequest};
use pim_protocol::{ChannelOptions, PimChannel};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{PimError, Result};
use crate::types::{
    Connection, DEFINITION_NAME_PREFIX, INSTANCE_NAME_PREFIX, InstanceState, Service,
    services_from_v1,
};

/// Service name of the gRPC API of an instance.
pub const DEFAULT_SERVICE_NAME: &str = "grpc";

/// Delay between two polls of [`Instance::wait_for_ready`].
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(500);

/// Future returned by the body given to [`Instance::scoped`].
pub type ScopedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A remote instance of a product.
///
/// The handle goes through `create` -> `update`/`wait_for_ready` -> `delete`.
/// Calls that refresh the handle take `&mut self`, so one handle is used by
/// one task at a time.
#[derive(Clone, Serialize)]
pub struct Instance {
    name: String,
    definition_name: String,
    ready: bool,
    status_message: String,
    services: BTreeMap<String, Service>,
    #[serde(skip)]
    deleted: bool,
    #[serde(skip)]
    pub(crate) connection: Connection,
}

/// Fields of a validated wire instance.
struct Snapshot {
    name: String,
    definition_name: String,
    ready: bool,
    status_message: String,
    services: BTreeMap<String, Service>,
}

// An empty name is accepted: it is the placeholder of an instance the server
// has not named yet.
fn validate(instance: pim_v1::Instance) -> Result<Snapshot> {
    if !instance.name.is_empty() && !instance.name.starts_with(INSTANCE_NAME_PREFIX) {
        return Err(PimError::Validation(format!(
            "An instance name must start with `{INSTANCE_NAME_PREFIX}`, got \"{}\".",
            instance.name
        )));
    }
    if !instance.definition_name.starts_with(DEFINITION_NAME_PREFIX) {
        return Err(PimError::Validation(format!(
            "An instance must reference a definition starting with `{DEFINITION_NAME_PREFIX}`, got \"{}\".",
            instance.definition_name
        )));
    }

    Ok(Snapshot {
        name: instance.name,
        definition_name: instance.definition_name,
        ready: instance.ready,
        status_message: instance.status_message,
        services: services_from_v1(instance.services)?,
    })
}

impl Instance {
    pub(crate) fn from_v1(instance: pim_v1::Instance, connection: Connection) -> Result<Self> {
        let snapshot = validate(instance)?;
        Ok(Self {
            name: snapshot.name,
            definition_name: snapshot.definition_name,
            ready: snapshot.ready,
            status_message: snapshot.status_message,
            services: snapshot.services,
            deleted: false,
            connection,
        })
    }

    /// Request a new instance of the definition `definition_name`.
    #[instrument(skip(connection))]
    pub(crate) async fn create(
        connection: Connection,
        definition_name: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let request = CreateInstanceRequest {
            instance: Some(pim_v1::Instance {
                definition_name: definition_name.to_string(),
                ..Default::default()
            }),
        };

        let instance = connection
            .stub
            .create_instance(request, timeout)
            .await
            .map_err(PimError::remote)?;

        let instance = Self::from_v1(instance, connection)?;
        info!(instance = %instance.name, "Instance created");
        if !instance.status_message.is_empty() {
            info!(instance = %instance.name, "{}", instance.status_message);
        }
        Ok(instance)
    }

    /// Refresh the instance from the server.
    ///
    /// On failure the handle is left untouched.
    #[instrument(skip(self), fields(instance = %self.name))]
    pub async fn update(&mut self, timeout: Option<Duration>) -> Result<()> {
        let request = GetInstanceRequest {
            name: self.name.clone(),
        };

        let instance = self
            .connection
            .stub
            .get_instance(request, timeout)
            .await
            .map_err(|status| PimError::from_instance_status(&self.name, status))?;
        let snapshot = validate(instance)?;

        if !snapshot.status_message.is_empty() && snapshot.status_message != self.status_message {
            info!(instance = %snapshot.name, "{}", snapshot.status_message);
        }

        self.name = snapshot.name;
        self.definition_name = snapshot.definition_name;
        self.status_message = snapshot.status_message;
        self.services = snapshot.services;
        self.ready = snapshot.ready;
        Ok(())
    }

    /// Poll the server until the instance is ready.
    ///
    /// The first poll happens immediately. There is no overall deadline: wrap
    /// the future in `tokio::time::timeout` to bound it. Any error stops the
    /// polling.
    #[instrument(skip(self), fields(instance = %self.name))]
    pub async fn wait_for_ready(
        &mut self,
        polling_interval: Duration,
        timeout_per_request: Option<Duration>,
    ) -> Result<()> {
        self.update(timeout_per_request).await?;
        while !self.ready {
            debug!("Instance not ready, polling again");
            tokio::time::sleep(polling_interval).await;
            self.update(timeout_per_request).await?;
        }
        info!("Instance ready");
        Ok(())
    }

    /// Delete the remote instance.
    ///
    /// The handle is stale afterwards.
    #[instrument(skip(self), fields(instance = %self.name))]
    pub async fn delete(&mut self, timeout: Option<Duration>) -> Result<()> {
        let request = DeleteInstanceRequest {
            name: self.name.clone(),
        };

        self.connection
            .stub
            .delete_instance(request, timeout)
            .await
            .map_err(|status| PimError::from_instance_status(&self.name, status))?;

        self.deleted = true;
        info!("Instance deleted");
        Ok(())
    }

    /// Run `body` on the instance, then delete it on every exit path.
    ///
    /// The deletion is issued whether `body` succeeds or fails. An error of
    /// `body` wins over a failed deletion, which is only logged. Dropping the
    /// returned future before it completes skips the deletion.
    ///
    /// ```no_run
    /// # use pim_client::{Client, DEFAULT_POLLING_INTERVAL, PimError};
    /// # async fn example(client: Client) -> pim_client::Result<()> {
    /// let instance = client.create_instance("mapdl", None, None).await?;
    /// let name = instance
    ///     .scoped(None, |instance| {
    ///         Box::pin(async move {
    ///             instance.wait_for_ready(DEFAULT_POLLING_INTERVAL, None).await?;
    ///             Ok::<_, PimError>(instance.name().to_string())
    ///         })
    ///     })
    ///     .await?;
    /// println!("{name} ran and was deleted");
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, body), fields(instance = %self.name))]
    pub async fn scoped<T, F>(mut self, delete_timeout: Option<Duration>, body: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut Instance) -> ScopedFuture<'a, T>,
    {
        let outcome = body(&mut self).await;
        let deleted = self.delete(delete_timeout).await;

        match (outcome, deleted) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(delete_err)) => {
                warn!(error = %delete_err, "Failed to delete instance after an error");
                Err(err)
            }
        }
    }

    /// The service `service_name` of a ready instance.
    pub fn service(&self, service_name: &str) -> Result<&Service> {
        if !self.ready {
            return Err(PimError::InstanceNotReady {
                name: self.name.clone(),
            });
        }
        self.services
            .get(service_name)
            .ok_or_else(|| PimError::UnsupportedService {
                instance_name: self.name.clone(),
                service_name: service_name.to_string(),
            })
    }

    /// Build a channel to the service `service_name` of the instance.
    ///
    /// The channel carries the headers of the service. When the client
    /// connects to PIM over TLS, the channel is secure too and sends the same
    /// bearer token.
    pub fn build_channel(&self, service_name: &str, options: &ChannelOptions) -> Result<PimChannel> {
        let service = self.service(service_name)?;
        service.build_channel(self.connection.access_token(), options)
    }

    /// Server assigned name, starting with `instances/`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the definition the instance was created from.
    pub fn definition_name(&self) -> &str {
        &self.definition_name
    }

    /// Whether the services can be used.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Human-readable status, meaningful while the instance is not ready.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Entry points of the instance, filled once it is ready.
    pub fn services(&self) -> &BTreeMap<String, Service> {
        &self.services
    }

    /// Lifecycle state derived from the name, readiness and deletion.
    pub fn state(&self) -> InstanceState {
        if self.deleted {
            InstanceState::Deleted
        } else if self.ready {
            InstanceState::Ready
        } else if self.name.is_empty() {
            InstanceState::Creating
        } else {
            InstanceState::NotReady
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.definition_name == other.definition_name
            && self.ready == other.ready
            && self.status_message == other.status_message
            && self.services == other.services
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("definition_name", &self.definition_name)
            .field("ready", &self.ready)
            .field("status_message", &self.status_message)
            .field("services", &self.services)
            .finish()
    }
}

impl From<&Instance> for pim_v1::Instance {
    fn from(instance: &Instance) -> Self {
        Self {
            name: instance.name.clone(),
            definition_name: instance.definition_name.clone(),
            ready: instance.ready,
            status_message: instance.status_message.clone(),
            services: instance
                .services
                .iter()
                .map(|(name, service)| (name.clone(), pim_v1::Service::from(service)))
                .collect(),
        }
    }
}
