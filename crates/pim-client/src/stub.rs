// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The remote PIM contract.
//!
//! [`PimStub`] is the seam between the object model and the network. The
//! client, definitions and instances only ever talk to the API through it.

use std::time::Duration;

use async_trait::async_trait;
use pim_protocol::PimChannel;
use pim_protocol::pim_v1::{
    self, CreateInstanceRequest, DeleteInstanceRequest, GetInstanceRequest,
    ListDefinitionsRequest, ListDefinitionsResponse, ListInstancesRequest, ListInstancesResponse,
    product_instance_manager_client::ProductInstanceManagerClient,
};
use tonic::Status;

/// The five calls of the PIM API.
///
/// Every call takes an optional per-call timeout, sent to the server as the
/// gRPC deadline.
#[async_trait]
pub trait PimStub: Send + Sync {
    /// List the definitions, optionally filtered by product name and version.
    async fn list_definitions(
        &self,
        request: ListDefinitionsRequest,
        timeout: Option<Duration>,
    ) -> Result<ListDefinitionsResponse, Status>;

    /// List the existing instances.
    async fn list_instances(
        &self,
        request: ListInstancesRequest,
        timeout: Option<Duration>,
    ) -> Result<ListInstancesResponse, Status>;

    /// Request the creation of an instance.
    async fn create_instance(
        &self,
        request: CreateInstanceRequest,
        timeout: Option<Duration>,
    ) -> Result<pim_v1::Instance, Status>;

    /// Get the current state of an instance.
    async fn get_instance(
        &self,
        request: GetInstanceRequest,
        timeout: Option<Duration>,
    ) -> Result<pim_v1::Instance, Status>;

    /// Request the deletion of an instance.
    async fn delete_instance(
        &self,
        request: DeleteInstanceRequest,
        timeout: Option<Duration>,
    ) -> Result<(), Status>;
}

/// [`PimStub`] backed by a gRPC channel.
#[derive(Debug, Clone)]
pub struct GrpcStub {
    client: ProductInstanceManagerClient<PimChannel>,
}

impl GrpcStub {
    /// Create a stub sending its calls over `channel`.
    pub fn new(channel: PimChannel) -> Self {
        Self {
            client: ProductInstanceManagerClient::new(channel),
        }
    }

    // tonic clients need `&mut self`; clones share the underlying channel.
    fn client(&self) -> ProductInstanceManagerClient<PimChannel> {
        self.client.clone()
    }
}

fn request<T>(message: T, timeout: Option<Duration>) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    if let Some(timeout) = timeout {
        request.set_timeout(timeout);
    }
    request
}

#[async_trait]
impl PimStub for GrpcStub {
    async fn list_definitions(
        &self,
        message: ListDefinitionsRequest,
        timeout: Option<Duration>,
    ) -> Result<ListDefinitionsResponse, Status> {
        let response = self
            .client()
            .list_definitions(request(message, timeout))
            .await?;
        Ok(response.into_inner())
    }

    async fn list_instances(
        &self,
        message: ListInstancesRequest,
        timeout: Option<Duration>,
    ) -> Result<ListInstancesResponse, Status> {
        let response = self
            .client()
            .list_instances(request(message, timeout))
            .await?;
        Ok(response.into_inner())
    }

    async fn create_instance(
        &self,
        message: CreateInstanceRequest,
        timeout: Option<Duration>,
    ) -> Result<pim_v1::Instance, Status> {
        let response = self
            .client()
            .create_instance(request(message, timeout))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_instance(
        &self,
        message: GetInstanceRequest,
        timeout: Option<Duration>,
    ) -> Result<pim_v1::Instance, Status> {
        let response = self
            .client()
            .get_instance(request(message, timeout))
            .await?;
        Ok(response.into_inner())
    }

    async fn delete_instance(
        &self,
        message: DeleteInstanceRequest,
        timeout: Option<Duration>,
    ) -> Result<(), Status> {
        self.client()
            .delete_instance(request(message, timeout))
            .await?;
        Ok(())
    }
}
