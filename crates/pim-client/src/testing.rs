// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Scripted stub for testing.
//!
//! A [`PimStub`] implementation that replays scripted request/response pairs
//! without any network, and records every call it receives.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use pim_protocol::pim_v1::{
    self, CreateInstanceRequest, DeleteInstanceRequest, GetInstanceRequest,
    ListDefinitionsRequest, ListDefinitionsResponse, ListInstancesRequest, ListInstancesResponse,
};
use tokio::sync::Mutex;
use tonic::Status;

use crate::stub::PimStub;

/// A call received by the stub.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedCall {
    ListDefinitions(ListDefinitionsRequest),
    ListInstances(ListInstancesRequest),
    CreateInstance(CreateInstanceRequest),
    GetInstance(GetInstanceRequest),
    DeleteInstance(DeleteInstanceRequest),
}

#[derive(Debug)]
enum Reply {
    ListDefinitions(Result<ListDefinitionsResponse, Status>),
    ListInstances(Result<ListInstancesResponse, Status>),
    Instance(Result<pim_v1::Instance, Status>),
    Empty(Result<(), Status>),
}

#[derive(Debug)]
struct Step {
    request: ScriptedCall,
    reply: Reply,
}

/// Stub replaying a fixed script.
///
/// Each call pops the next step. A call that does not match the request of
/// that step fails with `FAILED_PRECONDITION`, as does a call once the script
/// is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedStub {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<ScriptedCall>>,
}

impl ScriptedStub {
    /// Create a stub with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, request: ScriptedCall, reply: Reply) -> Self {
        self.script.get_mut().push_back(Step { request, reply });
        self
    }

    /// Expect a `ListDefinitions` call.
    pub fn on_list_definitions(
        self,
        request: ListDefinitionsRequest,
        reply: Result<ListDefinitionsResponse, Status>,
    ) -> Self {
        self.push(
            ScriptedCall::ListDefinitions(request),
            Reply::ListDefinitions(reply),
        )
    }

    /// Expect a `ListInstances` call.
    pub fn on_list_instances(self, reply: Result<ListInstancesResponse, Status>) -> Self {
        self.push(
            ScriptedCall::ListInstances(ListInstancesRequest {}),
            Reply::ListInstances(reply),
        )
    }

    /// Expect a `CreateInstance` call.
    pub fn on_create_instance(
        self,
        request: CreateInstanceRequest,
        reply: Result<pim_v1::Instance, Status>,
    ) -> Self {
        self.push(ScriptedCall::CreateInstance(request), Reply::Instance(reply))
    }

    /// Expect a `GetInstance` call.
    pub fn on_get_instance(
        self,
        request: GetInstanceRequest,
        reply: Result<pim_v1::Instance, Status>,
    ) -> Self {
        self.push(ScriptedCall::GetInstance(request), Reply::Instance(reply))
    }

    /// Expect a `DeleteInstance` call.
    pub fn on_delete_instance(
        self,
        request: DeleteInstanceRequest,
        reply: Result<(), Status>,
    ) -> Self {
        self.push(ScriptedCall::DeleteInstance(request), Reply::Empty(reply))
    }

    /// Calls received so far, in order.
    pub async fn calls(&self) -> Vec<ScriptedCall> {
        self.calls.lock().await.clone()
    }

    /// Number of scripted steps not consumed yet.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }

    async fn next(&self, call: ScriptedCall) -> Result<Reply, Status> {
        self.calls.lock().await.push(call.clone());

        let mut script = self.script.lock().await;
        let Some(step) = script.pop_front() else {
            return Err(Status::failed_precondition(format!(
                "unscripted call {:?}",
                call
            )));
        };

        if step.request != call {
            let status = Status::failed_precondition(format!(
                "expected {:?}, got {:?}",
                step.request, call
            ));
            script.push_front(step);
            return Err(status);
        }

        Ok(step.reply)
    }
}

fn mismatch(call: &str) -> Status {
    Status::failed_precondition(format!("scripted reply does not answer {call}"))
}

#[async_trait]
impl PimStub for ScriptedStub {
    async fn list_definitions(
        &self,
        request: ListDefinitionsRequest,
        _timeout: Option<Duration>,
    ) -> Result<ListDefinitionsResponse, Status> {
        match self.next(ScriptedCall::ListDefinitions(request)).await? {
            Reply::ListDefinitions(reply) => reply,
            _ => Err(mismatch("ListDefinitions")),
        }
    }

    async fn list_instances(
        &self,
        request: ListInstancesRequest,
        _timeout: Option<Duration>,
    ) -> Result<ListInstancesResponse, Status> {
        match self.next(ScriptedCall::ListInstances(request)).await? {
            Reply::ListInstances(reply) => reply,
            _ => Err(mismatch("ListInstances")),
        }
    }

    async fn create_instance(
        &self,
        request: CreateInstanceRequest,
        _timeout: Option<Duration>,
    ) -> Result<pim_v1::Instance, Status> {
        match self.next(ScriptedCall::CreateInstance(request)).await? {
            Reply::Instance(reply) => reply,
            _ => Err(mismatch("CreateInstance")),
        }
    }

    async fn get_instance(
        &self,
        request: GetInstanceRequest,
        _timeout: Option<Duration>,
    ) -> Result<pim_v1::Instance, Status> {
        match self.next(ScriptedCall::GetInstance(request)).await? {
            Reply::Instance(reply) => reply,
            _ => Err(mismatch("GetInstance")),
        }
    }

    async fn delete_instance(
        &self,
        request: DeleteInstanceRequest,
        _timeout: Option<Duration>,
    ) -> Result<(), Status> {
        match self.next(ScriptedCall::DeleteInstance(request)).await? {
            Reply::Empty(reply) => reply,
            _ => Err(mismatch("DeleteInstance")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let stub = ScriptedStub::new()
            .on_list_instances(Ok(ListInstancesResponse::default()))
            .on_delete_instance(
                DeleteInstanceRequest {
                    name: "instances/a".to_string(),
                },
                Ok(()),
            );

        assert_eq!(stub.remaining().await, 2);
        assert!(stub.list_instances(ListInstancesRequest {}, None).await.is_ok());
        assert!(
            stub.delete_instance(
                DeleteInstanceRequest {
                    name: "instances/a".to_string()
                },
                None
            )
            .await
            .is_ok()
        );
        assert_eq!(stub.remaining().await, 0);
        assert_eq!(stub.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unexpected_request_is_rejected() {
        let stub = ScriptedStub::new().on_get_instance(
            GetInstanceRequest {
                name: "instances/a".to_string(),
            },
            Ok(pim_v1::Instance::default()),
        );

        let status = stub
            .get_instance(
                GetInstanceRequest {
                    name: "instances/b".to_string(),
                },
                None,
            )
            .await
            .unwrap_err();

        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
        assert_eq!(stub.remaining().await, 1);
    }

    #[tokio::test]
    async fn test_exhausted_script() {
        let stub = ScriptedStub::new();
        let status = stub
            .list_definitions(ListDefinitionsRequest::default(), None)
            .await
            .unwrap_err();

        assert!(status.message().contains("unscripted"));
        assert_eq!(stub.calls().await.len(), 1);
    }
}
