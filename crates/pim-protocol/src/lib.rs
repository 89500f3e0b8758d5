// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PIM Protocol - gRPC + Protobuf communication layer
//!
//! This crate provides the wire contract of the product instance management
//! (PIM) API and the transport pieces used to reach it:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      pim-protocol                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Metadata: fixed headers + bearer credential per call       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RPC Layer: ProductInstanceManager client (tonic)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Serialization: Protobuf (prost)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Transport: HTTP/2, optionally TLS                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pim_protocol::{ChannelOptions, MetadataInjector, build_channel, pim_v1};
//! use pim_protocol::pim_v1::product_instance_manager_client::ProductInstanceManagerClient;
//!
//! let metadata = MetadataInjector::new([("x-request-origin", "batch")])?;
//! let channel = build_channel("dns:pim.example.com:80", metadata, false, &ChannelOptions::default())?;
//! let mut client = ProductInstanceManagerClient::new(channel);
//!
//! let response = client
//!     .list_definitions(pim_v1::ListDefinitionsRequest::default())
//!     .await?;
//! ```
//!
//! The generated code under `src/proto/` comes from
//! `proto/ansys/api/platform/instancemanagement/v1/product_instance_manager.proto`
//! (tonic-build 0.12, client only) and is checked in so that building the
//! crate does not require `protoc`.

pub mod channel;
pub mod metadata;

/// Messages and client of `ansys.api.platform.instancemanagement.v1`.
pub mod pim_v1 {
    include!("proto/ansys.api.platform.instancemanagement.v1.rs");
}

/// Fully qualified name of the PIM gRPC service.
pub const SERVICE_NAME: &str = "ansys.api.platform.instancemanagement.v1.ProductInstanceManager";

// Re-export main types
pub use channel::{ChannelError, ChannelOptions, PimChannel, build_channel, endpoint_uri};
pub use metadata::MetadataInjector;
