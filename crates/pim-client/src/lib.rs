// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PIM Client
//!
//! Client library for the product instance management (PIM) API.
//!
//! PIM starts software products remotely. This crate lists what can be
//! started, creates instances, waits until they are ready, hands out channels
//! to the APIs they expose and deletes them.
//!
//! # Architecture
//!
//! - [`Configuration`]: JSON file describing how to reach PIM, usually named by
//!   the `ANSYS_PLATFORM_INSTANCEMANAGEMENT_CONFIG` environment variable
//! - [`Client`]: entry point, lists definitions and instances
//! - [`Definition`]: a product that can be started
//! - [`Instance`]: a started product, with its lifecycle
//! - [`PimStub`]: the remote contract; [`GrpcStub`] goes over the network,
//!   [`testing::ScriptedStub`] replays a script
//!
//! # Example
//!
//! ```no_run
//! use pim_client::{ChannelOptions, Client, DEFAULT_POLLING_INTERVAL, DEFAULT_SERVICE_NAME};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! if !pim_client::is_configured() {
//!     return Ok(());
//! }
//!
//! let client = Client::connect()?;
//!
//! let mut instance = client.create_instance("mapdl", Some("221"), None).await?;
//! instance.wait_for_ready(DEFAULT_POLLING_INTERVAL, None).await?;
//!
//! let channel = instance.build_channel(DEFAULT_SERVICE_NAME, &ChannelOptions::default())?;
//! // talk to the product over `channel`
//!
//! instance.delete(None).await?;
//! client.close();
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod instance;
mod stub;
pub mod testing;
mod types;

pub use client::Client;
pub use config::{
    CONFIGURATION_PATH_ENVIRONMENT_VARIABLE, CONFIGURATION_VERSION, Configuration, is_configured,
};
pub use error::{PimError, Result};
pub use instance::{DEFAULT_POLLING_INTERVAL, DEFAULT_SERVICE_NAME, Instance, ScopedFuture};
pub use stub::{GrpcStub, PimStub};
pub use types::{
    DEFINITION_NAME_PREFIX, Definition, INSTANCE_NAME_PREFIX, InstanceState, Service,
};

pub use pim_protocol::{ChannelOptions, PimChannel, pim_v1};
