// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for pim-client.

use pim_protocol::ChannelError;
use thiserror::Error;
use tonic::{Code, Status};

use crate::config::CONFIGURATION_PATH_ENVIRONMENT_VARIABLE;

/// Result type using PimError.
pub type Result<T> = std::result::Result<T, PimError>;

/// Errors that can occur when using the PIM client.
#[derive(Debug, Error)]
pub enum PimError {
    /// The environment variable naming the configuration file is not set.
    #[error(
        "The environment is not configured to use PIM: {} is not set.",
        CONFIGURATION_PATH_ENVIRONMENT_VARIABLE
    )]
    NotConfigured,

    /// The configuration exists but cannot be used.
    #[error("{path} is invalid: {reason}")]
    InvalidConfiguration { path: String, reason: String },

    /// No definition matches the requested product.
    #[error("{}", unsupported_product_message(.product_name, .product_version.as_deref()))]
    UnsupportedProduct {
        product_name: String,
        product_version: Option<String>,
    },

    /// A remote call failed.
    #[error("remote call failed [{:?}]: {}", .status.code(), .status.message())]
    Remote {
        #[source]
        status: Box<Status>,
    },

    /// The instance does not exist or was removed.
    #[error("The instance {name} was deleted.")]
    InstanceNotFound {
        name: String,
        #[source]
        status: Box<Status>,
    },

    /// The instance cannot be reached yet.
    #[error("{name} is not ready")]
    InstanceNotReady { name: String },

    /// The instance does not expose the requested service.
    #[error("{instance_name} does not support the service \"{service_name}\"")]
    UnsupportedService {
        instance_name: String,
        service_name: String,
    },

    /// The server sent a record that breaks the API contract.
    #[error("invalid record: {0}")]
    Validation(String),

    /// The target address of a channel cannot be used.
    #[error("invalid target \"{uri}\": {reason}")]
    InvalidUri { uri: String, reason: String },

    /// A metadata entry of a channel cannot be sent.
    #[error("invalid header \"{key}\": {reason}")]
    InvalidHeader { key: String, reason: String },

    /// The transport rejected the channel settings.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

fn unsupported_product_message(product_name: &str, product_version: Option<&str>) -> String {
    match product_version {
        Some(version) => {
            format!("The remote server does not support {product_name} in version {version}.")
        }
        None => format!("The remote server does not support {product_name}."),
    }
}

impl PimError {
    /// Error for a failed call that does not target a specific instance.
    pub fn remote(status: Status) -> Self {
        PimError::Remote {
            status: Box::new(status),
        }
    }

    /// Error for a failed call on the instance `name`.
    ///
    /// `NOT_FOUND` becomes [`PimError::InstanceNotFound`], anything else
    /// [`PimError::Remote`].
    pub fn from_instance_status(name: &str, status: Status) -> Self {
        match status.code() {
            Code::NotFound => PimError::InstanceNotFound {
                name: name.to_string(),
                status: Box::new(status),
            },
            _ => PimError::remote(status),
        }
    }

    /// Whether the error comes from a failed remote call.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            PimError::Remote { .. } | PimError::InstanceNotFound { .. }
        )
    }

    /// The status of the failed remote call, if any.
    pub fn status(&self) -> Option<&Status> {
        match self {
            PimError::Remote { status } | PimError::InstanceNotFound { status, .. } => {
                Some(status.as_ref())
            }
            _ => None,
        }
    }
}

impl From<ChannelError> for PimError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::InvalidUri { uri, reason } => PimError::InvalidUri { uri, reason },
            ChannelError::InvalidHeader { key, reason } => PimError::InvalidHeader { key, reason },
            ChannelError::Transport(err) => PimError::Transport(err),
        }
    }
}
