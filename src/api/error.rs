// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Account API error.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::directory::error::DirectoryProviderError;
use crate::openid::error::ProtocolError;

/// Account API operation errors
#[derive(Debug, Error)]
pub enum AccountApiError {
    #[error("{0}.")]
    BadRequest(String),

    #[error("{}", .0.clone().unwrap_or("The request you have made requires authentication.".to_string()))]
    Unauthorized(Option<String>),

    #[error("invalid header")]
    InvalidHeader,

    /// Protocol state machine failure. An unknown mode is deliberately an
    /// internal error and not a bad request; a conforming relying party
    /// never sends one.
    #[error(transparent)]
    Protocol { source: ProtocolError },

    #[error(transparent)]
    DirectoryError { source: DirectoryProviderError },

    #[error(transparent)]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    /// Others.
    #[error(transparent)]
    Other(#[from] eyre::Report),
}

impl IntoResponse for AccountApiError {
    fn into_response(self) -> Response {
        error!("Error happened during request processing: {:#?}", self);

        let status_code = match self {
            AccountApiError::BadRequest(..) => StatusCode::BAD_REQUEST,
            AccountApiError::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            AccountApiError::InvalidHeader => StatusCode::BAD_REQUEST,
            AccountApiError::Protocol {
                source: ProtocolError::RealmMissing,
            } => StatusCode::BAD_REQUEST,
            AccountApiError::Protocol { .. }
            | AccountApiError::DirectoryError { .. }
            | AccountApiError::Serde { .. }
            | AccountApiError::Other(..) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status_code,
            Json(json!({"error": {"code": status_code.as_u16(), "message": self.to_string()}})),
        )
            .into_response()
    }
}

impl From<ProtocolError> for AccountApiError {
    fn from(value: ProtocolError) -> Self {
        Self::Protocol { source: value }
    }
}

impl From<DirectoryProviderError> for AccountApiError {
    fn from(value: DirectoryProviderError) -> Self {
        match value {
            DirectoryProviderError::AuthenticationFailed
            | DirectoryProviderError::UserNotFound(_) => {
                Self::Unauthorized(Some("Invalid username or password".to_string()))
            }
            _ => Self::DirectoryError { source: value },
        }
    }
}
