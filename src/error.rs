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
//! # Error
//!
//! Diverse errors that can occur during the service processing (not the API).
use thiserror::Error;

use crate::association::error::*;
use crate::directory::error::*;
use crate::openid::error::*;

/// Account service error.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    AssociationError {
        #[from]
        source: AssociationProviderError,
    },

    #[error(transparent)]
    DirectoryError {
        #[from]
        source: DirectoryProviderError,
    },

    #[error(transparent)]
    ProtocolError {
        #[from]
        source: ProtocolError,
    },

    #[error(transparent)]
    IO {
        #[from]
        source: std::io::Error,
    },

    /// Json serialization error.
    #[error("json serde error: {}", source)]
    JsonError {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },

    /// Url parsing error
    #[error(transparent)]
    UrlParse {
        #[from]
        source: url::ParseError,
    },
}
