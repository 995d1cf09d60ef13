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

use thiserror::Error;

/// Errors raised while constructing or verifying protocol messages.
#[derive(Debug, Error)]
pub enum AssociationProviderError {
    /// Unsupported driver
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    /// A required protocol parameter is absent.
    #[error("missing required parameter {0}")]
    MissingParameter(&'static str),

    /// The relying party requested an association session this provider
    /// does not implement (Diffie-Hellman exchanges among them).
    #[error("unsupported association session type {0}")]
    UnsupportedSessionType(String),

    /// The relying party requested an unknown MAC algorithm.
    #[error("unsupported association type {0}")]
    UnsupportedAssociationType(String),

    /// A field named in the signed-field list is absent from the message
    /// being signed.
    #[error("signed field {0} missing from message")]
    SignedFieldMissing(String),

    /// MAC computation rejected the key.
    #[error("signature computation failed: {source}")]
    Signature {
        #[from]
        source: hmac::digest::InvalidLength,
    },
}
