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

use crate::association::error::AssociationProviderError;

/// Errors of the protocol state machine.
///
/// Every variant is terminal for the current request: no partial response
/// is emitted and nothing is retried. The confirmation detour is NOT an
/// error and is represented as a
/// [`ProtocolResult`](crate::openid::dispatcher::ProtocolResult) variant
/// instead.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The `openid.mode` parameter is missing or not one of the modes this
    /// provider implements.
    #[error("unknown request: {}", .0.as_deref().unwrap_or("<no mode>"))]
    UnknownMode(Option<String>),

    /// Both `openid.realm` and `openid.return_to` are absent; the
    /// conversation cannot proceed past mode dispatch.
    #[error("neither realm nor return_to present in the request")]
    RealmMissing,

    /// The Association Service rejected or could not construct a message.
    #[error(transparent)]
    Association {
        #[from]
        source: AssociationProviderError,
    },

    /// The relying party's return URL cannot carry the assertion.
    #[error("malformed return_to url: {}", source)]
    ReturnTo {
        #[from]
        source: url::ParseError,
    },
}
