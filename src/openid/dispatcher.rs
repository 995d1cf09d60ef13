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
//! # Protocol dispatcher
//!
//! Routes an inbound protocol request to the association service based on
//! `openid.mode` and decides between answering directly, redirecting back
//! to the relying party and suspending for user confirmation.
use url::Url;

use crate::account::ServiceState;
use crate::association::AssociationApi;
use crate::openid::attribute_exchange;
use crate::openid::conversation::Conversation;
use crate::openid::error::ProtocolError;
use crate::openid::types::{Extension, Message, Mode};

/// Outcome of dispatching one protocol request.
#[derive(Clone, Debug)]
pub enum ProtocolResult {
    /// Direct response, rendered in key-value form.
    Response(Message),
    /// Indirect response, delivered by redirecting the user agent.
    Redirect(Url),
    /// The flow is suspended until the user confirms the relying party's
    /// realm; the conversation keeps the request for later replay.
    ConfirmationRequired,
}

/// Dispatch the conversation's current request.
///
/// Authentication requests pass the approval gate before any assertion is
/// signed: an unapproved realm suspends the flow regardless of the request
/// being `checkid_setup` or `checkid_immediate`. Everything else maps
/// directly onto an association service call.
#[tracing::instrument(level = "debug", skip(state, conversation))]
pub async fn handle(
    state: &ServiceState,
    conversation: &Conversation,
) -> Result<ProtocolResult, ProtocolError> {
    let params = &conversation.request;
    match conversation.mode {
        Some(Mode::Associate) => {
            let message = state
                .provider
                .get_association_provider()
                .association_response(params)
                .await?;
            Ok(ProtocolResult::Response(message))
        }
        Some(Mode::CheckidSetup) | Some(Mode::CheckidImmediate) => {
            let realm = conversation
                .realm
                .as_deref()
                .ok_or(ProtocolError::RealmMissing)?;
            if !conversation.is_approved(realm) {
                return Ok(ProtocolResult::ConfirmationRequired);
            }
            let Some(identity) = conversation.identity.as_deref() else {
                return Ok(ProtocolResult::ConfirmationRequired);
            };

            let mut message = state
                .provider
                .get_association_provider()
                .auth_response(params, identity, identity)
                .await?;

            // Attribute exchange data rides along unsigned; the signature
            // covers the core assertion fields only.
            if let Extension::Fetch(fetch) = Extension::from_parameters(params)
                && let Some(profile) = &conversation.profile
            {
                attribute_exchange::respond(&fetch, profile).apply(&mut message);
            }

            let return_to = message
                .get("return_to")
                .map(str::to_string)
                .unwrap_or_default();
            Ok(ProtocolResult::Redirect(message.destination_url(&return_to)?))
        }
        Some(Mode::CheckAuthentication) => {
            let message = state
                .provider
                .get_association_provider()
                .verify(params)
                .await?;
            Ok(ProtocolResult::Response(message))
        }
        None => Err(ProtocolError::UnknownMode(
            params.mode().map(str::to_string),
        )),
    }
}
