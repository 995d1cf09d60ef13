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
//! # In-memory HMAC association driver
//!
//! Holds association records in process memory and signs assertions with
//! HMAC-SHA1 or HMAC-SHA256. Only the `no-encryption` association session
//! is offered; Diffie-Hellman key exchange is rejected at the protocol
//! level, which in practice confines relying parties to HTTPS endpoints.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::prelude::*;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use sha2::Sha256;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AssociationBackend;
use crate::association::error::AssociationProviderError;
use crate::association::types::{Association, AssociationType, SESSION_NO_ENCRYPTION};
use crate::config::Config;
use crate::openid::types::{Message, ParameterList};

/// Assertion fields covered by the signature, in signing order.
const SIGNED_FIELDS: [&str; 6] = [
    "op_endpoint",
    "claimed_id",
    "identity",
    "return_to",
    "response_nonce",
    "assoc_handle",
];

#[derive(Clone, Debug, Default)]
pub struct HmacBackend {
    config: Config,
    associations: Arc<RwLock<HashMap<String, Association>>>,
}

impl HmacBackend {
    /// Mint a fresh association with a random handle and MAC key.
    fn generate(&self, assoc_type: AssociationType, private: bool) -> Association {
        let mut mac_key = vec![0u8; assoc_type.key_len()];
        rand::rngs::OsRng.fill_bytes(&mut mac_key);
        Association {
            handle: Uuid::new_v4().simple().to_string(),
            assoc_type,
            mac_key,
            expires_at: Utc::now()
                + chrono::TimeDelta::seconds(
                    self.config.association.expiration.min(i64::MAX as u64) as i64,
                ),
            private,
        }
    }

    fn op_endpoint(&self) -> String {
        format!("{}/openid", self.config.public_endpoint())
    }

    /// Response nonce: UTC timestamp followed by unique characters, as
    /// required of assertion nonces.
    fn nonce() -> String {
        format!(
            "{}{}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            Uuid::new_v4().simple()
        )
    }

    /// HMAC over the key-value form of the named fields.
    fn sign(
        association: &Association,
        message: &Message,
        fields: &[&str],
    ) -> Result<String, AssociationProviderError> {
        let mut data = String::new();
        for field in fields {
            let value = message.get(field).ok_or_else(|| {
                AssociationProviderError::SignedFieldMissing(field.to_string())
            })?;
            data.push_str(field);
            data.push(':');
            data.push_str(value);
            data.push('\n');
        }
        let digest = match association.assoc_type {
            AssociationType::HmacSha1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(&association.mac_key)?;
                mac.update(data.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
            AssociationType::HmacSha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(&association.mac_key)?;
                mac.update(data.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(BASE64_STANDARD.encode(digest))
    }

    fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

#[async_trait]
impl AssociationBackend for HmacBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    #[tracing::instrument(level = "debug", skip(self, params))]
    async fn associate(
        &self,
        params: &ParameterList,
    ) -> Result<Message, AssociationProviderError> {
        let session_type = params
            .get("openid.session_type")
            .ok_or(AssociationProviderError::MissingParameter(
                "openid.session_type",
            ))?;
        if session_type != SESSION_NO_ENCRYPTION {
            return Err(AssociationProviderError::UnsupportedSessionType(
                session_type.to_string(),
            ));
        }
        let assoc_type_raw =
            params
                .get("openid.assoc_type")
                .ok_or(AssociationProviderError::MissingParameter(
                    "openid.assoc_type",
                ))?;
        let assoc_type = AssociationType::parse(assoc_type_raw).ok_or_else(|| {
            AssociationProviderError::UnsupportedAssociationType(assoc_type_raw.to_string())
        })?;

        let association = self.generate(assoc_type, false);

        let mut message = Message::new();
        message.set("assoc_handle", association.handle.clone());
        message.set("session_type", SESSION_NO_ENCRYPTION);
        message.set("assoc_type", assoc_type.as_str());
        message.set(
            "expires_in",
            self.config.association.expiration.to_string(),
        );
        message.set("mac_key", BASE64_STANDARD.encode(&association.mac_key));

        self.associations
            .write()
            .await
            .insert(association.handle.clone(), association);

        Ok(message)
    }

    #[tracing::instrument(level = "debug", skip(self, params))]
    async fn auth_response(
        &self,
        params: &ParameterList,
        claimed_id: &str,
        local_id: &str,
    ) -> Result<Message, AssociationProviderError> {
        let return_to =
            params
                .get("openid.return_to")
                .ok_or(AssociationProviderError::MissingParameter(
                    "openid.return_to",
                ))?;

        // Sign with the relying party's association when it is known and
        // fresh; otherwise fall back to a private association and tell the
        // relying party to drop the stale handle.
        let mut invalidate_handle = None;
        let association = {
            let associations = self.associations.read().await;
            match params.get("openid.assoc_handle") {
                Some(handle) => match associations.get(handle).filter(|a| !a.is_expired()) {
                    Some(association) => Some(association.clone()),
                    None => {
                        invalidate_handle = Some(handle.to_string());
                        None
                    }
                },
                None => None,
            }
        };
        let association = match association {
            Some(association) => association,
            None => {
                let association = self.generate(AssociationType::default(), true);
                self.associations
                    .write()
                    .await
                    .insert(association.handle.clone(), association.clone());
                association
            }
        };

        let mut message = Message::new();
        message.set("mode", "id_res");
        message.set("op_endpoint", self.op_endpoint());
        message.set("claimed_id", claimed_id);
        message.set("identity", local_id);
        message.set("return_to", return_to);
        message.set("response_nonce", Self::nonce());
        message.set("assoc_handle", association.handle.clone());
        if let Some(handle) = invalidate_handle {
            message.set("invalidate_handle", handle);
        }
        message.set("signed", SIGNED_FIELDS.join(","));
        let sig = Self::sign(&association, &message, &SIGNED_FIELDS)?;
        message.set("sig", sig);

        Ok(message)
    }

    #[tracing::instrument(level = "debug", skip(self, params))]
    async fn verify(
        &self,
        params: &ParameterList,
    ) -> Result<Message, AssociationProviderError> {
        let handle =
            params
                .get("openid.assoc_handle")
                .ok_or(AssociationProviderError::MissingParameter(
                    "openid.assoc_handle",
                ))?;
        let signed = params
            .get("openid.signed")
            .ok_or(AssociationProviderError::MissingParameter("openid.signed"))?;
        let sig = params
            .get("openid.sig")
            .ok_or(AssociationProviderError::MissingParameter("openid.sig"))?;

        // Verification never consumes the association; repeating the same
        // request yields the same answer.
        let is_valid = match self
            .associations
            .read()
            .await
            .get(handle)
            .filter(|a| !a.is_expired())
        {
            Some(association) => {
                let fields: Vec<&str> = signed.split(',').collect();
                let mut claimed = Message::empty();
                let mut complete = true;
                for field in &fields {
                    match params.get(&format!("openid.{field}")) {
                        Some(value) => claimed.set(*field, value),
                        None => complete = false,
                    }
                }
                complete
                    && Self::constant_time_eq(
                        Self::sign(association, &claimed, &fields)?.as_bytes(),
                        sig.as_bytes(),
                    )
            }
            None => false,
        };

        let mut message = Message::new();
        message.set("is_valid", if is_valid { "true" } else { "false" });
        Ok(message)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn cleanup(&self) -> Result<usize, AssociationProviderError> {
        let mut associations = self.associations.write().await;
        let before = associations.len();
        associations.retain(|_, association| !association.is_expired());
        Ok(before - associations.len())
    }
}
