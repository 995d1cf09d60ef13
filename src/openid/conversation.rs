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
//! # Conversation state
//!
//! One [`Conversation`] exists per browser session while an OpenID exchange
//! is active. It holds the immutable parameter snapshot of the current
//! request, the realm derived from it, the realms the user has approved so
//! far and, after confirmation, the resolved identity URL. The
//! [`ConversationStore`] keeps conversations in memory keyed by the session
//! cookie; there is no persistence beyond the process.
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::directory::types::Profile;
use crate::openid::types::{Mode, ParameterList};

/// Per-session protocol conversation.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    /// Snapshot of the inbound protocol parameters of the current exchange.
    pub request: ParameterList,
    /// Parsed `openid.mode`; `None` when absent or unrecognized.
    pub mode: Option<Mode>,
    /// Relying party realm; derived when not given explicitly.
    pub realm: Option<String>,
    /// Relying party return URL.
    pub return_to: Option<String>,
    /// Realms the user approved within this session. Grows monotonically;
    /// cleared only when the conversation ends.
    approved_realms: HashSet<String>,
    /// Identity URL of the user; set by the confirmation step only.
    pub identity: Option<String>,
    /// Authenticated profile, owned by the login subsystem; the
    /// conversation keeps a read-only copy.
    pub profile: Option<Profile>,
    /// Reclamation deadline, refreshed on every request.
    pub expires_at: DateTime<Utc>,
}

impl Conversation {
    /// Re-snapshot the conversation for a new inbound protocol request.
    ///
    /// Approvals, identity and profile survive across requests of the same
    /// session; the request parameters and everything derived from them do
    /// not.
    pub fn absorb(&mut self, params: ParameterList) {
        self.mode = params.mode().and_then(Mode::parse);
        self.return_to = params.return_to().map(str::to_string);
        self.realm = Self::derive_realm(&params);
        self.request = params;
    }

    /// Realm of the request: the explicit `openid.realm` parameter wins
    /// (even when it disagrees with the return URL host); otherwise the
    /// host of `openid.return_to`; a malformed return URL falls back to
    /// the raw string rather than being rejected.
    fn derive_realm(params: &ParameterList) -> Option<String> {
        if let Some(realm) = params.realm() {
            return Some(realm.to_string());
        }
        params.return_to().map(|return_to| {
            Url::parse(return_to)
                .ok()
                .and_then(|url| url.host_str().map(str::to_string))
                .unwrap_or_else(|| return_to.to_string())
        })
    }

    /// Record the user's approval of a realm.
    pub fn approve<R: Into<String>>(&mut self, realm: R) {
        self.approved_realms.insert(realm.into());
    }

    /// Exact string-equality membership check; no cross-realm inference.
    pub fn is_approved(&self, realm: &str) -> bool {
        self.approved_realms.contains(realm)
    }
}

/// In-memory store of active conversations, keyed by the session id.
///
/// A single logical request flow mutates any one conversation at a time;
/// the lock only guards concurrent access from different sessions and is
/// never held across the confirmation suspension.
#[derive(Debug)]
pub struct ConversationStore {
    ttl: TimeDelta,
    sessions: RwLock<HashMap<Uuid, Conversation>>,
}

impl ConversationStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl: TimeDelta::seconds(ttl_seconds.min(i64::MAX as u64) as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot a new inbound protocol request into the session's
    /// conversation, creating the conversation on first contact.
    pub async fn absorb(&self, session_id: Uuid, params: ParameterList) -> Conversation {
        let mut sessions = self.sessions.write().await;
        let conversation = sessions.entry(session_id).or_default();
        conversation.absorb(params);
        conversation.expires_at = Utc::now() + self.ttl;
        conversation.clone()
    }

    pub async fn get(&self, session_id: Uuid) -> Option<Conversation> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    /// Write back a mutated conversation, refreshing its deadline.
    pub async fn save(&self, session_id: Uuid, mut conversation: Conversation) {
        conversation.expires_at = Utc::now() + self.ttl;
        self.sessions.write().await.insert(session_id, conversation);
    }

    /// Attach an authenticated profile to the session, creating the
    /// conversation when login happens before the first protocol request.
    pub async fn set_profile(&self, session_id: Uuid, profile: Profile) {
        let mut sessions = self.sessions.write().await;
        let conversation = sessions.entry(session_id).or_default();
        conversation.profile = Some(profile);
        conversation.expires_at = Utc::now() + self.ttl;
    }

    /// Explicit invalidation (logout).
    pub async fn remove(&self, session_id: Uuid) {
        self.sessions.write().await.remove(&session_id);
    }

    /// Drop expired conversations; returns the number reclaimed.
    pub async fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, conversation| conversation.expires_at > now);
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParameterList {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_realm_from_explicit_parameter() {
        let mut conversation = Conversation::default();
        conversation.absorb(params(&[
            ("openid.mode", "checkid_setup"),
            ("openid.realm", "https://ci.example.org"),
            ("openid.return_to", "https://elsewhere.example.net/back"),
        ]));
        assert_eq!(conversation.realm.as_deref(), Some("https://ci.example.org"));
    }

    #[test]
    fn test_realm_from_return_to_host() {
        let mut conversation = Conversation::default();
        conversation.absorb(params(&[
            ("openid.mode", "checkid_setup"),
            ("openid.return_to", "https://ci.example.org/path"),
        ]));
        assert_eq!(conversation.realm.as_deref(), Some("ci.example.org"));
    }

    #[test]
    fn test_realm_falls_back_to_raw_return_to() {
        let mut conversation = Conversation::default();
        conversation.absorb(params(&[
            ("openid.mode", "checkid_setup"),
            ("openid.return_to", "not a url"),
        ]));
        assert_eq!(conversation.realm.as_deref(), Some("not a url"));
    }

    #[test]
    fn test_realm_absent_without_parameters() {
        let mut conversation = Conversation::default();
        conversation.absorb(params(&[("openid.mode", "checkid_setup")]));
        assert_eq!(conversation.realm, None);
    }

    #[test]
    fn test_approvals_survive_resnapshot() {
        let mut conversation = Conversation::default();
        conversation.absorb(params(&[
            ("openid.mode", "checkid_setup"),
            ("openid.return_to", "https://ci.example.org/path"),
        ]));
        conversation.approve("ci.example.org");
        conversation.identity = Some("https://id.example.org~alice".into());

        conversation.absorb(params(&[
            ("openid.mode", "checkid_immediate"),
            ("openid.return_to", "https://ci.example.org/other"),
        ]));
        assert!(conversation.is_approved("ci.example.org"));
        assert_eq!(
            conversation.identity.as_deref(),
            Some("https://id.example.org~alice")
        );
        assert_eq!(conversation.mode, Some(Mode::CheckidImmediate));
    }

    #[test]
    fn test_no_cross_realm_inference() {
        let mut conversation = Conversation::default();
        conversation.approve("https://ci.example.org");
        assert!(!conversation.is_approved("https://sub.ci.example.org"));
        assert!(!conversation.is_approved("ci.example.org"));
    }

    #[tokio::test]
    async fn test_store_lifecycle() {
        let store = ConversationStore::new(3600);
        let session = Uuid::new_v4();
        assert!(store.get(session).await.is_none());

        let conversation = store
            .absorb(session, params(&[("openid.mode", "associate")]))
            .await;
        assert_eq!(conversation.mode, Some(Mode::Associate));
        assert!(store.get(session).await.is_some());

        store.remove(session).await;
        assert!(store.get(session).await.is_none());
    }

    #[tokio::test]
    async fn test_store_cleanup_reclaims_expired() {
        let store = ConversationStore::new(0);
        let session = Uuid::new_v4();
        store.absorb(session, ParameterList::default()).await;
        assert_eq!(store.cleanup().await, 1);
        assert!(store.get(session).await.is_none());
    }
}
