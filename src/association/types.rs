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

use chrono::{DateTime, Utc};

/// Association session type accepted by this provider. Diffie-Hellman
/// session types are not implemented.
pub const SESSION_NO_ENCRYPTION: &str = "no-encryption";

/// MAC algorithm of an association.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AssociationType {
    HmacSha1,
    #[default]
    HmacSha256,
}

impl AssociationType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "HMAC-SHA1" => Some(Self::HmacSha1),
            "HMAC-SHA256" => Some(Self::HmacSha256),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacSha1 => "HMAC-SHA1",
            Self::HmacSha256 => "HMAC-SHA256",
        }
    }

    /// MAC key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            Self::HmacSha1 => 20,
            Self::HmacSha256 => 32,
        }
    }
}

/// A shared signing context, independent of any single user.
#[derive(Clone)]
pub struct Association {
    /// Opaque handle referenced by protocol messages.
    pub handle: String,
    pub assoc_type: AssociationType,
    /// Raw MAC key. Disclosed to the relying party only for associations
    /// established through `associate`; private associations keep it
    /// provider-side.
    pub mac_key: Vec<u8>,
    pub expires_at: DateTime<Utc>,
    /// Created provider-side for assertions signed without a relying
    /// party association; only usable through `check_authentication`.
    pub private: bool,
}

impl Association {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl std::fmt::Debug for Association {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Association")
            .field("handle", &self.handle)
            .field("assoc_type", &self.assoc_type)
            .field("mac_key", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("private", &self.private)
            .finish()
    }
}
