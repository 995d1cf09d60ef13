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
//! # OpenID protocol types
//!
//! Flat key/value message shapes of the OpenID 2.0 wire protocol: the
//! inbound parameter snapshot, the outbound message with its two renderings
//! (direct key-value form and indirect redirect), and the attribute
//! exchange extension variants.
use std::collections::BTreeMap;
use url::Url;

/// The OpenID 2.0 protocol namespace.
pub const OPENID2_NS: &str = "http://specs.openid.net/auth/2.0";

/// The attribute exchange extension namespace.
pub const AX_NS: &str = "http://openid.net/srv/ax/1.0";

/// Namespace alias under which attribute exchange fields are emitted in
/// responses. Inbound requests may declare any alias; outbound messages
/// always use this one.
pub const AX_RESPONSE_ALIAS: &str = "ax";

/// Protocol message mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Establish a shared association.
    Associate,
    /// Interactive identity assertion request.
    CheckidSetup,
    /// Non-interactive identity assertion probe.
    CheckidImmediate,
    /// Verification of a previously issued assertion.
    CheckAuthentication,
}

impl Mode {
    /// Parse the `openid.mode` parameter value. Unrecognized values yield
    /// `None` and are reported through [`ProtocolError::UnknownMode`].
    ///
    /// [`ProtocolError::UnknownMode`]: crate::openid::error::ProtocolError
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "associate" => Some(Self::Associate),
            "checkid_setup" => Some(Self::CheckidSetup),
            "checkid_immediate" => Some(Self::CheckidImmediate),
            "check_authentication" => Some(Self::CheckAuthentication),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Associate => "associate",
            Self::CheckidSetup => "checkid_setup",
            Self::CheckidImmediate => "checkid_immediate",
            Self::CheckAuthentication => "check_authentication",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of the inbound protocol parameters for one exchange.
///
/// Keys are kept exactly as received (`openid.mode`, `openid.return_to`,
/// extension fields included). The snapshot is taken once at the protocol
/// entry point and never mutated during the conversation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParameterList(BTreeMap<String, String>);

impl ParameterList {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `openid.mode` parameter, raw.
    pub fn mode(&self) -> Option<&str> {
        self.get("openid.mode")
    }

    /// The `openid.return_to` parameter.
    pub fn return_to(&self) -> Option<&str> {
        self.get("openid.return_to")
    }

    /// The explicit `openid.realm` parameter, if any.
    pub fn realm(&self) -> Option<&str> {
        self.get("openid.realm")
    }
}

impl From<BTreeMap<String, String>> for ParameterList {
    fn from(params: BTreeMap<String, String>) -> Self {
        Self(params)
    }
}

impl FromIterator<(String, String)> for ParameterList {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outbound protocol message.
///
/// Fields are stored without the `openid.` prefix; the prefix is applied
/// when the message is appended to a redirect URL. Direct responses use
/// the OpenID key-value form where the prefix is absent as well.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Message {
    fields: BTreeMap<String, String>,
}

impl Message {
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("ns".into(), OPENID2_NS.into());
        Self { fields }
    }

    /// An empty message without the namespace declaration, for responses
    /// echoed verbatim from a backend.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as the OpenID key-value form used for direct responses
    /// (`associate`, `check_authentication`).
    pub fn to_key_value_form(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            out.push_str(key);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// The indirect-response destination: the relying party's return URL
    /// with all message fields appended as `openid.`-prefixed query
    /// parameters.
    pub fn destination_url(&self, return_to: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(return_to)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.fields {
                pairs.append_pair(&format!("openid.{key}"), value);
            }
        }
        Ok(url)
    }
}

/// Extension payload carried by an authentication request.
///
/// Explicit tagged dispatch over the extension kinds this provider knows
/// about; anything else is `Unknown` and ignored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Extension {
    /// An attribute exchange fetch request.
    Fetch(FetchRequest),
    /// No extension namespace declared.
    None,
    /// An extension namespace was declared but is not a fetch request.
    Unknown,
}

impl Extension {
    /// Detect the extension carried by the inbound parameters.
    ///
    /// The attribute exchange namespace may be declared under any alias
    /// (`openid.ns.<alias>`); the fetch attributes are read from
    /// `openid.<alias>.type.<name>` pairs.
    pub fn from_parameters(params: &ParameterList) -> Self {
        let alias = params.iter().find_map(|(key, value)| {
            key.strip_prefix("openid.ns.")
                .filter(|_| value == AX_NS)
                .map(str::to_string)
        });
        let Some(alias) = alias else {
            return Self::None;
        };

        if params.get(&format!("openid.{alias}.mode")) != Some("fetch_request") {
            return Self::Unknown;
        }

        let type_prefix = format!("openid.{alias}.type.");
        let attributes = params
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&type_prefix)
                    .map(|name| (name.to_string(), value.to_string()))
            })
            .collect();
        Self::Fetch(FetchRequest { attributes })
    }
}

/// Attribute exchange fetch request: response alias to requested
/// attribute-type URI.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FetchRequest {
    pub attributes: BTreeMap<String, String>,
}

/// Attribute exchange fetch response: alias to (type URI, value).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FetchResponse {
    attributes: BTreeMap<String, (String, String)>,
}

impl FetchResponse {
    pub fn add<A: Into<String>>(&mut self, alias: A, type_uri: &str, value: &str) {
        self.attributes
            .insert(alias.into(), (type_uri.into(), value.into()));
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.attributes.get(alias).map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attach the response to an outbound assertion message under the
    /// fixed response alias.
    pub fn apply(&self, message: &mut Message) {
        if self.attributes.is_empty() {
            return;
        }
        message.set(format!("ns.{AX_RESPONSE_ALIAS}"), AX_NS);
        message.set(format!("{AX_RESPONSE_ALIAS}.mode"), "fetch_response");
        for (alias, (type_uri, value)) in &self.attributes {
            message.set(
                format!("{AX_RESPONSE_ALIAS}.type.{alias}"),
                type_uri.clone(),
            );
            message.set(
                format!("{AX_RESPONSE_ALIAS}.value.{alias}"),
                value.clone(),
            );
        }
    }
}
