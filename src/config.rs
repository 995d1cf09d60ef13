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

use config::{File, FileFormat};
use eyre::{Report, WrapErr};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Global configuration options
    #[serde(rename = "DEFAULT")]
    pub default: Option<DefaultSection>,

    /// OpenID protocol engine configuration.
    #[serde(default)]
    pub openid: OpenIdSection,

    /// Association service configuration.
    #[serde(default)]
    pub association: AssociationSection,

    /// User directory configuration.
    #[serde(default)]
    pub directory: DirectorySection,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct DefaultSection {
    /// Debug logging
    pub debug: Option<bool>,
    /// Public endpoint
    pub public_endpoint: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenIdSection {
    /// The amount of time (in seconds) an idle protocol conversation is
    /// kept before being reclaimed. Conversations are refreshed by every
    /// request of the session, so this only bounds abandoned flows.
    #[serde(default = "default_conversation_ttl")]
    pub conversation_ttl: u64,
}

impl Default for OpenIdSection {
    fn default() -> Self {
        Self {
            conversation_ttl: default_conversation_ttl(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssociationSection {
    #[serde(default = "default_hmac_driver")]
    pub driver: String,

    /// The amount of time (in seconds) an association remains valid.
    /// Applies to relying-party associations and to private associations
    /// minted for assertion signing alike.
    #[serde(default = "default_association_expiration")]
    pub expiration: u64,
}

impl Default for AssociationSection {
    fn default() -> Self {
        Self {
            driver: default_hmac_driver(),
            expiration: default_association_expiration(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DirectorySection {
    #[serde(default = "default_ldap_driver")]
    pub driver: String,

    /// LDAP server URL.
    #[serde(default)]
    pub url: String,

    /// Subtree under which user entries live.
    #[serde(default)]
    pub user_tree_dn: String,

    /// Search filter locating a user entry; `{username}` is replaced with
    /// the escaped login name.
    #[serde(default = "default_user_filter")]
    pub user_filter: String,

    /// Attribute carrying the canonical user identifier.
    #[serde(default = "default_user_id_attribute")]
    pub user_id_attribute: String,

    /// Attribute carrying the email address.
    #[serde(default = "default_email_attribute")]
    pub email_attribute: String,

    /// Service account for the entry search; anonymous when unset.
    pub bind_dn: Option<String>,
    pub bind_password: Option<SecretString>,
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self {
            driver: default_ldap_driver(),
            url: String::new(),
            user_tree_dn: String::new(),
            user_filter: default_user_filter(),
            user_id_attribute: default_user_id_attribute(),
            email_attribute: default_email_attribute(),
            bind_dn: None,
            bind_password: None,
        }
    }
}

fn default_hmac_driver() -> String {
    "hmac".into()
}

fn default_ldap_driver() -> String {
    "ldap".into()
}

fn default_conversation_ttl() -> u64 {
    3600
}

fn default_association_expiration() -> u64 {
    46800
}

fn default_user_filter() -> String {
    "(cn={username})".into()
}

fn default_user_id_attribute() -> String {
    "cn".into()
}

fn default_email_attribute() -> String {
    "mail".into()
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if std::path::Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path).format(FileFormat::Ini));
        }

        builder.try_into()
    }

    /// The externally reachable base URL, without a trailing slash.
    pub fn public_endpoint(&self) -> String {
        self.default
            .as_ref()
            .and_then(|default| default.public_endpoint.as_deref())
            .unwrap_or("http://localhost:8080")
            .trim_end_matches('/')
            .to_string()
    }
}

impl TryFrom<config::ConfigBuilder<config::builder::DefaultState>> for Config {
    type Error = Report;
    fn try_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Self::Error> {
        let mut builder = builder;
        builder = builder
            .set_default("openid.conversation_ttl", "3600")?
            .set_default("association.expiration", "46800")?
            .set_default("directory.user_filter", "(cn={username})")?
            .set_default("directory.user_id_attribute", "cn")?
            .set_default("directory.email_attribute", "mail")?;

        builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.openid.conversation_ttl, 3600);
        assert_eq!(config.association.driver, "hmac");
        assert_eq!(config.association.expiration, 46800);
        assert_eq!(config.directory.driver, "ldap");
        assert_eq!(config.directory.user_filter, "(cn={username})");
    }

    #[test]
    fn test_public_endpoint_strips_trailing_slash() {
        let config = Config {
            default: Some(DefaultSection {
                debug: None,
                public_endpoint: Some("https://id.example.org/".into()),
            }),
            ..Default::default()
        };
        assert_eq!(config.public_endpoint(), "https://id.example.org");
    }

    #[test]
    fn test_public_endpoint_fallback() {
        assert_eq!(Config::default().public_endpoint(), "http://localhost:8080");
    }
}
