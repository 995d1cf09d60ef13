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
//! # LDAP directory driver
//!
//! Credential verification is delegated to the directory itself: the user
//! entry is located with a filter search and the supplied password is then
//! checked by binding as that entry.
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, Scope, SearchEntry, ldap_escape};
use secrecy::{ExposeSecret, SecretString};

use super::DirectoryBackend;
use crate::config::Config;
use crate::directory::error::DirectoryProviderError;
use crate::directory::types::Profile;

#[derive(Clone, Debug, Default)]
pub struct LdapBackend {
    config: Config,
}

impl LdapBackend {
    async fn connect(&self) -> Result<Ldap, DirectoryProviderError> {
        let (conn, mut ldap) = LdapConnAsync::new(&self.config.directory.url).await?;
        ldap3::drive!(conn);
        if let Some(bind_dn) = &self.config.directory.bind_dn
            && let Some(bind_password) = &self.config.directory.bind_password
        {
            ldap.simple_bind(bind_dn, bind_password.expose_secret())
                .await?
                .success()?;
        }
        Ok(ldap)
    }

    async fn find_entry(
        &self,
        ldap: &mut Ldap,
        user_id: &str,
    ) -> Result<SearchEntry, DirectoryProviderError> {
        let directory = &self.config.directory;
        let filter = directory
            .user_filter
            .replace("{username}", &ldap_escape(user_id));
        let (entries, _) = ldap
            .search(
                &directory.user_tree_dn,
                Scope::Subtree,
                &filter,
                vec![
                    directory.user_id_attribute.as_str(),
                    directory.email_attribute.as_str(),
                ],
            )
            .await?
            .success()?;
        entries
            .into_iter()
            .next()
            .map(SearchEntry::construct)
            .ok_or_else(|| DirectoryProviderError::UserNotFound(user_id.to_string()))
    }

    fn profile_from(&self, entry: &SearchEntry, user_id: &str) -> Profile {
        let directory = &self.config.directory;
        let attr = |name: &str| {
            entry
                .attrs
                .get(name)
                .and_then(|values| values.first())
                .cloned()
        };
        Profile {
            user_id: attr(&directory.user_id_attribute).unwrap_or_else(|| user_id.to_string()),
            email: attr(&directory.email_attribute),
        }
    }
}

#[async_trait]
impl DirectoryBackend for LdapBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    #[tracing::instrument(level = "debug", skip(self, password))]
    async fn authenticate(
        &self,
        user_id: &str,
        password: &SecretString,
    ) -> Result<Profile, DirectoryProviderError> {
        let mut ldap = self.connect().await?;
        let entry = self.find_entry(&mut ldap, user_id).await.map_err(|err| {
            // Do not reveal whether the user exists.
            match err {
                DirectoryProviderError::UserNotFound(_) => {
                    DirectoryProviderError::AuthenticationFailed
                }
                other => other,
            }
        })?;
        let bound = ldap
            .simple_bind(&entry.dn, password.expose_secret())
            .await?
            .success();
        let _ = ldap.unbind().await;
        if bound.is_err() {
            return Err(DirectoryProviderError::AuthenticationFailed);
        }
        Ok(self.profile_from(&entry, user_id))
    }
}
