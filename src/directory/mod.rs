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
//! # User directory
//!
//! Authenticates users and serves the profile attributes disclosed through
//! attribute exchange. The built-in `ldap` driver verifies credentials by
//! binding against the directory as the user's own entry.
use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use secrecy::SecretString;

use crate::config::Config;
use crate::directory::backend::{DirectoryBackend, LdapBackend};
use crate::directory::error::DirectoryProviderError;
use crate::directory::types::Profile;
use crate::plugin_manager::PluginManager;

pub mod backend;
pub mod error;
pub mod types;

#[async_trait]
pub trait DirectoryApi: Send + Sync + Clone {
    /// Verify the user's credentials and return the profile.
    async fn authenticate<'a>(
        &self,
        user_id: &'a str,
        password: &'a SecretString,
    ) -> Result<Profile, DirectoryProviderError>;
}

#[derive(Clone, Debug)]
pub struct DirectoryProvider {
    backend_driver: Box<dyn DirectoryBackend>,
}

impl DirectoryProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, DirectoryProviderError> {
        let mut backend_driver = match config.directory.driver.as_str() {
            "ldap" => Box::new(LdapBackend::default()) as Box<dyn DirectoryBackend>,
            driver => {
                if let Some(driver) = plugin_manager.get_directory_backend(driver) {
                    driver.clone()
                } else {
                    return Err(DirectoryProviderError::UnsupportedDriver(
                        driver.to_string(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self { backend_driver })
    }
}

#[async_trait]
impl DirectoryApi for DirectoryProvider {
    #[tracing::instrument(level = "info", skip(self, password))]
    async fn authenticate<'a>(
        &self,
        user_id: &'a str,
        password: &'a SecretString,
    ) -> Result<Profile, DirectoryProviderError> {
        self.backend_driver.authenticate(user_id, password).await
    }
}

#[cfg(test)]
mock! {
    pub DirectoryProvider {
        pub fn new(
            config: &Config,
            plugin_manager: &PluginManager,
        ) -> Result<Self, DirectoryProviderError>;
    }

    #[async_trait]
    impl DirectoryApi for DirectoryProvider {
        async fn authenticate<'a>(
            &self,
            user_id: &'a str,
            password: &'a SecretString,
        ) -> Result<Profile, DirectoryProviderError>;
    }

    impl Clone for DirectoryProvider {
        fn clone(&self) -> Self;
    }
}
