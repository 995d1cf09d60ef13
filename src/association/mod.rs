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
//! # Association service
//!
//! Owns the shared-secret associations and the signing of positive
//! assertions. The provider delegates to a configurable backend driver;
//! the built-in `hmac` driver keeps associations in process memory.
use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;

use crate::association::backend::{AssociationBackend, HmacBackend};
use crate::association::error::AssociationProviderError;
use crate::config::Config;
use crate::openid::types::{Message, ParameterList};
use crate::plugin_manager::PluginManager;

pub mod backend;
pub mod error;
pub mod types;

#[async_trait]
pub trait AssociationApi: Send + Sync + Clone {
    /// Establish an association and render the direct response.
    async fn association_response<'a>(
        &self,
        params: &'a ParameterList,
    ) -> Result<Message, AssociationProviderError>;

    /// Build the signed positive assertion for an approved authentication
    /// request.
    async fn auth_response<'a>(
        &self,
        params: &'a ParameterList,
        claimed_id: &'a str,
        local_id: &'a str,
    ) -> Result<Message, AssociationProviderError>;

    /// Answer a `check_authentication` request.
    async fn verify<'a>(
        &self,
        params: &'a ParameterList,
    ) -> Result<Message, AssociationProviderError>;

    /// Drop expired associations; returns the number reclaimed.
    async fn cleanup(&self) -> Result<usize, AssociationProviderError>;
}

#[derive(Clone, Debug)]
pub struct AssociationProvider {
    backend_driver: Box<dyn AssociationBackend>,
}

impl AssociationProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, AssociationProviderError> {
        let mut backend_driver = match config.association.driver.as_str() {
            "hmac" => Box::new(HmacBackend::default()) as Box<dyn AssociationBackend>,
            driver => {
                if let Some(driver) = plugin_manager.get_association_backend(driver) {
                    driver.clone()
                } else {
                    return Err(AssociationProviderError::UnsupportedDriver(
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
impl AssociationApi for AssociationProvider {
    #[tracing::instrument(level = "info", skip(self, params))]
    async fn association_response<'a>(
        &self,
        params: &'a ParameterList,
    ) -> Result<Message, AssociationProviderError> {
        self.backend_driver.associate(params).await
    }

    #[tracing::instrument(level = "info", skip(self, params))]
    async fn auth_response<'a>(
        &self,
        params: &'a ParameterList,
        claimed_id: &'a str,
        local_id: &'a str,
    ) -> Result<Message, AssociationProviderError> {
        self.backend_driver
            .auth_response(params, claimed_id, local_id)
            .await
    }

    #[tracing::instrument(level = "info", skip(self, params))]
    async fn verify<'a>(
        &self,
        params: &'a ParameterList,
    ) -> Result<Message, AssociationProviderError> {
        self.backend_driver.verify(params).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn cleanup(&self) -> Result<usize, AssociationProviderError> {
        self.backend_driver.cleanup().await
    }
}

#[cfg(test)]
mock! {
    pub AssociationProvider {
        pub fn new(
            config: &Config,
            plugin_manager: &PluginManager,
        ) -> Result<Self, AssociationProviderError>;
    }

    #[async_trait]
    impl AssociationApi for AssociationProvider {
        async fn association_response<'a>(
            &self,
            params: &'a ParameterList,
        ) -> Result<Message, AssociationProviderError>;

        async fn auth_response<'a>(
            &self,
            params: &'a ParameterList,
            claimed_id: &'a str,
            local_id: &'a str,
        ) -> Result<Message, AssociationProviderError>;

        async fn verify<'a>(
            &self,
            params: &'a ParameterList,
        ) -> Result<Message, AssociationProviderError>;

        async fn cleanup(&self) -> Result<usize, AssociationProviderError>;
    }

    impl Clone for AssociationProvider {
        fn clone(&self) -> Self;
    }
}
