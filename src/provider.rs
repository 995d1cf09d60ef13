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
//! # Provider manager
//!
//! Provider manager provides access to the individual service providers. This
//! gives an easy interact for passing overall manager down to the individual
//! providers that might need to call other providers while also allowing an
//! easy injection of mocked providers.
use derive_builder::Builder;
use mockall_double::double;

use crate::association::AssociationApi;
#[double]
use crate::association::AssociationProvider;
use crate::config::Config;
use crate::directory::DirectoryApi;
#[double]
use crate::directory::DirectoryProvider;
use crate::error::AccountError;
use crate::plugin_manager::PluginManager;

/// Global provider manager.
#[derive(Builder, Clone)]
// It is necessary to use the owned pattern since otherwise builder invokes clone which immediately
// confuses mockall used in tests
#[builder(pattern = "owned")]
pub struct Provider {
    /// Configuration.
    pub config: Config,
    /// Association provider.
    association: AssociationProvider,
    /// Directory provider.
    directory: DirectoryProvider,
}

impl Provider {
    pub fn new(cfg: Config, plugin_manager: PluginManager) -> Result<Self, AccountError> {
        let association_provider = AssociationProvider::new(&cfg, &plugin_manager)?;
        let directory_provider = DirectoryProvider::new(&cfg, &plugin_manager)?;

        Ok(Self {
            config: cfg,
            association: association_provider,
            directory: directory_provider,
        })
    }

    /// Get the association provider.
    pub fn get_association_provider(&self) -> &impl AssociationApi {
        &self.association
    }

    /// Get the directory provider.
    pub fn get_directory_provider(&self) -> &impl DirectoryApi {
        &self.directory
    }
}

#[cfg(test)]
impl Provider {
    pub fn mocked_builder() -> ProviderBuilder {
        let config = Config::default();
        let association_mock = crate::association::MockAssociationProvider::default();
        let directory_mock = crate::directory::MockDirectoryProvider::default();

        ProviderBuilder::default()
            .config(config.clone())
            .association(association_mock)
            .directory(directory_mock)
    }
}
