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
//! # Plugin manager
//!
//! A driver, also known as a backend, is an abstraction around the external
//! systems a subsystem talks to: the association store of the OpenID
//! provider and the user directory. The [PluginManager] is responsible for
//! picking the proper backend driver for the provider, letting deployments
//! plug in custom implementations at service start.
use std::collections::HashMap;

use crate::association::backend::AssociationBackend;
use crate::directory::backend::DirectoryBackend;

/// Plugin manager allowing to pass custom backend plugins implementing required
/// trait during the service start.
#[derive(Clone, Default)]
pub struct PluginManager {
    /// Association backend plugins.
    association_backends: HashMap<String, Box<dyn AssociationBackend>>,
    /// Directory backend plugins.
    directory_backends: HashMap<String, Box<dyn DirectoryBackend>>,
}

impl PluginManager {
    /// Register association backend.
    pub fn register_association_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn AssociationBackend>,
    ) {
        self.association_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Register directory backend.
    pub fn register_directory_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn DirectoryBackend>,
    ) {
        self.directory_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Get registered association backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_association_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Box<dyn AssociationBackend>> {
        self.association_backends.get(name.as_ref())
    }

    /// Get registered directory backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_directory_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Box<dyn DirectoryBackend>> {
        self.directory_backends.get(name.as_ref())
    }
}
