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

use async_trait::async_trait;
use dyn_clone::DynClone;
use secrecy::SecretString;

use super::error::DirectoryProviderError;
use super::types::Profile;
use crate::config::Config;

pub mod ldap;

pub use ldap::LdapBackend;

/// User directory driver interface.
#[async_trait]
pub trait DirectoryBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config
    fn set_config(&mut self, config: Config);

    /// Verify the user's credentials and return the profile.
    async fn authenticate(
        &self,
        user_id: &str,
        password: &SecretString,
    ) -> Result<Profile, DirectoryProviderError>;
}

dyn_clone::clone_trait_object!(DirectoryBackend);
