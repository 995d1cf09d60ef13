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
//! # OpenID 2.0 provider engine
//!
//! The protocol core: per-session conversation state, the mode dispatcher
//! and the attribute exchange responder. The engine is transport-agnostic;
//! rendering its results onto HTTP lives in the API layer.
pub mod attribute_exchange;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod types;

pub use dispatcher::{ProtocolResult, handle};
