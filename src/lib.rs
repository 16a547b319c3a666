/*
 * Copyright 2026 Registry Mock Team
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Renders specs stored in an API registry as documentation and serves them
//! as live mock endpoints.

pub mod cache;
pub mod config;
pub mod error;
pub mod mock;
pub mod registry;
pub mod server;
pub mod spec;
pub mod telemetry;
/// In-memory registry used by the test suites.
#[doc(hidden)]
pub mod testing;
pub mod utils;

pub use error::{Error, Result};
