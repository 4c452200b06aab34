// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types for parameter set construction.
//!
//! Lookups and sets never fail loudly: an unknown name or index, or data sent
//! to a numeric parameter, is a silent no-op. Errors only surface when a set
//! cannot be built at all.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamSetError {
    #[error("Failed to spawn dispatcher thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
