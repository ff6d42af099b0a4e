// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line host for `davsync`: reads the `[webdavsync]` settings,
//! queues files as if they had just been saved and reports progress.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod cli;
mod cmd_dav;
mod cmd_push;
mod config;

pub use crate::cli::{Cli, Commands, run};
pub use crate::cmd_dav::{CmdDav, DavAction};
pub use crate::cmd_push::CmdPush;
pub use crate::config::{CONFIG_FILE_NAME, DAVSYNC_CONFIG_ENV, parse_config};
