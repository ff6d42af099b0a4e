// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, value_parser};
use colored::Colorize;
use davsync_core::SyncSettings;
use davsync_webdav::{DavError, DavResponse, Depth, StatusCode, WebDavClient};

use crate::config::parse_config;

const ALLPROP_BODY: &str =
    r#"<?xml version="1.0" encoding="utf-8" ?><D:propfind xmlns:D="DAV:"><D:allprop/></D:propfind>"#;

/// Raw `WebDAV` operations against the configured server.
///
/// Relative remote paths are taken relative to the configured `path`.
#[derive(Debug, Clone)]
pub struct CmdDav {
    pub action: DavAction,
}

/// The operation to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DavAction {
    /// PROPFIND with depth 1 and list the members.
    List { path: String },
    /// MKCOL.
    Mkdir { path: String },
    /// PUT a local file.
    Put {
        local: PathBuf,
        remote: Option<String>,
    },
    /// GET and print the body.
    Get { path: String },
    /// DELETE.
    Remove { path: String },
    /// MOVE.
    Move { src: String, dst: String },
    /// COPY.
    Copy { src: String, dst: String },
}

impl CmdDav {
    pub const NAME: &str = "dav";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Run a single WebDAV request against the configured server")
            .arg_required_else_help(true)
            .subcommand_required(true)
            .subcommand(
                Command::new("ls")
                    .about("List a collection")
                    .arg(arg!([PATH] "Remote path, defaults to the base path")),
            )
            .subcommand(
                Command::new("mkdir")
                    .about("Create a collection")
                    .arg(arg!(<PATH> "Remote path")),
            )
            .subcommand(
                Command::new("put")
                    .about("Upload a local file")
                    .arg(
                        arg!(<LOCAL> "Local file")
                            .value_parser(value_parser!(PathBuf))
                            .value_hint(ValueHint::FilePath),
                    )
                    .arg(arg!([REMOTE] "Remote path, defaults to the file name")),
            )
            .subcommand(
                Command::new("get")
                    .about("Print a remote file")
                    .arg(arg!(<PATH> "Remote path")),
            )
            .subcommand(
                Command::new("rm")
                    .about("Delete a remote resource")
                    .arg(arg!(<PATH> "Remote path")),
            )
            .subcommand(
                Command::new("mv")
                    .about("Move a remote resource")
                    .arg(arg!(<SRC> "Source path"))
                    .arg(arg!(<DST> "Destination path")),
            )
            .subcommand(
                Command::new("cp")
                    .about("Copy a remote resource")
                    .arg(arg!(<SRC> "Source path"))
                    .arg(arg!(<DST> "Destination path")),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        let string = |m: &ArgMatches, id: &str| -> String {
            m.get_one::<String>(id).cloned().unwrap_or_default()
        };

        let action = match matches.subcommand() {
            Some(("ls", m)) => DavAction::List {
                path: string(m, "PATH"),
            },
            Some(("mkdir", m)) => DavAction::Mkdir {
                path: string(m, "PATH"),
            },
            Some(("put", m)) => DavAction::Put {
                local: m.get_one::<PathBuf>("LOCAL").cloned().unwrap_or_default(),
                remote: m.get_one::<String>("REMOTE").cloned(),
            },
            Some(("get", m)) => DavAction::Get {
                path: string(m, "PATH"),
            },
            Some(("rm", m)) => DavAction::Remove {
                path: string(m, "PATH"),
            },
            Some(("mv", m)) => DavAction::Move {
                src: string(m, "SRC"),
                dst: string(m, "DST"),
            },
            Some(("cp", m)) => DavAction::Copy {
                src: string(m, "SRC"),
                dst: string(m, "DST"),
            },
            _ => unreachable!(),
        };
        Self { action }
    }

    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "running webdav request...");

        let roots = vec![std::env::current_dir()?];
        let settings = parse_config(config, &roots).await?;
        let target = settings
            .as_ref()
            .and_then(SyncSettings::target)
            .ok_or("No complete [webdavsync] settings found")?;
        let base = target.remote_base_path.clone();
        let mut client = WebDavClient::new(target.dav_config())?;

        let at = |path: &str| remote_path(&base, path);
        match self.action {
            DavAction::List { path } => {
                let resp = client
                    .propfind(&at(&path), Some(Depth::One), Some(ALLPROP_BODY))
                    .await?;
                print_status(&resp, &at(&path));
                for line in listing(&resp)? {
                    println!("{line}");
                }
            }
            DavAction::Mkdir { path } => {
                let resp = client.mkcol(&at(&path)).await?;
                print_status(&resp, &at(&path));
            }
            DavAction::Put { local, remote } => {
                let remote = match remote {
                    Some(remote) => remote,
                    None => local
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .ok_or_else(|| format!("No file name in {}", local.display()))?,
                };
                let content = tokio::fs::read(&local)
                    .await
                    .map_err(|e| format!("Failed to read {}: {e}", local.display()))?;
                let resp = client.put(&at(&remote), content, None).await?;
                print_status(&resp, &at(&remote));
            }
            DavAction::Get { path } => {
                let resp = client.get(&at(&path)).await?;
                if resp.is_success() {
                    print!("{}", resp.text());
                } else {
                    print_status(&resp, &at(&path));
                }
            }
            DavAction::Remove { path } => {
                let resp = client.delete(&at(&path)).await?;
                print_status(&resp, &at(&path));
            }
            DavAction::Move { src, dst } => {
                let resp = client.r#move(&at(&src), &at(&dst)).await?;
                print_status(&resp, &at(&src));
            }
            DavAction::Copy { src, dst } => {
                let resp = client.copy(&at(&src), &at(&dst), None).await?;
                print_status(&resp, &at(&src));
            }
        }
        Ok(())
    }
}

fn print_status(resp: &DavResponse, path: &str) {
    let status = resp.status().to_string();
    let status = if resp.is_success() {
        status.green()
    } else {
        status.red()
    };
    println!("{status} {path}");
}

/// Formats the members of a 207 PROPFIND response, one per line.
fn listing(resp: &DavResponse) -> Result<Vec<String>, DavError> {
    if resp.status() != StatusCode::MULTI_STATUS {
        return Ok(Vec::new());
    }
    let lines = resp
        .multistatus()?
        .responses
        .into_iter()
        .map(|item| {
            let kind = if item.is_collection { "d" } else { "-" };
            let size = item
                .content_length
                .map_or_else(String::new, |n| n.to_string());
            format!("{kind} {size:>10} {}", item.href)
        })
        .collect();
    Ok(lines)
}

/// Resolves `path` against the configured remote base path.
fn remote_path(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}
