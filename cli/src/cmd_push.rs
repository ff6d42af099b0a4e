// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    error::Error,
    io::{self, Write},
    path::{self, PathBuf},
};

use clap::{ArgMatches, Command, ValueHint, arg, value_parser};
use colored::Colorize;
use davsync_core::{
    Enqueued, STATUS_INTERVAL, StatusLine, SyncContext, TaskOutcome, TaskReport, sync_queue,
};
use tokio::sync::mpsc;

use crate::config::parse_config;

/// Queues files as if they had just been saved and waits for the uploads.
#[derive(Debug, Clone)]
pub struct CmdPush {
    /// Workspace roots, the first one also holds `davsync.toml`.
    pub roots: Vec<PathBuf>,

    /// Files to upload.
    pub files: Vec<PathBuf>,

    /// Number of workers draining the queue.
    pub jobs: u16,
}

impl CmdPush {
    pub const NAME: &str = "push";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Upload files as if they had just been saved")
            .arg(
                arg!(-r --root <ROOT> "Workspace root, may be given several times")
                    .long_help(
                        "\
Workspace root folder. May be given several times; a file is mapped to the remote path under the \
first root that contains it. Defaults to the current directory.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::DirPath)
                    .action(clap::ArgAction::Append),
            )
            .arg(
                arg!(-j --jobs <N> "Number of concurrent workers")
                    .long_help(
                        "\
Number of concurrent workers. Saves for the same server account start in the order they were \
given; different accounts upload in parallel.",
                    )
                    .value_parser(value_parser!(u16).range(1..))
                    .default_value("1"),
            )
            .arg(
                arg!(<FILE>... "Files to upload")
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            roots: matches
                .get_many::<PathBuf>("root")
                .map(|roots| roots.cloned().collect())
                .unwrap_or_default(),
            files: matches
                .get_many::<PathBuf>("FILE")
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
            jobs: matches.get_one::<u16>("jobs").copied().unwrap_or(1),
        }
    }

    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "pushing files...");

        let roots = if self.roots.is_empty() {
            vec![std::env::current_dir()?]
        } else {
            self.roots
                .iter()
                .map(path::absolute)
                .collect::<Result<Vec<_>, _>>()?
        };
        let files = self
            .files
            .iter()
            .map(path::absolute)
            .collect::<Result<Vec<_>, _>>()?;

        let Some(settings) = parse_config(config, &roots).await? else {
            println!(
                "{} no [webdavsync] settings found, nothing to sync",
                "Warning:".yellow()
            );
            return Ok(());
        };

        let context = SyncContext::default();
        let (queue, worker) = sync_queue(context.clone());

        for file in &files {
            match queue.enqueue(Some(&settings), file, &roots) {
                Ok(Enqueued::Queued) => tracing::debug!(file = %file.display(), "queued"),
                Ok(Enqueued::OutsideRoots) => {
                    println!("{} {} is outside every root", "Skipped:".yellow(), file.display());
                }
                Ok(Enqueued::NotConfigured) => {
                    println!(
                        "{} incomplete [webdavsync] settings, nothing to sync",
                        "Warning:".yellow()
                    );
                    break;
                }
                Err(e) => println!("{} {}: {}", "Error:".red(), file.display(), e),
            }
        }
        drop(queue);

        // queue everything first so the whole push is one batch
        let (tx, mut reports) = mpsc::unbounded_channel();
        let worker = worker.with_reports(tx);
        let handles: Vec<_> = (0..self.jobs).map(|_| worker.clone().spawn()).collect();
        drop(worker);

        let mut status = StatusLine::new();
        let mut ticker = tokio::time::interval(STATUS_INTERVAL);
        let idle = context.counter.wait_idle();
        tokio::pin!(idle);
        let mut stdout = io::stdout();
        loop {
            tokio::select! {
                () = &mut idle => break,
                _ = ticker.tick() => {
                    write!(stdout, "\r{}", status.render(context.counter.snapshot()))?;
                    stdout.flush()?;
                }
            }
        }

        for handle in handles {
            handle.await?;
        }
        writeln!(stdout, "\r{}", status.render(context.counter.snapshot()))?;

        while let Some(report) = reports.recv().await {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &TaskReport) {
    let file = report.file.display();
    match &report.outcome {
        TaskOutcome::Uploaded { url, status } => {
            println!("{} {file} -> {url} ({status})", "Uploaded:".green());
        }
        TaskOutcome::Skipped(reason) => {
            println!("{} {file} ({reason:?})", "Skipped:".yellow());
        }
        TaskOutcome::Failed(e) => println!("{} {file}: {e}", "Failed:".red()),
    }
}
