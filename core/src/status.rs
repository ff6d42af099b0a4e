// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use crate::counter::WorkCounts;

/// How often a host should refresh the status line while syncing.
pub const STATUS_INTERVAL: Duration = Duration::from_millis(200);

const LABEL: &str = "WebDavSync";
const WIDTH: usize = 8;

/// Status line shown while tasks are pending: a marker bouncing inside
/// brackets, then a final message once the counter reaches zero.
#[derive(Debug, Clone, Copy)]
pub struct StatusLine {
    step: usize,
    forward: bool,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLine {
    /// Creates a status line at the left edge.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: 0,
            forward: true,
        }
    }

    /// Renders the line for `counts` and advances the animation.
    pub fn render(&mut self, counts: WorkCounts) -> String {
        if counts.pending == 0 {
            *self = Self::new();
            return match counts.failed {
                0 => format!("{LABEL} finished successfully"),
                n => format!("{LABEL} finished with {n} failed upload(s)"),
            };
        }

        let before = self.step % WIDTH;
        let after = WIDTH - 1 - before;
        if after == 0 {
            self.forward = false;
        }
        if before == 0 {
            self.forward = true;
        }
        self.step = if self.forward {
            self.step + 1
        } else {
            self.step.saturating_sub(1)
        };

        format!("{LABEL} [{}..{}]", " ".repeat(before), " ".repeat(after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUSY: WorkCounts = WorkCounts {
        pending: 1,
        failed: 0,
    };

    #[test]
    fn marker_bounces_between_edges() {
        let mut line = StatusLine::new();
        let frames: Vec<String> = (0..16).map(|_| line.render(BUSY)).collect();

        assert_eq!(frames[0], "WebDavSync [..       ]");
        assert_eq!(frames[7], "WebDavSync [       ..]");
        assert_eq!(frames[8], "WebDavSync [      .. ]");
        assert_eq!(frames[14], "WebDavSync [..       ]");
        assert_eq!(frames[15], "WebDavSync [ ..      ]");
    }

    #[test]
    fn idle_messages() {
        let mut line = StatusLine::new();
        assert_eq!(
            line.render(WorkCounts::default()),
            "WebDavSync finished successfully"
        );
        assert_eq!(
            line.render(WorkCounts {
                pending: 0,
                failed: 2
            }),
            "WebDavSync finished with 2 failed upload(s)"
        );
    }
}
