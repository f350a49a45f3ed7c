//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization, and the table rows the binary
//! prints.

use tabled::Tabled;

use crate::docs::CratePage;
use crate::mock_server::RouteRule;
use crate::{Crate, Version};

/// Trait for human-readable key-value output.
///
/// Implemented by types the binary shows when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Crate {
    fn pretty_print(&self) -> String {
        let divider = "─".repeat(self.name.len().max(30));

        let mut lines = vec![format!("Crate: {}", self.name), divider];

        if let Some(ref description) = self.description {
            lines.push(format!("Description:    {}", description));
        }

        if let Some(ref max_version) = self.max_version {
            lines.push(format!("Max Version:    {}", max_version));
        }

        lines.push(format!(
            "Downloads:      {} ({} recent)",
            self.downloads, self.recent_downloads
        ));

        if let Some(ref repository) = self.repository {
            lines.push(format!("Repository:     {}", repository));
        }

        if !self.keywords.is_empty() {
            lines.push(format!("Keywords:       {}", self.keywords.join(", ")));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for CratePage {
    /// Shows the documentation link as it is right now; settle the probe
    /// first for the final link.
    fn pretty_print(&self) -> String {
        let mut lines = vec![self.krate.pretty_print()];

        if let Some(ref version) = self.version {
            lines.push(format!("Showing:        {}", version));
        }

        match self.documentation_link() {
            Some(link) => lines.push(format!("Documentation:  {}", link)),
            None => lines.push("Documentation:  none".to_string()),
        }

        lines.join("\n")
    }
}

/// Table row for a route rule.
#[derive(Debug, Tabled)]
pub struct RouteRow {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "Method")]
    pub method: String,
    #[tabled(rename = "Pattern")]
    pub pattern: String,
    #[tabled(rename = "Action")]
    pub action: &'static str,
}

impl RouteRow {
    /// Row for the rule at `position` (1-indexed).
    pub fn new(position: usize, rule: &RouteRule) -> Self {
        Self {
            position,
            method: rule
                .method
                .as_ref()
                .map_or_else(|| "*".to_string(), ToString::to_string),
            pattern: rule.pattern.to_string(),
            action: if rule.is_passthrough() {
                "passthrough"
            } else {
                "respond"
            },
        }
    }
}

/// Table row for a version.
#[derive(Debug, Tabled)]
pub struct VersionRow {
    #[tabled(rename = "Version")]
    pub num: String,
    #[tabled(rename = "Yanked")]
    pub yanked: bool,
    #[tabled(rename = "Downloads")]
    pub downloads: u64,
    #[tabled(rename = "License")]
    pub license: String,
}

impl From<&Version> for VersionRow {
    fn from(version: &Version) -> Self {
        Self {
            num: version.num.clone(),
            yanked: version.yanked,
            downloads: version.downloads,
            license: version.license.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}
