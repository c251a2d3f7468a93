//! Platform constraints accumulated during one assembly run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single timing or tool constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Constraint {
    /// Clock period on an input net.
    Period {
        /// Net the clock enters on.
        net: String,
        /// Period in nanoseconds.
        period_ns: f64,
    },
    /// Paths between two clock nets that timing analysis must ignore.
    FalsePath {
        from: String,
        to: String,
        /// Why the exception exists.
        reason: String,
    },
    /// Raw tool command, passed through verbatim.
    Command { text: String },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Period { net, period_ns } => write!(f, "period {net} = {period_ns:.3} ns"),
            Constraint::FalsePath { from, to, reason } => {
                write!(f, "false path {from} -> {to} ({reason})")
            }
            Constraint::Command { text } => write!(f, "command: {text}"),
        }
    }
}

/// Ordered collection of constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    entries: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a period constraint derived from a frequency in Hz.
    pub fn add_period(&mut self, net: impl Into<String>, frequency_hz: u64) {
        let period_ns = 1e9 / frequency_hz as f64;
        self.entries.push(Constraint::Period {
            net: net.into(),
            period_ns,
        });
    }

    pub fn add_false_path(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.entries.push(Constraint::FalsePath {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        });
    }

    /// Add a raw command; identical commands are only recorded once.
    pub fn add_command(&mut self, text: impl Into<String>) {
        let text = text.into();
        let exists = self
            .entries
            .iter()
            .any(|c| matches!(c, Constraint::Command { text: t } if *t == text));
        if !exists {
            self.entries.push(Constraint::Command { text });
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All false-path constraints.
    pub fn false_paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|c| match c {
            Constraint::FalsePath { from, to, .. } => Some((from.as_str(), to.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_from_frequency() {
        let mut set = ConstraintSet::new();
        set.add_period("clk200_p", 200_000_000);
        match set.iter().next().unwrap() {
            Constraint::Period { net, period_ns } => {
                assert_eq!(net, "clk200_p");
                assert!((period_ns - 5.0).abs() < 1e-9);
            }
            other => panic!("unexpected constraint {other}"),
        };
    }

    #[test]
    fn commands_are_deduplicated() {
        let mut set = ConstraintSet::new();
        set.add_command("set_property SEVERITY {Warning} [get_drc_checks REQP-49]");
        set.add_command("set_property SEVERITY {Warning} [get_drc_checks REQP-49]");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn false_paths_filter() {
        let mut set = ConstraintSet::new();
        set.add_period("clk200_p", 200_000_000);
        set.add_false_path("sys_clk", "clk200_se", "reset fan-out");
        let paths: Vec<_> = set.false_paths().collect();
        assert_eq!(paths, vec![("sys_clk", "clk200_se")]);
    }
}
