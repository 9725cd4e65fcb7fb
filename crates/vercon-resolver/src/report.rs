//! Plain-text rendering of a [`Diagnostic`].

use std::fmt;

use vercon_core::config::ReportConfig;

use crate::conflict::{Blame, Diagnostic, Problem};

/// Renders a diagnostic as indented text using a [`ReportConfig`].
pub struct TextReport<'a> {
    diagnostic: &'a Diagnostic,
    config: &'a ReportConfig,
}

impl<'a> TextReport<'a> {
    pub fn new(diagnostic: &'a Diagnostic, config: &'a ReportConfig) -> Self {
        Self { diagnostic, config }
    }

    fn pad(&self, level: usize) -> String {
        " ".repeat(self.config.indent * level)
    }

    fn blame(&self, blame: &Blame) -> String {
        let referrers: Vec<String> = blame.referrers.iter().map(ToString::to_string).collect();
        format!(
            "{} (required by {})",
            blame.range,
            referrers.join(self.config.separator.as_str())
        )
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let package = &self.diagnostic.package;
        match &self.diagnostic.problem {
            Problem::Consistent => writeln!(f, "No version conflicts for {package}."),
            Problem::NoCommonVersion { groups } => {
                writeln!(f, "No version of {package} satisfies every requirement:")?;
                if groups.is_empty() {
                    writeln!(
                        f,
                        "{}the requirements conflict only as a group",
                        self.pad(1)
                    )?;
                }
                for group in groups {
                    writeln!(f, "{}{}", self.pad(1), self.blame(&group.blame))?;
                    for other in &group.conflicts_with {
                        writeln!(f, "{}conflicts with {}", self.pad(2), self.blame(other))?;
                    }
                }
                Ok(())
            }
            Problem::Rejected {
                candidate,
                excluded_by,
            } => {
                writeln!(f, "{package} {candidate} is excluded by:")?;
                for blame in excluded_by {
                    writeln!(f, "{}{}", self.pad(1), self.blame(blame))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", TextReport::new(self, &ReportConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::DisjointGroup;
    use crate::version::{Version, VersionId, VersionRange};

    fn id(name: &str) -> VersionId {
        VersionId::new(name, Version::new(1, 0, 0))
    }

    fn r(text: &str) -> VersionRange {
        VersionRange::parse(text).unwrap()
    }

    #[test]
    fn consistent_report() {
        let d = Diagnostic::consistent("lib");
        assert_eq!(d.to_string(), "No version conflicts for lib.\n");
    }

    #[test]
    fn rejected_report() {
        let d = Diagnostic {
            package: "lib".to_string(),
            problem: Problem::Rejected {
                candidate: Version::new(2, 5, 0),
                excluded_by: vec![Blame {
                    range: r("[1.0.0,2.0.0)"),
                    referrers: vec![id("x"), id("y")],
                }],
            },
        };
        assert_eq!(
            d.to_string(),
            "lib 2.5.0 is excluded by:\n  1.0.0 <= v < 2.0.0 (required by x 1.0.0, y 1.0.0)\n"
        );
    }

    #[test]
    fn disjoint_report_uses_config() {
        let d = Diagnostic {
            package: "lib".to_string(),
            problem: Problem::NoCommonVersion {
                groups: vec![DisjointGroup {
                    blame: Blame {
                        range: r("[1.0.0,2.0.0)"),
                        referrers: vec![id("x")],
                    },
                    conflicts_with: vec![Blame {
                        range: r("[2.0.0,3.0.0)"),
                        referrers: vec![id("y"), id("z")],
                    }],
                }],
            },
        };
        let config = ReportConfig {
            separator: " | ".to_string(),
            indent: 4,
        };
        let text = TextReport::new(&d, &config).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "No version of lib satisfies every requirement:");
        assert_eq!(lines[1], "    1.0.0 <= v < 2.0.0 (required by x 1.0.0)");
        assert_eq!(
            lines[2],
            "        conflicts with 2.0.0 <= v < 3.0.0 (required by y 1.0.0 | z 1.0.0)"
        );
    }
}
