//! Handler for `vercon explain`.

use std::path::Path;

use miette::Result;
use vercon_core::config::ReportConfig;
use vercon_core::scenario::Scenario;
use vercon_resolver::conflict::explain;
use vercon_resolver::graph::DependencyGraph;
use vercon_resolver::provenance::ProvenanceRange;
use vercon_resolver::report::TextReport;
use vercon_resolver::version::Version;
use vercon_util::errors::VerconError;

use crate::cli::OutputFormat;

pub fn exec(
    scenario_path: &Path,
    package: &str,
    candidate: Option<&str>,
    format: OutputFormat,
    report: &ReportConfig,
) -> Result<()> {
    let scenario = Scenario::from_path(scenario_path)?;
    if !scenario.knows(package) {
        return Err(VerconError::FetchPackage {
            package: package.to_string(),
        }
        .into());
    }
    let graph = DependencyGraph::from_scenario(&scenario)?;

    let candidate = match candidate {
        Some(text) => Some(Version::parse(text)?),
        None => graph.find(package).map(|idx| graph.node(idx).version),
    };
    if let Some(version) = candidate {
        if !scenario.is_available(package, &version.to_string()) {
            return Err(VerconError::FetchVersion {
                package: package.to_string(),
                version: version.to_string(),
            }
            .into());
        }
    }

    let range = ProvenanceRange::from_edges(graph.constraints_on(package));
    let diagnostic = explain(&graph.reverse_depends(), package, candidate, &range)?;

    match format {
        OutputFormat::Text => print!("{}", TextReport::new(&diagnostic, report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&diagnostic).map_err(|e| {
                VerconError::Generic {
                    message: format!("Failed to serialize diagnostic: {e}"),
                }
            })?;
            println!("{json}");
        }
    }

    if diagnostic.is_consistent() {
        Ok(())
    } else {
        Err(VerconError::Resolution {
            message: format!("no acceptable version of {package}"),
        }
        .into())
    }
}
