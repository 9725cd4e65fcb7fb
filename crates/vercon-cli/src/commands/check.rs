//! Handler for `vercon check`.

use std::path::Path;

use miette::Result;
use vercon_core::config::ReportConfig;
use vercon_core::scenario::Scenario;
use vercon_resolver::conflict::explain;
use vercon_resolver::graph::DependencyGraph;
use vercon_resolver::report::TextReport;
use vercon_resolver::state::{DependencyKind, Directness, PackageState};
use vercon_resolver::version::Version;
use vercon_util::errors::VerconError;

pub fn exec(scenario_path: &Path, report: &ReportConfig) -> Result<()> {
    let scenario = Scenario::from_path(scenario_path)?;
    let graph = DependencyGraph::from_scenario(&scenario)?;
    let reverse = graph.reverse_depends();

    let mut failed = Vec::new();
    for package in scenario.packages() {
        if package == scenario.root {
            continue;
        }
        let locked = scenario
            .lock
            .get(package)
            .map(|v| Version::parse(v))
            .transpose()?;

        let mut state = graph.initial_state(package, locked);
        for (referrer, range) in graph.constraints_on(package) {
            state = state.constrain(referrer, range)?;
        }
        let Some(constraint) = state.constraint() else {
            return Err(VerconError::internal(
                501,
                format!("{package} was solved before its constraints were checked"),
            )
            .into());
        };

        let candidate = graph.find(package).map(|idx| graph.node(idx).version);
        if let Some(version) = candidate {
            if !scenario.is_available(package, &version.to_string()) {
                return Err(VerconError::FetchVersion {
                    package: package.to_string(),
                    version: version.to_string(),
                }
                .into());
            }
        }

        let diagnostic = explain(&reverse, package, candidate, constraint)?;
        if !diagnostic.is_consistent() {
            print!("{}", TextReport::new(&diagnostic, report));
            failed.push(package.to_string());
            continue;
        }
        let current = constraint.current().to_string();

        if let Some(version) = candidate {
            state = state.solve(version)?.ok_or_else(|| {
                VerconError::internal(
                    502,
                    format!("{package} {version} passed explanation but failed to solve"),
                )
            })?;
        }
        match state.version() {
            Some(version) => println!("ok      {package} {version} ({})", describe(&state)),
            None => println!("open    {package} {current} ({})", describe(&state)),
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(VerconError::Resolution {
            message: format!("conflicting requirements on {}", failed.join(", ")),
        }
        .into())
    }
}

fn describe(state: &PackageState) -> String {
    let mut parts = vec![
        match state.directness() {
            Directness::Direct => "direct",
            Directness::Indirect => "indirect",
        },
        match state.kind() {
            DependencyKind::Normal => "normal",
            DependencyKind::Test => "test",
        },
    ];
    match state {
        PackageState::Solved {
            matches_lock: true, ..
        } => parts.push("locked"),
        PackageState::Unsolved {
            locked: Some(_), ..
        } => parts.push("lock pending"),
        _ => {}
    }
    parts.join(", ")
}
