//! Handler for `vercon why`.

use std::path::Path;

use miette::Result;
use vercon_core::scenario::Scenario;
use vercon_resolver::graph::DependencyGraph;

pub fn exec(scenario_path: &Path, package: &str) -> Result<()> {
    let scenario = Scenario::from_path(scenario_path)?;
    let graph = DependencyGraph::from_scenario(&scenario)?;

    if let Some(path) = graph.find_path(package) {
        println!("Path to {package}:");
        for (i, node) in path.iter().enumerate() {
            let indent = "  ".repeat(i);
            println!("{indent}{node}");
        }
    } else {
        println!("Dependency '{package}' not found in the graph.");
    }
    Ok(())
}
