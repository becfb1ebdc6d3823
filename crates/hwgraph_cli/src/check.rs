//! `hwgraph check`: build, validate and report statistics.

use hwgraph_graph::GraphStats;

use crate::pipeline::{build_schematic, load_config, load_netlist, merge_settings};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `hwgraph check` command.
///
/// Returns exit code 0 if the graph passes the invariant checks, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let settings = merge_settings(&config, &args.graph, None);
    let netlist = load_netlist(&args.graph.netlist)?;
    let schematic = build_schematic(&netlist, &settings, global)?;
    let stats = schematic.stats()?;
    let verdict = schematic.validate();

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                println!("{}", render_text(&stats, schematic.warnings().len()));
            }
            if let Err(ref e) = verdict {
                eprintln!("error: {e}");
            }
        }
        ReportFormat::Json => {
            let report = serde_json::json!({
                "nodes": stats.nodes,
                "ports": stats.ports,
                "edges": stats.edges,
                "maxId": stats.max_id,
                "warnings": schematic.warnings().iter().map(|w| w.to_string()).collect::<Vec<_>>(),
                "valid": verdict.is_ok(),
                "error": verdict.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(if verdict.is_ok() { 0 } else { 1 })
}

fn render_text(stats: &GraphStats, warnings: usize) -> String {
    format!(
        "   Nodes: {}\n   Ports: {}\n   Edges: {}\n  Max id: {}\nWarnings: {}",
        stats.nodes, stats.ports, stats.edges, stats.max_id, warnings
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use crate::GraphArgs;

    #[test]
    fn valid_design_passes() {
        let dir = tempfile::tempdir().unwrap();
        let (global, netlist) = fixtures::project(dir.path());
        let args = CheckArgs {
            graph: GraphArgs {
                netlist,
                ..GraphArgs::default()
            },
            format: ReportFormat::Json,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
    }

    #[test]
    fn build_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let (global, _) = fixtures::project(dir.path());
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{\"modules\": {}}").unwrap();
        let args = CheckArgs {
            graph: GraphArgs {
                netlist: broken.display().to_string(),
                ..GraphArgs::default()
            },
            format: ReportFormat::Text,
        };
        assert!(run(&args, &global).is_err());
    }

    #[test]
    fn text_report_lists_counts() {
        let stats = GraphStats {
            nodes: 4,
            ports: 7,
            edges: 3,
            max_id: 13,
        };
        let text = render_text(&stats, 1);
        assert!(text.contains("Nodes: 4"));
        assert!(text.contains("Edges: 3"));
        assert!(text.contains("Max id: 13"));
        assert!(text.contains("Warnings: 1"));
    }
}
