//! `hwgraph build`: netlist in, layout JSON out.

use crate::pipeline::{build_schematic, emit, load_config, load_netlist, merge_settings};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `hwgraph build` command.
///
/// Returns exit code 0 once the JSON has been written.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let settings = merge_settings(&config, &args.graph, Some(&args.output));
    let netlist = load_netlist(&args.graph.netlist)?;
    let schematic = build_schematic(&netlist, &settings, global)?;
    emit(&schematic, &settings, &args.output)?;

    if !global.quiet {
        let stats = schematic.stats()?;
        eprintln!(
            "   Built {} node(s), {} port(s), {} edge(s)",
            stats.nodes, stats.ports, stats.edges
        );
    }
    Ok(0)
}
