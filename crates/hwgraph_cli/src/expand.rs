//! `hwgraph expand`: load one more level below an instance of a depth-limited build.

use crate::pipeline::{
    build_schematic, emit, load_config, load_netlist, merge_settings, parse_instance_path,
};
use crate::{ExpandArgs, GlobalArgs};

/// Runs the `hwgraph expand` command.
///
/// Builds the graph with the effective depth limit, loads the internals of
/// the instance at `--path` and writes the result. Fails if the path names
/// no module instance.
pub fn run(args: &ExpandArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = parse_instance_path(&args.path)?;
    let config = load_config(global)?;
    let settings = merge_settings(&config, &args.graph, Some(&args.output));
    let netlist = load_netlist(&args.graph.netlist)?;
    let mut schematic = build_schematic(&netlist, &settings, global)?;

    let Some(node) = schematic.load_subtree_by_path(&netlist, &path)? else {
        return Err(format!("'{}' does not name a module instance", args.path).into());
    };
    emit(&schematic, &settings, &args.output)?;

    if !global.quiet {
        let name = schematic
            .builder(node)
            .map(|b| b.instance.as_str())
            .unwrap_or_default();
        eprintln!("   Expanded {name} (node {node})");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use crate::{GraphArgs, OutputArgs};

    fn args(netlist: String, path: &str, output: String) -> ExpandArgs {
        ExpandArgs {
            graph: GraphArgs {
                netlist,
                depth: Some(2),
                ..GraphArgs::default()
            },
            path: path.to_string(),
            output: OutputArgs {
                output: Some(output),
                ..OutputArgs::default()
            },
        }
    }

    #[test]
    fn expands_a_stub_instance() {
        let dir = tempfile::tempdir().unwrap();
        let (global, netlist) = fixtures::project(dir.path());
        let out = dir.path().join("graph.json");
        let code = run(&args(netlist, "soc.u_core", out.display().to_string()), &global).unwrap();
        assert_eq!(code, 0);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let core = &json["children"][0]["children"][0];
        assert_eq!(core["hwMeta"]["name"], "u_core");
        assert_eq!(core["children"][0]["hwMeta"]["name"], "NOT");
    }

    #[test]
    fn unknown_instance_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (global, netlist) = fixtures::project(dir.path());
        let out = dir.path().join("graph.json");
        let err = run(&args(netlist, "soc.u_gpu", out.display().to_string()), &global).unwrap_err();
        assert!(err.to_string().contains("soc.u_gpu"));
        assert!(!out.exists());
    }

    #[test]
    fn malformed_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (global, netlist) = fixtures::project(dir.path());
        let out = dir.path().join("graph.json");
        assert!(run(&args(netlist, "soc.", out.display().to_string()), &global).is_err());
    }
}
