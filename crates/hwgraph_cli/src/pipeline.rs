//! Shared pipeline helpers for CLI commands.
//!
//! Contains the steps every command runs: project root resolution,
//! configuration loading, merging flags over configuration, netlist
//! loading, the build itself and writing the output.

use std::path::{Path, PathBuf};

use hwgraph_build::{BuildOptions, Schematic};
use hwgraph_config::{HwgraphConfig, CONFIG_FILE_NAME};
use hwgraph_netlist::Netlist;
use tracing::debug;

use crate::{GlobalArgs, GraphArgs, OutputArgs};

/// Effective settings after flags have been applied over `hwgraph.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Options handed to the graph builder.
    pub build: BuildOptions,
    /// Indent the JSON output.
    pub pretty: bool,
    /// Run the invariant checks after building.
    pub validate: bool,
}

/// Walks up from `start` looking for the nearest directory containing `hwgraph.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolves the directory holding the configuration.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself). Otherwise walks up from the current directory looking for
/// `hwgraph.toml`, falling back to the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        let cwd = std::env::current_dir()?;
        Ok(find_project_root(&cwd).unwrap_or(cwd))
    }
}

/// Loads the configuration for this invocation.
///
/// An explicit `--config` must point at an existing file; otherwise a
/// missing `hwgraph.toml` yields the defaults.
pub fn load_config(global: &GlobalArgs) -> Result<HwgraphConfig, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = if global.config.is_some() {
        hwgraph_config::load_config(&project_dir)?
    } else {
        hwgraph_config::load_config_or_default(&project_dir)?
    };
    debug!(dir = %project_dir.display(), "configuration loaded");
    Ok(config)
}

/// Applies command-line flags over the configuration.
pub fn merge_settings(config: &HwgraphConfig, graph: &GraphArgs, output: Option<&OutputArgs>) -> Settings {
    let build = BuildOptions {
        depth_limit: graph.depth.or(config.build.depth_limit),
        suffix_policy: graph.suffix.unwrap_or(config.build.suffix_policy),
        top: graph.top.clone().or_else(|| config.build.top.clone()),
    };
    let (compact, no_validate) = output.map_or((false, false), |o| (o.compact, o.no_validate));
    Settings {
        build,
        pretty: config.output.pretty && !compact,
        validate: config.output.validate && !no_validate,
    }
}

/// Reads the netlist named on the command line.
pub fn load_netlist(path: &str) -> Result<Netlist, Box<dyn std::error::Error>> {
    let netlist = hwgraph_netlist::load_netlist(Path::new(path))?;
    debug!(path, modules = netlist.modules.len(), "netlist loaded");
    Ok(netlist)
}

/// Builds the schematic and reports its warnings on stderr.
pub fn build_schematic(
    netlist: &Netlist,
    settings: &Settings,
    global: &GlobalArgs,
) -> Result<Schematic, Box<dyn std::error::Error>> {
    let schematic = Schematic::build(netlist, &settings.build)?;
    if !global.quiet {
        for warning in schematic.warnings() {
            eprintln!("warning: {warning}");
        }
    }
    Ok(schematic)
}

/// Splits a dot-separated instance path.
pub fn parse_instance_path(path: &str) -> Result<Vec<&str>, Box<dyn std::error::Error>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(format!("invalid instance path '{path}'").into());
    }
    Ok(segments)
}

/// Validates if requested, then writes the JSON to the output file or stdout.
pub fn emit(
    schematic: &Schematic,
    settings: &Settings,
    output: &OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if settings.validate {
        schematic.validate()?;
    }
    let json = schematic.to_json(settings.pretty)?;
    match output.output {
        Some(ref path) => std::fs::write(path, format!("{json}\n"))?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwgraph_common::SuffixPolicy;

    fn global(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config,
        }
    }

    fn graph_args() -> GraphArgs {
        GraphArgs {
            netlist: "design.json".to_string(),
            ..GraphArgs::default()
        }
    }

    #[test]
    fn find_project_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested).as_deref(), Some(dir.path()));
    }

    #[test]
    fn resolve_root_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file, "").unwrap();
        let root = resolve_project_root(&global(Some(file.display().to_string()))).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn resolve_root_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = resolve_project_root(&global(Some(dir.path().display().to_string()))).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&global(Some(dir.path().display().to_string())));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[build]\ndepth_limit = 4\n").unwrap();
        let config = load_config(&global(Some(dir.path().display().to_string()))).unwrap();
        assert_eq!(config.build.depth_limit, Some(4));
    }

    #[test]
    fn config_values_apply_without_flags() {
        let config = hwgraph_config::load_config_from_str(
            "[build]\ndepth_limit = 3\nsuffix_policy = \"io-insensitive\"\ntop = \"soc\"\n[output]\npretty = false\n",
        )
        .unwrap();
        let settings = merge_settings(&config, &graph_args(), None);
        assert_eq!(settings.build.depth_limit, Some(3));
        assert_eq!(settings.build.suffix_policy, SuffixPolicy::IoInsensitive);
        assert_eq!(settings.build.top.as_deref(), Some("soc"));
        assert!(!settings.pretty);
        assert!(settings.validate);
    }

    #[test]
    fn flags_override_config() {
        let config = hwgraph_config::load_config_from_str(
            "[build]\ndepth_limit = 3\nsuffix_policy = \"io-insensitive\"\ntop = \"soc\"\n",
        )
        .unwrap();
        let graph = GraphArgs {
            depth: Some(1),
            suffix: Some(SuffixPolicy::Strict),
            top: Some("cpu".to_string()),
            ..graph_args()
        };
        let output = OutputArgs {
            compact: true,
            no_validate: true,
            ..OutputArgs::default()
        };
        let settings = merge_settings(&config, &graph, Some(&output));
        assert_eq!(settings.build.depth_limit, Some(1));
        assert_eq!(settings.build.suffix_policy, SuffixPolicy::Strict);
        assert_eq!(settings.build.top.as_deref(), Some("cpu"));
        assert!(!settings.pretty);
        assert!(!settings.validate);
    }

    #[test]
    fn instance_paths() {
        assert_eq!(parse_instance_path("soc.u_core").unwrap(), vec!["soc", "u_core"]);
        assert_eq!(parse_instance_path("soc").unwrap(), vec!["soc"]);
        assert!(parse_instance_path("soc..u_core").is_err());
        assert!(parse_instance_path("").is_err());
    }

    #[test]
    fn missing_netlist_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(load_netlist(&path.display().to_string()).is_err());
    }
}
