//! Coverage tool integration - run the Go test command and read its cover profile

mod gocover;

pub use gocover::{module_name, parse_profile, CoverageProfile, FileCoverage, IgnoreList};

use crate::config::CoverageConfig;
use crate::MonitorError;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

/// Run the configured coverage command in `root`. Blocks until it exits.
pub fn run_coverage_command(root: &Path, config: &CoverageConfig) -> Result<(), MonitorError> {
    let display = config.command.join(" ");
    let Some((program, args)) = config.command.split_first() else {
        return Err(MonitorError::TestCommand {
            command: display,
            status: "not run".to_string(),
            stderr: "empty command".to_string(),
        });
    };

    let command = &display;
    info!(command = %command, "running coverage command");
    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .output()
        .map_err(|e| MonitorError::TestCommand {
            command: display.clone(),
            status: "failed to start".to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(MonitorError::TestCommand {
            command: display,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Module name from `<root>/go.mod`
pub fn read_module_name(root: &Path) -> Result<String, MonitorError> {
    let path = root.join("go.mod");
    let content = fs::read_to_string(&path).map_err(|e| MonitorError::io(&path, e))?;
    module_name(&content, &path)
}

/// Ignore list from the configured ignore file. A missing or unreadable file is
/// logged and treated as empty.
pub fn load_ignore_list(root: &Path, config: &CoverageConfig) -> anyhow::Result<IgnoreList> {
    let path = root.join(&config.ignore_file);
    match fs::read_to_string(&path) {
        Ok(content) => IgnoreList::parse(&content),
        Err(e) => {
            warn!("no coverage ignore list at {}: {}", path.display(), e);
            Ok(IgnoreList::default())
        }
    }
}

/// Read and parse the profile written by the coverage command
pub fn load_profile(
    root: &Path,
    config: &CoverageConfig,
    module: &str,
    ignore: &IgnoreList,
) -> Result<CoverageProfile, MonitorError> {
    let path = root.join(&config.profile);
    let content = fs::read_to_string(&path).map_err(|e| MonitorError::io(&path, e))?;
    parse_profile(&content, module, ignore)
}
