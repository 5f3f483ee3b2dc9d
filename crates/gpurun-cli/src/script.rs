use std::path::Path;

use gpurun_model::BatchDirectives;

/// Render the submission script that wraps this tool.
///
/// The scheduler reads the `#SBATCH` header, allocates resources, and runs
/// the body on the allocated node; the body is a single `exec` into the
/// launcher shim so the job's exit code is the shim's, which in turn is the
/// training launcher's.
pub fn render_batch_script(directives: &BatchDirectives, config_path: Option<&Path>) -> String {
    let mut lines = vec!["#!/bin/bash".to_string()];
    lines.extend(directives.directive_lines());
    lines.push(String::new());

    let exec = match config_path {
        Some(p) => format!("exec gpurun --config {} launch", p.display()),
        None => "exec gpurun launch".to_string(),
    };
    lines.push(exec);
    lines.push(String::new());

    lines.join("\n")
}
