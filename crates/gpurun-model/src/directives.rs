use serde::{Deserialize, Serialize};

use crate::domain::{GresSpec, MemSize, TimeLimit};

/// Scheduler resource directives for the batch job wrapping the launcher.
///
/// These are the declarative knobs the scheduler enforces; the launcher never
/// checks them itself. Defaults reproduce the original submission: a five
/// minute slot on the `hgx` partition with four GPUs, two CPUs and 16GB.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatchDirectives {
    /// Execution queue.
    pub partition: String,
    /// Wall-clock limit.
    pub time: TimeLimit,
    /// Per-node accelerator reservation.
    pub gpus_per_node: GresSpec,
    /// CPU reservation per task.
    pub cpus_per_task: u32,
    /// Memory reservation.
    pub mem: MemSize,
    /// Stdout redirection pattern (`%x` job name, `%j` job id).
    pub output: String,
    /// Stderr redirection pattern.
    pub error: String,
}

impl Default for BatchDirectives {
    fn default() -> Self {
        Self {
            partition: "hgx".to_string(),
            time: TimeLimit::default(),
            gpus_per_node: GresSpec::new("a100", 4).expect("default reservation is valid"),
            cpus_per_task: 2,
            mem: MemSize::default(),
            output: "logs/%x-%j.out".to_string(),
            error: "logs/%x-%j.err".to_string(),
        }
    }
}

impl BatchDirectives {
    /// Render the `#SBATCH` header lines for a submission script.
    pub fn directive_lines(&self) -> Vec<String> {
        vec![
            format!("#SBATCH --partition={}", self.partition),
            format!("#SBATCH --time={}", self.time),
            format!("#SBATCH --gpus-per-node={}", self.gpus_per_node),
            format!("#SBATCH --cpus-per-task={}", self.cpus_per_task),
            format!("#SBATCH --mem={}", self.mem),
            format!("#SBATCH --output={}", self.output),
            format!("#SBATCH --error={}", self.error),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::BatchDirectives;

    #[test]
    fn defaults_match_original_submission() {
        let d = BatchDirectives::default();
        assert_eq!(d.partition, "hgx");
        assert_eq!(d.time.as_str(), "00:05:00");
        assert_eq!(d.gpus_per_node.count(), 4);
        assert_eq!(d.cpus_per_task, 2);
        assert_eq!(d.mem.as_str(), "16GB");
    }

    #[test]
    fn directive_lines_are_complete_and_ordered() {
        let lines = BatchDirectives::default().directive_lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "#SBATCH --partition=hgx");
        assert_eq!(lines[1], "#SBATCH --time=00:05:00");
        assert_eq!(lines[2], "#SBATCH --gpus-per-node=a100:4");
        assert_eq!(lines[3], "#SBATCH --cpus-per-task=2");
        assert_eq!(lines[4], "#SBATCH --mem=16GB");
        assert_eq!(lines[5], "#SBATCH --output=logs/%x-%j.out");
        assert_eq!(lines[6], "#SBATCH --error=logs/%x-%j.err");
    }

    #[test]
    fn serde_partial_config_uses_defaults() {
        let json = r#"{"partition": "debug", "gpus-per-node": "h100:8"}"#;
        let d: BatchDirectives = serde_json::from_str(json).unwrap();

        assert_eq!(d.partition, "debug");
        assert_eq!(d.gpus_per_node.name(), "h100");
        assert_eq!(d.gpus_per_node.count(), 8);
        assert_eq!(d.cpus_per_task, 2);
        assert_eq!(d.time.as_str(), "00:05:00");
    }

    #[test]
    fn serde_rejects_invalid_time() {
        let json = r#"{"time": "five minutes"}"#;
        assert!(serde_json::from_str::<BatchDirectives>(json).is_err());
    }
}
