use tracing::{info, warn};

use gpurun_exec::{Activation, DeviceProbe, LaunchSpec, ModuleSet, exit_code};
use gpurun_model::{JobContext, LogPattern};

use crate::config::RunConfig;

/// Run the launch sequence and return the process exit code.
///
/// The sequence is strictly linear with a single fail-fast error path:
/// reservation parsing, module capture and environment activation all abort
/// the launch with `Err`; only the device probe is allowed to fail quietly.
/// The returned code is the launcher's own exit code.
pub async fn launch(cfg: &RunConfig, ctx: &JobContext, dry_run: bool) -> anyhow::Result<i32> {
    // Argument derivation first: a missing or malformed reservation must
    // never get as far as spawning anything.
    let reservation = ctx.reservation()?;
    info!(
        job_id = ctx.job_id.as_deref().unwrap_or("-"),
        job_name = ctx.job_name.as_deref().unwrap_or("-"),
        node = ctx.node_name.as_deref().unwrap_or("-"),
        reservation = %reservation,
        "launch context"
    );

    // Toolchain baseline: purge inherited module state, load the configured
    // modules, capture the resulting environment. With purge off and no
    // loads this degenerates to the parent snapshot.
    let modules = ModuleSet::new(cfg.modules.load.clone())
        .with_purge(cfg.modules.purge)
        .with_shell(cfg.modules.shell.clone(), cfg.modules.login);
    let mut env = modules.capture().await?;

    // User-site isolation: only the activated environment's packages may
    // resolve, not whatever accumulated under ~/.local on the login node.
    env.set("PYTHONNOUSERSITE", "1");

    if let Some(prefix) = &cfg.env_prefix {
        Activation::new(prefix).apply(&mut env)?;
    }

    if let Some(level) = &cfg.nccl_debug {
        env.set("NCCL_DEBUG", level.clone());
    }

    // Informational only; a node without a working probe still trains.
    if cfg.probe.enabled {
        let probe = DeviceProbe::new(cfg.probe.command.clone(), cfg.probe.args.clone());
        if !probe.run(&env).await {
            warn!(command = %cfg.probe.command, "device probe failed; continuing");
        }
    } else {
        info!("device probe disabled");
    }

    let mut spec = LaunchSpec::standalone(
        cfg.launcher.program.clone(),
        cfg.launcher.entry_point.clone(),
        reservation.count(),
    );
    spec.passthrough = cfg.launcher.args.clone();
    spec.env = env;
    spec.log_file = cfg
        .launcher
        .log_pattern
        .as_deref()
        .map(|p| LogPattern::new(p).expand(ctx));

    if dry_run {
        println!("{}", spec.render());
        return Ok(0);
    }

    let status = spec.run().await?;
    Ok(exit_code(status))
}
