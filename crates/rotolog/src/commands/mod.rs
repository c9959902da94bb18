//! Command implementations

pub mod cleanup;
pub mod files;
pub mod pipe;
pub mod tail;

use anyhow::{bail, Context, Result};
use rotolog_core::{DayConfig, PolicyConfig, RotationTrigger, RotatorConfig, SizeConfig};
use tracing::debug;

use crate::cli::RotatorArgs;

/// Build the rotator config from `--config`, policy flags, or a config file
/// found in the current directory, in that order.
pub fn resolve_config(args: &RotatorArgs) -> Result<RotatorConfig> {
    let mut config = if let Some(path) = &args.config {
        RotatorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
    } else if args.has_policy_flags() {
        let Some(folder) = args.folder.clone() else {
            bail!("--folder is required when no config file is given");
        };
        RotatorConfig {
            folder,
            policy: policy_from_flags(args)?,
        }
    } else {
        let cwd = std::env::current_dir()?;
        let (config, path) = RotatorConfig::find_and_load(&cwd).context(
            "choose a policy with --days, --size-mb or --size-bytes, or pass --config",
        )?;
        debug!("Loaded config from {}", path.display());
        config
    };

    if let Some(folder) = &args.folder {
        config.folder = folder.clone();
    }
    config.validate()?;
    Ok(config)
}

fn policy_from_flags(args: &RotatorArgs) -> Result<PolicyConfig> {
    if let Some(days) = args.days {
        let mut config = DayConfig::new(days);
        if args.hourly {
            config = config.hourly();
        }
        if let Some(format) = &args.format {
            config = config.with_format(format.clone());
        }
        if let Some(suffix) = &args.suffix {
            config = config.with_suffix(suffix.clone());
        }
        if args.legacy_day_of_month {
            config = config.with_trigger(RotationTrigger::DayOfMonth);
        }
        return Ok(PolicyConfig::Days(config));
    }

    let mut config = match (args.size_mb, args.size_bytes) {
        (Some(mb), _) => SizeConfig::new(mb),
        (None, Some(bytes)) => SizeConfig::with_max_bytes(bytes),
        (None, None) => bail!("choose a policy with --days, --size-mb or --size-bytes"),
    };
    if let Some(prefix) = &args.prefix {
        config = config.with_prefix(prefix.clone());
    }
    if let Some(suffix) = &args.suffix {
        config = config.with_suffix(suffix.clone());
    }
    Ok(PolicyConfig::Size(config))
}
