//! Cleanup command

use anyhow::Result;
use rotolog_writer::run_cleanup;

use crate::cli::RotatorArgs;
use crate::commands::resolve_config;
use crate::output;

pub fn execute(args: &RotatorArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let report = run_cleanup(&config)?;
    report.log(config.policy.name());
    output::print_cleanup_report(&report);
    Ok(())
}
