//! Files command

use anyhow::{Context, Result};
use rotolog_writer::managed_files;

use crate::cli::RotatorArgs;
use crate::commands::resolve_config;
use crate::output::{self, FileInfo};

pub fn execute(args: &RotatorArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let files = managed_files(&config)?
        .iter()
        .map(|path| {
            FileInfo::from_path(path).with_context(|| format!("Failed to stat {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    output::print_files_table(&files);
    Ok(())
}
