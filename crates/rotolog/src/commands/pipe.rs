//! Pipe command

use anyhow::{bail, Result};
use rotolog_writer::Rotator;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use crate::cli::PipeArgs;
use crate::commands::resolve_config;

pub fn execute(args: PipeArgs) -> Result<()> {
    let config = resolve_config(&args.rotator)?;
    let rotator = Rotator::from_config(&config)?;
    info!(
        "Piping stdin into {} ({} policy)",
        rotator.folder().display(),
        config.policy.name()
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut tee = args.tee.then(|| stdout.lock());

    let mut line = Vec::new();
    let mut failures = 0usize;
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        if let Some(out) = tee.as_mut() {
            out.write_all(&line)?;
        }

        // A failed rotation drops this line; the next one retries
        if let Err(e) = rotator.write_bytes(&line) {
            failures += 1;
            warn!("Failed to write log line: {}", e);
        }
    }

    if let Some(out) = tee.as_mut() {
        out.flush()?;
    }
    rotator.flush_active()?;

    if failures > 0 {
        bail!("{} line(s) could not be written", failures);
    }
    Ok(())
}
