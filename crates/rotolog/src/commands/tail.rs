//! Tail command

use anyhow::{Context, Result};
use regex::Regex;
use rotolog_writer::{managed_files, LogReader};

use crate::cli::TailArgs;
use crate::commands::resolve_config;
use crate::output;

pub fn execute(args: TailArgs) -> Result<()> {
    let config = resolve_config(&args.rotator)?;
    let reader = LogReader::new(managed_files(&config)?);

    let lines = match &args.grep {
        Some(pattern) => {
            let regex =
                Regex::new(pattern).with_context(|| format!("Invalid regex: {}", pattern))?;
            // Filter the whole history so -n counts matching lines
            let content = reader.read_all()?;
            let mut matched: Vec<String> = String::from_utf8_lossy(&content)
                .lines()
                .filter(|line| regex.is_match(line))
                .map(String::from)
                .collect();
            let skip = matched.len().saturating_sub(args.lines);
            matched.drain(..skip);
            matched
        }
        None => reader.tail(args.lines)?,
    };

    output::print_logs(&lines);
    Ok(())
}
