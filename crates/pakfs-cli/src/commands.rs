//! Subcommand implementations.

use crate::args::Command;
use anyhow::{Context, Result};
use pakfs::{HandleOrigin, LayeredRoot, LogicalPath, PathResolver};
use std::io::Write;

/// Run one subcommand, writing its output to `out`.
pub fn run<L: LayeredRoot>(
    resolver: &PathResolver<L>,
    command: &Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Cat { path } => cat(resolver, &LogicalPath::new(path.as_str())?, out),
        Command::Stat { path } => stat(resolver, &LogicalPath::new(path.as_str())?, out),
        Command::Explain { path } => explain(resolver, &LogicalPath::new(path.as_str())?, out),
    }
}

fn cat<L: LayeredRoot>(
    resolver: &PathResolver<L>,
    path: &LogicalPath,
    out: &mut impl Write,
) -> Result<()> {
    let mut handle = resolver.try_open(path)?;
    let copied = std::io::copy(&mut handle, out);
    let length = handle.length();
    resolver.close(handle);

    let copied = copied.with_context(|| format!("writing {path}"))?;
    if copied != length {
        tracing::warn!("Short read for {path}: {copied} of {length} bytes");
    }
    Ok(())
}

fn stat<L: LayeredRoot>(
    resolver: &PathResolver<L>,
    path: &LogicalPath,
    out: &mut impl Write,
) -> Result<()> {
    let (candidate, handle) = resolver
        .locate(path)
        .ok_or_else(|| pakfs::ResolverError::NotFound {
            path: path.to_string(),
            tried: resolver.roots().len(),
        })?;
    let info = handle.info();
    resolver.close(handle);

    let origin = match info.origin {
        HandleOrigin::Plain => "plain",
        HandleOrigin::Archived => "archived",
    };
    writeln!(out, "path:      {path}")?;
    writeln!(out, "source:    {candidate}")?;
    writeln!(out, "origin:    {origin}")?;
    writeln!(out, "container: {}", if info.from_container { "yes" } else { "no" })?;
    writeln!(out, "start:     {}", info.start)?;
    writeln!(out, "length:    {}", info.length)?;
    Ok(())
}

fn explain<L: LayeredRoot>(
    resolver: &PathResolver<L>,
    path: &LogicalPath,
    out: &mut impl Write,
) -> Result<()> {
    let winner = resolver.locate(path).map(|(candidate, handle)| {
        resolver.close(handle);
        candidate
    });

    writeln!(out, "{} mode, {path}:", resolver.config().mode)?;
    for (index, candidate) in resolver.candidates(path).iter().enumerate() {
        let mark = if winner.as_ref() == Some(candidate) { '*' } else { ' ' };
        writeln!(out, "{mark} {}. {candidate}", index + 1)?;
    }
    if winner.is_none() {
        writeln!(out, "  not found")?;
    }
    Ok(())
}
