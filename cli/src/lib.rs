use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::Context;
use clap::ValueEnum;
use encoding_rs::Encoding;
use engine::Layout;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LayoutArg {
    Grid,
    Column,
}

pub fn to_layout(l: LayoutArg) -> Layout {
    match l {
        LayoutArg::Grid => Layout::Grid,
        LayoutArg::Column => Layout::Column,
    }
}

/// Log to stderr. `STATBLOCKS_LOG` wins over `RUST_LOG`, which wins over the flags.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("STATBLOCKS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Decode a text file, honouring a UTF-8/UTF-16 byte-order mark.
pub fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        String::from_utf8(bytes).with_context(|| format!("{} is not UTF-8", path.display()))
    }
}

/// The file's text, or all of stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => read_text_auto(path),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read statblock from stdin")?;
            Ok(text)
        }
    }
}

pub fn write_output(out: Option<&Path>, html: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{}", html);
            Ok(())
        }
    }
}
