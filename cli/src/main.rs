use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use engine::{Config, FileStorage, HttpFetcher, MonsterEntry, Provenance, Session};
use statblocks_cli::{LayoutArg, init_tracing, read_input, to_layout, write_output};

const WELCOME: &str = "\
Willkommen beim Statblock Layout Tool

Mit diesem Werkzeug können Sie:
  - Monster aus dem deutschen SRD hinzufügen und anzeigen
  - eigene Statblöcke im Fantasy-Statblocks-YAML-Format einfügen und bearbeiten
  - zwischen Raster- und Spaltenlayout wechseln
  - alle Statblöcke als druckfertige Seite ausgeben

Erste Schritte:
  1. statblocks monsters --search drache
  2. statblocks add \"Junger Roter Drache\"
  3. statblocks print --out statblocks.html
  4. Die Seite im Browser öffnen und drucken

Diese Nachricht wird nur einmal angezeigt (erneut mit `statblocks welcome`).
";

const FORMAT_NOTICE: &str = "Die Statblocks verwenden die Fantasy Statblocks Syntax: \
https://plugins.javalent.com/statblock/layouts/integrated/dnd5e";

#[derive(Subcommand)]
enum Cmd {
    /// List monsters from the directory, optionally filtered
    Monsters {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
        /// Emit JSON instead of one name per line
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch a monster by name (first search match) or content URL and add it
    Add {
        /// Display name, search term or content URL
        monster: String,
    },
    /// Add a pasted statblock (fenced or bare YAML) from a file or stdin
    AddCustom {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show the collection: standard statblocks first, then custom ones
    List,
    /// Print one statblock as a rendered card, or its YAML source
    Show {
        index: usize,
        #[arg(long, default_value_t = false)]
        yaml: bool,
    },
    /// Replace a statblock with new YAML from a file or stdin
    Edit {
        index: usize,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Remove a statblock by its position in `list`
    Remove { index: usize },
    /// Write the printable page
    Print {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Override the configured layout
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,
        /// Keep the edit/remove buttons in the page
        #[arg(long, default_value_t = false)]
        controls: bool,
    },
    /// Show the welcome text again
    Welcome,
}

#[derive(Parser)]
#[command(name = "statblocks")]
#[command(about = "Collect, edit and print D&D 5e statblocks from the German SRD")]
struct Cli {
    /// YAML or JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Where statblocks are stored
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// API base URL
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Keep `ae`/`oe`/`ue` in monster names
    #[arg(long, global = true, default_value_t = false)]
    no_umlauts: bool,
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(base) = &cli.api_base {
        config.api_base = base.clone();
    }
    if cli.no_umlauts {
        config.restore_umlauts = false;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let storage = FileStorage::new(config.resolve_data_dir());
    tracing::debug!(dir = %storage.dir().display(), "using data directory");
    let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs))?;
    let mut session = Session::open(config, storage, fetcher)?;

    if session.needs_welcome() && !matches!(cli.cmd, Cmd::Welcome) {
        eprintln!("{}", WELCOME);
        session.mark_welcome_seen()?;
    }

    match cli.cmd {
        Cmd::Monsters { search, json } => {
            session.refresh_directory();
            if let Some(message) = session.banner() {
                bail!("{}", message);
            }
            let hits: Vec<&MonsterEntry> = match &search {
                Some(term) => session.search(term),
                None => session.monsters().iter().collect(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                for monster in hits {
                    println!("{}", monster.name);
                }
            }
        }
        Cmd::Add { monster } => {
            let url = if monster.starts_with("http://") || monster.starts_with("https://") {
                monster
            } else {
                resolve_monster(&mut session, &monster)?
            };
            let index = session.select_monster(&url)?;
            let (_, added) = session
                .store()
                .get(index)
                .context("added statblock is missing")?;
            println!("#{} {}", index, added.name());
        }
        Cmd::AddCustom { file } => {
            let text = read_input(file.as_deref())?;
            let index = session
                .add_custom(&text)
                .with_context(|| FORMAT_NOTICE.to_string())?;
            let (_, added) = session
                .store()
                .get(index)
                .context("added statblock is missing")?;
            println!("#{} {}", index, added.name());
        }
        Cmd::List => {
            if session.store().is_empty() {
                eprintln!("Noch keine Statblöcke. Mit `statblocks add` oder `statblocks add-custom` hinzufügen.");
            }
            for (index, (provenance, statblock)) in session.store().combined().enumerate() {
                let tag = match provenance {
                    Provenance::Standard => "standard",
                    Provenance::Custom => "custom",
                };
                match &statblock.record().cr {
                    Some(cr) => println!("#{} [{}] {} (HG {})", index, tag, statblock.name(), cr),
                    None => println!("#{} [{}] {}", index, tag, statblock.name()),
                }
            }
        }
        Cmd::Show { index, yaml } => {
            let (_, statblock) = session.store().get(index).with_context(|| {
                format!("no statblock at index {} (collection holds {})", index, session.store().len())
            })?;
            if yaml {
                println!("{}", statblock.source());
            } else {
                print!("{}", engine::render_card(index, statblock.record(), false));
            }
        }
        Cmd::Edit { index, file } => {
            let text = read_input(file.as_deref())?;
            session
                .edit(index, &text)
                .with_context(|| FORMAT_NOTICE.to_string())?;
            let (_, edited) = session
                .store()
                .get(index)
                .context("edited statblock is missing")?;
            println!("#{} {}", index, edited.name());
        }
        Cmd::Remove { index } => {
            let removed = session.remove(index)?;
            println!("removed #{} {}", index, removed.name());
        }
        Cmd::Print {
            out,
            layout,
            controls,
        } => {
            if let Some(layout) = layout {
                session.set_layout(to_layout(layout));
            }
            let html = session.render_page(controls);
            write_output(out.as_deref(), &html)?;
            if let Some(path) = out {
                eprintln!(
                    "{} Statblöcke nach {} geschrieben",
                    session.store().len(),
                    path.display()
                );
            }
        }
        Cmd::Welcome => {
            println!("{}", WELCOME);
            session.mark_welcome_seen()?;
        }
    }
    Ok(())
}

/// Exact (case-insensitive) name match first, else the first search hit.
fn resolve_monster(
    session: &mut Session<FileStorage, HttpFetcher>,
    term: &str,
) -> anyhow::Result<String> {
    session.refresh_directory();
    if let Some(message) = session.banner() {
        bail!("{}", message);
    }
    let wanted = term.trim().to_lowercase();
    let hits = session.search(term);
    let chosen = hits
        .iter()
        .find(|m| m.name.to_lowercase() == wanted)
        .or_else(|| hits.first())
        .with_context(|| format!("no monster matches '{}'", term))?;
    Ok(chosen.url.clone())
}
