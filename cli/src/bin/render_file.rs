use std::path::PathBuf;

use clap::Parser;
use engine::{RenderOptions, Statblock, StatblockRecord, ingest_custom};
use statblocks_cli::{LayoutArg, init_tracing, read_text_auto, to_layout, write_output};

#[derive(Parser)]
#[command(name = "render-file")]
#[command(about = "Render statblock files to a printable page without touching the collection")]
struct Args {
    /// Statblock documents (fenced or bare YAML)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "grid")]
    layout: LayoutArg,

    /// Skip unreadable files instead of failing
    #[arg(long, default_value_t = false)]
    keep_going: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, false);

    let mut statblocks: Vec<Statblock> = Vec::new();
    for path in &args.files {
        let parsed = read_text_auto(path).and_then(|text| {
            ingest_custom(&text).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
        });
        match parsed {
            Ok(statblock) => statblocks.push(statblock),
            Err(e) if args.keep_going => tracing::warn!("skipping: {:#}", e),
            Err(e) => return Err(e),
        }
    }

    let options = RenderOptions {
        layout: to_layout(args.layout),
        controls: false,
        ..RenderOptions::default()
    };
    let records: Vec<&StatblockRecord> = statblocks.iter().map(Statblock::record).collect();
    let html = engine::render_page(records, &options);
    write_output(args.out.as_deref(), &html)
}
