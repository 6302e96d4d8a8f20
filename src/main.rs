mod analysis;
mod app;
mod graph;
mod layout;
mod syntax;
mod util;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::graph::GraphStore;
use crate::layout::LayoutConfig;
use crate::syntax::{CommandParser, DEFAULT_PARSER_COMMAND, SourceParser};
use crate::util::plural;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JavaScript file to load; `-` reads stdin (headless only).
    file: Option<PathBuf>,

    /// Command that reads source on stdin and prints an ESTree JSON tree.
    #[arg(long, default_value = DEFAULT_PARSER_COMMAND)]
    parser: String,

    #[arg(long, default_value_t = 2.5)]
    repulsion_radius: f32,

    #[arg(long, default_value_t = 1.0)]
    node_size: f32,

    /// Sampler seed; defaults to a hash of the source text.
    #[arg(long)]
    seed: Option<u64>,

    /// Analyse once and print a report instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// With --headless, print the graph as JSON.
    #[arg(long, requires = "headless")]
    json: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(file: Option<&PathBuf>, allow_stdin: bool) -> Result<String> {
    match file {
        None => Ok(app::SAMPLE_SOURCE.to_owned()),
        Some(path) if path.as_os_str() == "-" => {
            if !allow_stdin {
                return Err(anyhow!("reading source from stdin requires --headless"));
            }
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read source from stdin")?;
            Ok(source)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
    }
}

fn run_headless(args: &Args, parser: &dyn SourceParser, source: &str, layout: &LayoutConfig) -> Result<()> {
    let mut store = GraphStore::new();
    let analysis = analysis::analyze(source, parser, &mut store, layout, args.seed)
        .context("analysis failed")?;

    if args.json {
        let report = serde_json::to_string_pretty(&store.snapshot(analysis.summary))
            .context("failed to serialize graph")?;
        println!("{report}");
        return Ok(());
    }

    let summary = analysis.summary;
    println!(
        "{}, {}, {}",
        plural(summary.functions, "function"),
        plural(summary.variables, "variable"),
        plural(summary.imports, "import")
    );
    println!(
        "{} and {}",
        plural(summary.nodes, "node"),
        plural(summary.edges, "edge")
    );
    println!(
        "layout: {} after {}",
        if analysis.relaxation.converged {
            "settled"
        } else {
            "stopped at the iteration cap"
        },
        plural(analysis.relaxation.iterations, "sweep")
    );

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let parser = CommandParser::from_command_line(&args.parser)
        .with_context(|| format!("invalid parser command `{}`", args.parser))?;
    tracing::debug!(parser = %parser.command_line(), "using external parser");

    let layout = LayoutConfig {
        repulsion_radius: args.repulsion_radius,
        ..LayoutConfig::default()
    };
    let source = read_source(args.file.as_ref(), args.headless)?;

    if args.headless {
        return run_headless(&args, &parser, &source, &layout);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let viewer = app::ViewerOptions {
        source,
        layout,
        node_size: args.node_size,
        seed: args.seed,
    };

    eframe::run_native(
        "codegraph3d",
        options,
        Box::new(move |cc| Ok(Box::new(app::CodeGraphApp::new(cc, Box::new(parser), viewer)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
