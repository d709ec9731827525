use boxflow::{BoxflowError, LayoutConfig, LayoutEngine, Size};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Lays out a JSON element tree and prints the border box of every element.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the JSON document description.
    input: PathBuf,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Width taken by a vertical scrollbar.
    #[arg(long)]
    scrollbar_width: Option<f32>,

    /// Abort the pass when more layout nodes than this are live.
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Print pass statistics after the geometry.
    #[arg(long)]
    stats: bool,

    /// Print the geometry as a JSON array instead of an indented tree.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), BoxflowError> {
    env_logger::init();
    let args = Args::parse();

    let mut config = LayoutConfig {
        max_pool_nodes: args.max_nodes,
        ..Default::default()
    };
    if let Some(width) = args.scrollbar_width {
        config.scrollbar_width = width;
    }

    log::info!(
        "Laying out {} in a {}x{} viewport",
        args.input.display(),
        args.width,
        args.height
    );
    let json = fs::read_to_string(&args.input)?;
    let engine = LayoutEngine::new(config);
    let laid_out = boxflow::layout_json(&engine, &json, Size::new(args.width, args.height))?;
    log::debug!(
        "Laid out {} elements in {:?}",
        laid_out.document.len(),
        laid_out.output.stats.elapsed
    );

    let geometry = laid_out.geometry();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&geometry)?);
    } else {
        for element in &geometry {
            println!("{}", element);
        }
    }
    if args.stats {
        let stats = laid_out.output.stats;
        println!();
        println!("roots: {}", stats.roots);
        println!("root attempts: {} (max {})", stats.root_attempts, stats.max_root_attempts);
        println!("local reformats: {}", stats.local_reformats);
        println!("parent reformats: {}", stats.parent_reformats);
        println!("sibling restarts: {}", stats.sibling_restarts);
        println!("nodes: {} acquired, {} peak", stats.nodes_acquired, stats.peak_live_nodes);
        println!("elapsed: {:?}", stats.elapsed);
    }
    Ok(())
}
