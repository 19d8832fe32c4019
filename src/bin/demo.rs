use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ch_engine::prelude::*;

/// Preprocess a road network and answer a single shortest-path query.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Road network in the plain text node/edge format
    network: PathBuf,

    /// Nested-dissection ordering file; switches from CH to CCH preprocessing
    #[arg(long)]
    ordering: Option<PathBuf>,

    /// Source vertex id
    #[arg(short, long)]
    source: VertexId,

    /// Target vertex id
    #[arg(short, long)]
    target: VertexId,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let network = load_network(&cli.network)?;
    println!(
        "road network: {} vertices, {} directed edges",
        network.graph.num_vertices(),
        network.graph.num_edges()
    );

    let answer = if let Some(ordering_path) = &cli.ordering {
        let order = load_ordering(ordering_path, &network.graph)?;
        let mut cch =
            Cch::preprocess(&network.graph, &order).context("CCH preprocessing failed")?;
        cch.customize(&network.graph);
        cch.query(cli.source, cli.target)
    } else {
        let ch = NodeContractor::new(&network.graph).run();
        println!("CH built, {} shortcuts added", ch.shortcuts_added());
        ch.query(cli.source, cli.target)
    };

    match answer {
        Ok(result) => {
            println!(
                "cost {} over {} vertices ({} nodes popped)",
                result.weight,
                result.path.len(),
                result.nodes_popped
            );
            println!(
                "path: {}",
                result
                    .path
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
        }
        Err(err) => println!("query failed: {err}"),
    }

    Ok(())
}
