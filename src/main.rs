use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use genotrack::data::{FeatureSource, GffFeatureSource};
use genotrack::feature::transform;
use genotrack::region::Region;
use genotrack::ticks::{build_ticks, format_tick_value};
use genotrack::viewer::App;

#[derive(Parser)]
#[command(
    name = "genotrack",
    about = "Terminal-based genomic annotation track viewer with incremental rendering",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive TUI viewer for a region
    View {
        /// Path to GFF3 annotation file
        #[arg(short, long)]
        gff: PathBuf,

        /// Region to view (format: chr:start-end)
        #[arg(short = 'L', long)]
        region: String,

        /// Chromosome length; defaults to the last annotated position
        #[arg(short, long)]
        chromosome_size: Option<u64>,
    },

    /// Print the exon/intron structure of the genes in a region
    Structure {
        /// Path to GFF3 annotation file
        #[arg(short, long)]
        gff: PathBuf,

        /// Region to analyze (format: chr:start-end)
        #[arg(short = 'L', long)]
        region: String,
    },

    /// Print the ruler ticks generated for a coordinate range
    Ticks {
        /// Range width in basepairs
        #[arg(short, long)]
        range: f64,

        /// Requested tick count
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
}

fn load_source(gff: &PathBuf, region_str: &str) -> Result<(Region, GffFeatureSource)> {
    let region: Region = region_str.parse().context("failed to parse region")?;
    let source = GffFeatureSource::open(gff, &region.chrom)?;
    Ok((region, source))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::View {
            gff,
            region,
            chromosome_size,
        } => {
            let (region, source) = load_source(&gff, &region)?;
            let chromosome_size = chromosome_size
                .unwrap_or_else(|| source.max_end())
                .max(region.end);

            let mut app = App::new(region, Arc::new(source), chromosome_size);
            app.run_tui()?;
        }

        Commands::Structure { gff, region } => {
            let (region, source) = load_source(&gff, &region)?;
            let records = source
                .fetch(region.start, region.end, 1.0)
                .context("failed to read region")?;
            let genes = transform(&records);
            println!("{} genes in {region}", genes.len());

            for gene in &genes {
                println!(
                    "\n{} {} {}-{} ({} transcripts)",
                    gene.name.as_deref().unwrap_or("<unnamed>"),
                    gene.strand.symbol(),
                    gene.start_index,
                    gene.end_index,
                    gene.transcripts.len()
                );
                for transcript in &gene.transcripts {
                    println!(
                        "  {} {}-{}",
                        transcript.name.as_deref().unwrap_or("<unnamed>"),
                        transcript.start_index,
                        transcript.end_index
                    );
                    for block in &transcript.structure {
                        let kind = if block.is_empty { "intron" } else { "exon" };
                        println!(
                            "    {kind:<7} {}-{} ({} items)",
                            block.start_index,
                            block.end_index,
                            block.items.len()
                        );
                    }
                }
            }
        }

        Commands::Ticks { range, count } => {
            let ticks = build_ticks(range, count);
            println!("{} ticks for range {range}:", ticks.len());
            for tick in &ticks {
                println!("  {:>12.0}  {}", tick.value, format_tick_value(tick.value));
            }
        }
    }

    Ok(())
}
