//! page2graph - Build article-separation graph inputs from page documents
//!
//! A command line tool that reads page documents (JSON), builds the
//! interaction graph with node and edge features plus the ground-truth
//! relations for each page, and writes one graph json per page.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pagegraph_core::api::{BatchOutput, GraphBuilder};
use pagegraph_core::features::ExternalFeatures;
use pagegraph_core::page::PageDocument;
use pagegraph_core::providers::{PrecomputedLineMetrics, PrecomputedSimilarity};
use pagegraph_core::separators::SeparatorStrategy;
use pagegraph_core::topology::Interaction;

/// Method for edge set generation.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum InteractionArg {
    /// Neighbors in the Delaunay triangulation over region centers (default)
    #[default]
    Delaunay,
    /// Every ordered pair of distinct regions
    Fully,
}

impl InteractionArg {
    fn to_interaction(self) -> Interaction {
        match self {
            InteractionArg::Delaunay => Interaction::Delaunay,
            InteractionArg::Fully => Interaction::Fully,
        }
    }

    /// Single-letter tag used in the derived output directory name.
    fn letter(self) -> char {
        match self {
            InteractionArg::Delaunay => 'd',
            InteractionArg::Fully => 'f',
        }
    }
}

/// Method for edge separator features.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum SeparatorArg {
    /// Rules over the bounding boxes of regions and separators (default)
    #[default]
    Bb,
    /// Intersections of the region-center segment with separator polygons
    Line,
}

impl SeparatorArg {
    fn to_strategy(self) -> SeparatorStrategy {
        match self {
            SeparatorArg::Bb => SeparatorStrategy::BoundingBox,
            SeparatorArg::Line => SeparatorStrategy::Line,
        }
    }
}

/// A command line tool that builds article-separation graph inputs from
/// page document json files.
#[derive(Parser, Debug)]
#[command(name = "page2graph")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Args {
    /// One or more paths to page document json files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    // === Graph options ===
    /// Method for edge set generation
    #[arg(short = 'i', long, value_enum, default_value = "delaunay")]
    interaction: InteractionArg,

    /// Method for edge separator features
    #[arg(short = 's', long, value_enum, default_value = "bb")]
    separators: SeparatorArg,

    /// Also build visual regions for nodes and edges
    #[arg(short = 'V', long = "visual-regions", action = ArgAction::SetTrue)]
    visual_regions: bool,

    // === Collaborator data ===
    /// Additional feature sources, json files keyed by page id (repeatable)
    #[arg(short = 'e', long = "external-json")]
    external_json: Vec<PathBuf>,

    /// Precomputed per-line stroke width / text height tables (json)
    #[arg(long = "line-metrics")]
    line_metrics: Option<PathBuf>,

    /// Precomputed pairwise text similarity tables (json)
    #[arg(long = "similarity")]
    similarity: Option<PathBuf>,

    // === Output options ===
    /// Directory where graph jsons are written. Derived from the page
    /// directory and graph dimensions if not given
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Number of worker threads (0 = one per core)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,
}

/// Default output directory: a sibling of the `page` directory named after
/// the graph dimensions, e.g. `.../page` becomes `.../json15d2v`.
fn default_output_dir(
    page_path: &Path,
    interaction: InteractionArg,
    node_width: usize,
    edge_width: usize,
    visual_regions: bool,
) -> PathBuf {
    let tag = format!(
        "json{}{}{}{}",
        node_width,
        interaction.letter(),
        edge_width,
        if visual_regions { "v" } else { "" }
    );
    let parent = page_path.parent().unwrap_or_else(|| Path::new("."));
    if parent.file_name().is_some_and(|name| name == "page") {
        parent.with_file_name(tag)
    } else {
        parent.join(tag)
    }
}

fn load_pages(files: &[PathBuf]) -> (Vec<PageDocument>, HashMap<String, PathBuf>, usize) {
    let mut pages = Vec::with_capacity(files.len());
    let mut paths = HashMap::new();
    let mut unreadable = 0usize;
    for path in files {
        let page: PageDocument = match File::open(path)
            .map_err(anyhow::Error::from)
            .and_then(|file| Ok(serde_json::from_reader(BufReader::new(file))?))
        {
            Ok(page) => page,
            Err(e) => {
                warn!(path = %path.display(), %e, "cannot read page document, skipping");
                unreadable += 1;
                continue;
            }
        };
        paths.insert(page.id.clone(), path.clone());
        pages.push(page);
    }
    (pages, paths, unreadable)
}

fn build_graph_builder(args: &Args) -> anyhow::Result<GraphBuilder> {
    let mut builder = GraphBuilder::new()
        .interaction(args.interaction.to_interaction())
        .separators(args.separators.to_strategy())
        .visual_regions(args.visual_regions)
        .parallel(args.jobs);

    let json_timer = Instant::now();
    for path in &args.external_json {
        let file = File::open(path)
            .with_context(|| format!("cannot open external json {}", path.display()))?;
        let source = ExternalFeatures::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse external json {}", path.display()))?;
        builder = builder.external_features(source);
    }
    if !args.external_json.is_empty() {
        info!(
            elapsed = ?json_timer.elapsed(),
            count = args.external_json.len(),
            "loaded external jsons"
        );
    }

    if let Some(path) = &args.line_metrics {
        let file = File::open(path)
            .with_context(|| format!("cannot open line metrics {}", path.display()))?;
        let source = PrecomputedLineMetrics::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse line metrics {}", path.display()))?;
        builder = builder.line_metrics(source);
    }

    if let Some(path) = &args.similarity {
        let file = File::open(path)
            .with_context(|| format!("cannot open similarity tables {}", path.display()))?;
        let source = PrecomputedSimilarity::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse similarity tables {}", path.display()))?;
        builder = builder.similarity(source);
    }

    Ok(builder)
}

fn write_graphs(
    args: &Args,
    output: &BatchOutput,
    paths: &HashMap<String, PathBuf>,
) -> anyhow::Result<usize> {
    let mut out_dir = args.output_dir.clone();
    let mut written = 0usize;
    for result in &output.graphs {
        let page_path = match paths.get(&result.page_id) {
            Some(path) => path.clone(),
            None => PathBuf::from(&result.page_id),
        };
        // The derived directory depends on the feature widths, so it is
        // resolved from the first built graph.
        let dir = out_dir.get_or_insert_with(|| {
            default_output_dir(
                &page_path,
                args.interaction,
                result.graph.node_width(),
                result.graph.edge_width(),
                args.visual_regions,
            )
        });
        if !dir.is_dir() {
            fs::create_dir_all(dir.as_path())
                .with_context(|| format!("cannot create output directory {}", dir.display()))?;
            info!(dir = %dir.display(), "created output directory");
        }

        let file_name = page_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| result.page_id.clone());
        let out = dir.join(format!("{file_name}.json"));
        let file = File::create(&out)
            .with_context(|| format!("cannot create output file {}", out.display()))?;
        serde_json::to_writer(BufWriter::new(file), &result.graph)
            .with_context(|| format!("cannot write graph json {}", out.display()))?;
        info!(out = %out.display(), "saved graph json");
        written += 1;
    }
    Ok(written)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let builder = build_graph_builder(&args)?;
    let (pages, paths, unreadable) = load_pages(&args.files);

    let batch_timer = Instant::now();
    let output = builder.build_batch(&pages)?;
    info!(elapsed = ?batch_timer.elapsed(), "feature generation finished");

    let written = write_graphs(&args, &output, &paths)?;

    let discarded: usize = output.graphs.iter().map(|g| g.stats.discarded_regions).sum();
    let ambiguous: usize = output
        .graphs
        .iter()
        .map(|g| g.stats.ambiguous_assignments)
        .sum();
    info!(
        discarded_regions = discarded,
        ambiguous_assignments = ambiguous,
        "batch diagnostics"
    );
    info!("wrote {written}/{} files", args.files.len());
    if unreadable > 0 || !output.skipped.is_empty() {
        info!("skipped {} page(s):", unreadable + output.skipped.len());
        for skipped in &output.skipped {
            info!("  {}: {}", skipped.page_id, skipped.reason);
        }
    }

    Ok(())
}
