// Clippy allows
#![allow(clippy::too_many_arguments)]

//! hitres: resolve the maximum-scoring non-overlapping set of hits per
//! query.
//!
//! Usage: resolve-hits [OPTIONS]

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use hitres::error::{ConfigError, ResolveError};
use hitres::manager::Manager;
use hitres::parsers::domtblout::{CoordKind, DomtbloutParser};
use hitres::parsers::hmmsearch::HmmsearchParser;
use hitres::parsers::raw::{RawParser, RawVariant};
use hitres::parsers::HitSource;
use hitres::processors::html::HtmlProcessor;
use hitres::processors::json::{JsonLayout, JsonProcessor};
use hitres::processors::text::TextProcessor;
use hitres::processors::HitsProcessor;
use hitres::specs::{FilterSpec, ScoreSpec, ScoreTransform, SegmentSpec};
use rustc_hash::FxHashSet;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum InputFormatArg {
    RawWithScores,
    RawWithEvalues,
    HmmerDomtblout,
    HmmsearchOut,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormatArg {
    Text,
    Json,
    Html,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CoordKindArg {
    Ali,
    Env,
}

#[derive(Parser)]
#[command(name = "resolve-hits")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "hitres: pick the maximum-scoring set of non-overlapping hits per query", long_about = None)]
struct Cli {
    /// Input file (omit and pass --stdin to read from standard input instead)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Read hits from standard input instead of a file
    #[arg(long, conflicts_with = "input")]
    stdin: bool,

    /// Shape of the input stream
    #[arg(long, value_enum, default_value_t = InputFormatArg::RawWithScores)]
    input_format: InputFormatArg,

    /// Which HMMER coordinate pair becomes a hit's segment (domtblout only)
    #[arg(long, value_enum, default_value_t = CoordKindArg::Ali)]
    coords: CoordKindArg,

    /// Minimum alignment-gap length (in residues) that splits an hmmsearch
    /// domain into multiple segments; omit to keep each domain contiguous
    #[arg(long)]
    min_gap_length: Option<usize>,

    /// Treat the input stream as grouped by query id (enables streaming,
    /// single-slot async resolution of each closed query)
    #[arg(long)]
    grouped: bool,

    /// Drop segments shorter than this many residues
    #[arg(long, default_value_t = 1)]
    min_seg_length: u64,

    /// Fraction (0.0..=0.5) to trim inward from each segment's ends
    #[arg(long, default_value_t = 0.0)]
    overlap_trim_fraction: f64,

    /// Affine scale applied to the DP score after kind-specific conversion
    #[arg(long, default_value_t = 1.0)]
    score_scale: f64,

    /// Affine offset applied to the DP score after kind-specific conversion
    #[arg(long, default_value_t = 0.0)]
    score_offset: f64,

    /// Drop hits whose DP score is below this threshold
    #[arg(long)]
    min_score: Option<f64>,

    /// Only emit results for these query ids (repeatable)
    #[arg(long = "query")]
    query_allowlist: Vec<String>,

    /// Stop after this many distinct queries have been admitted
    #[arg(long)]
    max_queries: Option<usize>,

    /// Use the cheaper naive-greedy heuristic instead of the full DP resolver
    #[arg(long)]
    naive_greedy: bool,

    /// Output format(s); repeatable to fan out to more than one renderer
    #[arg(long = "output-format", value_enum, default_values_t = vec![OutputFormatArg::Text])]
    output_formats: Vec<OutputFormatArg>,

    /// JSON layout: newline-delimited objects, or one wrapping array
    #[arg(long)]
    json_array: bool,

    /// Destination for text output (omit for stdout)
    #[arg(long)]
    text_out: Option<PathBuf>,

    /// Destination for JSON output (omit for stdout)
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Destination for HTML output (omit for stdout)
    #[arg(long)]
    html_out: Option<PathBuf>,

    /// Number of threads for batch-mode parallel query resolution
    #[arg(long, short = 't')]
    threads: Option<usize>,

    /// Increase logging verbosity (repeatable: -v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn open_input(cli: &Cli) -> Result<Box<dyn BufRead>, ResolveError> {
    match (&cli.input, cli.stdin) {
        (Some(_), true) => Err(ConfigError::AmbiguousInputSource.into()),
        (None, false) => Err(ConfigError::NoInputSource.into()),
        (Some(path), false) => Ok(Box::new(BufReader::new(File::open(path)?))),
        (None, true) => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(path: &Option<PathBuf>) -> Result<Box<dyn Write + Send>, ResolveError> {
    match path {
        Some(p) => Ok(Box::new(BufWriter::new(File::create(p)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn build_hit_source(cli: &Cli, reader: Box<dyn BufRead>) -> Box<dyn HitSource> {
    match cli.input_format {
        InputFormatArg::RawWithScores => Box::new(RawParser::new(reader, RawVariant::Scores)),
        InputFormatArg::RawWithEvalues => Box::new(RawParser::new(reader, RawVariant::Evalues)),
        InputFormatArg::HmmerDomtblout => {
            let coords = match cli.coords {
                CoordKindArg::Ali => CoordKind::Ali,
                CoordKindArg::Env => CoordKind::Env,
            };
            Box::new(DomtbloutParser::new(reader, coords))
        }
        InputFormatArg::HmmsearchOut => Box::new(HmmsearchParser::new(reader, cli.min_gap_length)),
    }
}

fn build_processors(cli: &Cli) -> Result<Vec<Box<dyn HitsProcessor>>, ResolveError> {
    let mut processors: Vec<Box<dyn HitsProcessor>> = Vec::new();
    for fmt in &cli.output_formats {
        match fmt {
            OutputFormatArg::Text => processors.push(Box::new(TextProcessor::new(open_output(&cli.text_out)?))),
            OutputFormatArg::Json => {
                let layout = if cli.json_array { JsonLayout::Array } else { JsonLayout::NdJson };
                processors.push(Box::new(JsonProcessor::new(open_output(&cli.json_out)?, layout)));
            }
            OutputFormatArg::Html => processors.push(Box::new(HtmlProcessor::new(open_output(&cli.html_out)?))),
        }
    }
    Ok(processors)
}

fn run(cli: Cli) -> Result<(), ResolveError> {
    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| ConfigError::InvalidOption {
                option: "threads",
                message: e.to_string(),
            })?;
    }

    let reader = open_input(&cli)?;
    let mut source = build_hit_source(&cli, reader);
    let processors = build_processors(&cli)?;

    let filter_spec = FilterSpec {
        min_score: cli.min_score,
        query_allowlist: if cli.query_allowlist.is_empty() {
            None
        } else {
            Some(cli.query_allowlist.iter().cloned().collect::<FxHashSet<String>>())
        },
        max_queries: cli.max_queries,
    };
    let score_spec = ScoreSpec {
        transform: if cli.score_scale == 1.0 && cli.score_offset == 0.0 {
            ScoreTransform::Neutral
        } else {
            ScoreTransform::Linear { scale: cli.score_scale, offset: cli.score_offset }
        },
        ..ScoreSpec::default()
    };
    let segment_spec = SegmentSpec {
        min_seg_length: cli.min_seg_length,
        overlap_trim_fraction: cli.overlap_trim_fraction,
    };

    let mut manager = Manager::new(processors, filter_spec, score_spec, segment_spec, cli.grouped, cli.naive_greedy);

    let mut queries_seen: FxHashSet<String> = FxHashSet::default();
    while let Some(hit) = source.next_hit()? {
        if let Some(max_queries) = cli.max_queries {
            if !queries_seen.contains(&hit.query_id) && queries_seen.len() >= max_queries {
                continue;
            }
        }
        queries_seen.insert(hit.query_id.clone());
        manager.add_hit(
            &hit.query_id,
            hit.record.segments,
            hit.record.label,
            hit.record.raw_score,
            hit.record.score_kind,
            hit.record.domain_type,
            hit.record.cond_evalue,
            hit.record.indp_evalue,
        )?;
    }
    manager.process_all_outstanding()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("resolve-hits: {e}");
            ExitCode::FAILURE
        }
    }
}
