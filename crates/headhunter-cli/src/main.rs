use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use headhunter_config::Config;
use headhunter_engine::{DocumentInput, DocumentMetadata, MatchOptions, ParsedDocument, ParserConfig, process_batch};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Nested sections as JSON
    Json,
    /// ASCII tree of headings
    Tree,
    /// Regenerated Markdown
    Markdown,
    /// One JSON object per content block
    Rows,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Tree => "txt",
            OutputFormat::Markdown => "md",
            OutputFormat::Rows => "jsonl",
        }
    }
}

/// Infer heading structure from loosely formatted Markdown notes.
#[derive(Debug, Parser)]
#[command(name = "headhunter", version)]
struct Cli {
    /// Markdown files or glob patterns
    #[arg(required = true, value_name = "INPUTS")]
    inputs: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
    format: OutputFormat,

    /// Expected heading, in document order (repeatable)
    #[arg(short = 'e', long = "expect", value_name = "HEADING")]
    expect: Vec<String>,

    /// Minimum fuzzy score for an expected heading match
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,

    /// Config file (defaults to ~/.config/headhunter/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Longest label, in words, still treated as a heading
    #[arg(long, value_name = "N")]
    max_words: Option<usize>,

    /// Write one file per document here instead of stdout
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let failures = run(&cli)?;
    if failures > 0 {
        eprintln!("{failures} document(s) failed");
        process::exit(1);
    }
    Ok(())
}

/// Processes every input and returns the number of documents that failed.
fn run(cli: &Cli) -> Result<usize> {
    let config = load_config(cli.config.as_deref())?;

    let (mut parser, config_warnings) = config.parser_config().context("Invalid [parser] configuration")?;
    for warning in &config_warnings {
        warn!("{warning}");
    }
    if let Some(max_words) = cli.max_words {
        parser = parser.with_heading_max_words(max_words);
    }
    let options = match_options(cli, &config);

    let paths = expand_inputs(&cli.inputs)?;
    if paths.is_empty() {
        bail!("No input files matched");
    }

    let mut failures = 0;
    let mut inputs = Vec::with_capacity(paths.len());
    let mut sources = Vec::with_capacity(paths.len());
    let ids = document_ids(&paths);
    for (path, id) in paths.into_iter().zip(ids) {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                inputs.push(DocumentInput::new(text, document_metadata(&path, id)));
                sources.push(path);
            }
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
            }
        }
    }

    let output_dir = cli.output_dir.clone().or(config.output_dir.clone());
    write_batch(&inputs, &sources, &parser, options.as_ref(), cli.format, output_dir.as_deref())
        .map(|batch_failures| failures + batch_failures)
}

fn write_batch(
    inputs: &[DocumentInput],
    sources: &[PathBuf],
    parser: &ParserConfig,
    options: Option<&MatchOptions>,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<usize> {
    let batch = process_batch(inputs.iter().cloned(), parser, options);
    for warning in &batch.warnings {
        warn!("{warning}");
    }
    for error in &batch.errors {
        let source = sources.get(error.index).map(|p| p.display().to_string()).unwrap_or_default();
        eprintln!("{source}: {} error: {}", error.kind, error.message);
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let mut written = HashSet::new();
    for document in &batch.documents {
        let rendered = render(document, format)?;
        match output_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.{}", document.id(), format.extension()));
                if !written.insert(path.clone()) {
                    bail!("Two documents share the id '{}'; refusing to overwrite {}", document.id(), path.display());
                }
                std::fs::write(&path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {}", path.display());
            }
            None => println!("{rendered}"),
        }
    }

    debug!(
        "Processed {} documents, {} failed",
        batch.total(),
        batch.errors.len()
    );
    Ok(batch.errors.len())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => match Config::load_from_path(path)? {
            Some(config) => Ok(config),
            None => bail!("Config file not found: {}", path.display()),
        },
        None => Ok(Config::load()?.unwrap_or_default()),
    }
}

/// Expected headings from the command line win over the config file.
fn match_options(cli: &Cli, config: &Config) -> Option<MatchOptions> {
    let threshold = cli.threshold.unwrap_or(config.matching.threshold);
    if cli.expect.is_empty() {
        config.match_options().map(|options| options.with_threshold(threshold))
    } else {
        Some(MatchOptions::new(cli.expect.iter().cloned()).with_threshold(threshold))
    }
}

fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched = 0;
        for entry in glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))? {
            match entry {
                Ok(path) if path.is_file() => {
                    paths.push(path);
                    matched += 1;
                }
                Ok(_) => {}
                Err(err) => warn!("Skipping unreadable path: {err}"),
            }
        }
        if matched == 0 {
            warn!("Pattern matched no files: {pattern}");
        }
    }

    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));
    Ok(paths)
}

/// One id per input, used as the output file name.
///
/// Ids are file stems. Inputs sharing a stem are prefixed with their parent
/// directory name, and any id still taken gets a numeric suffix.
fn document_ids(paths: &[PathBuf]) -> Vec<String> {
    let stem = |path: &Path| {
        path.file_stem()
            .map_or_else(|| "document".to_string(), |s| s.to_string_lossy().into_owned())
    };
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for path in paths {
        *stem_counts.entry(stem(path)).or_default() += 1;
    }

    let mut taken = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let base = stem(path);
            let preferred = match path.parent().and_then(Path::file_name) {
                Some(parent) if stem_counts.get(&base).is_some_and(|&n| n > 1) => {
                    format!("{}-{base}", parent.to_string_lossy())
                }
                _ => base,
            };
            let mut id = preferred.clone();
            let mut suffix = 2;
            while !taken.insert(id.clone()) {
                id = format!("{preferred}-{suffix}");
                suffix += 1;
            }
            id
        })
        .collect()
}

fn document_metadata(path: &Path, id: String) -> DocumentMetadata {
    let mut metadata = DocumentMetadata::with_id(id);
    metadata.insert("source_path", path.display().to_string());
    metadata
}

fn render(document: &ParsedDocument, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&document.to_sections())?,
        OutputFormat::Tree => document.to_tree(true, true),
        OutputFormat::Markdown => document.to_markdown(),
        OutputFormat::Rows => document
            .to_rows()
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"),
    };
    Ok(rendered)
}
