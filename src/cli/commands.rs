//! Command implementations for the papersift CLI.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PaperSiftConfig;
use crate::document::DirectoryScanner;
use crate::error::Result;
use crate::lexical::index::inverted::{InvertedIndexReader, InvertedIndexWriter};
use crate::lexical::index::{IndexBuilder, IngestEvent};
use crate::lexical::search::IndexSearcher;
use crate::query::{ParsedQuery, Query, QueryParser};
use crate::schema::Field;
use crate::storage::{FileStorage, Storage, StorageConfig};

/// Query forms shown at the start of an interactive session.
pub const QUERY_EXAMPLES: [&str; 3] = ["title:term", "abstract:\"phrase\"", "title:x,abstract:y"];

/// Prompt of the interactive session.
pub const PROMPT: &str = "Query > ";

/// Execute a CLI command.
pub fn execute_command(args: PaperSiftArgs) -> Result<()> {
    let mut config = PaperSiftConfig::load_or_default(args.config.as_deref())?;
    args.command.apply_overrides(&mut config);
    config.validate()?;

    match &args.command {
        Command::Index(_) => index_papers(&config, &args),
        Command::Search(search_args) => search_index(&search_args.queries, &config, &args),
        Command::Stats(_) => show_stats(&config, &args),
    }
}

/// Build the index from the source directory.
fn index_papers(config: &PaperSiftConfig, cli_args: &PaperSiftArgs) -> Result<()> {
    let source_dir = &config.source_dir;
    let index_path = &config.index_path;

    // Nothing at the index location is touched until the source checks out.
    let scanner = DirectoryScanner::new(source_dir);
    scanner.validate()?;
    let paths = scanner.scan();

    let human = cli_args.output_format == OutputFormat::Human;
    if human {
        println!(
            "Found {} .txt files in {}",
            paths.len(),
            source_dir.display()
        );
    }

    let storage: Arc<dyn Storage> =
        Arc::new(FileStorage::new(index_path, StorageConfig::default())?);
    let writer = InvertedIndexWriter::create(storage.clone(), config.writer_config())?;
    let mut builder = IndexBuilder::new(writer);

    let stats = builder.index_files(&paths, |event| {
        if !human {
            return;
        }
        match event {
            IngestEvent::Indexed { path, doc_id } => {
                println!("Indexing [{doc_id}] {}", display_name(path));
            }
            IngestEvent::Skipped { path, reason } => {
                println!("Skipping {}: {reason}", display_name(path));
            }
        }
    })?;
    builder.commit()?;

    let reader = InvertedIndexReader::open(storage)?;

    output_result(
        "Indexing complete",
        &IndexReport {
            source_dir: source_dir.display().to_string(),
            index_path: index_path.display().to_string(),
            files_found: stats.files_found,
            files_indexed: stats.indexed,
            skipped: stats.skipped.clone(),
            total_time_ms: millis(stats.elapsed),
            average_time_ms: millis(stats.average_per_file()),
            total_documents: reader.doc_count(),
        },
        cli_args,
    )
}

/// Run the given queries, or an interactive session when there are none.
fn search_index(
    queries: &[String],
    config: &PaperSiftConfig,
    cli_args: &PaperSiftArgs,
) -> Result<()> {
    let searcher = open_searcher(&config.index_path, config)?;
    let parser = searcher.query_parser();
    let top_k = config.top_k;

    match queries {
        [] => {
            let stdin = io::stdin();
            run_session(stdin.lock(), &searcher, &parser, top_k, cli_args)
        }
        [query] => run_query(&searcher, &parser, query, top_k, cli_args),
        queries => run_batch(&searcher, &parser, queries, top_k, cli_args),
    }
}

/// Parse, execute and print one query.
fn run_query(
    searcher: &IndexSearcher,
    parser: &QueryParser,
    query: &str,
    top_k: usize,
    cli_args: &PaperSiftArgs,
) -> Result<()> {
    let start = Instant::now();
    let parsed = parser.parse(query)?;
    let results = searcher.search(parsed.query.as_ref(), top_k)?;
    let report = QueryReport::new(query.trim(), &parsed, results, start.elapsed());
    output_result("", &report, cli_args)
}

/// Execute several queries in parallel and print them in input order.
fn run_batch(
    searcher: &IndexSearcher,
    parser: &QueryParser,
    queries: &[String],
    top_k: usize,
    cli_args: &PaperSiftArgs,
) -> Result<()> {
    let parsed = queries
        .iter()
        .map(|query| parser.parse(query))
        .collect::<Result<Vec<ParsedQuery>>>()?;
    let trees: Vec<Box<dyn Query>> = parsed.iter().map(|p| p.query.clone()).collect();

    let start = Instant::now();
    let results = searcher.search_batch(&trees, top_k);
    let elapsed = start.elapsed();

    for ((query, parsed), results) in queries.iter().zip(&parsed).zip(results) {
        let report = QueryReport::new(query.trim(), parsed, results?, elapsed);
        output_result("", &report, cli_args)?;
        if cli_args.output_format == OutputFormat::Human {
            println!();
        }
    }
    Ok(())
}

/// Read queries from `input` until `exit` or end of input.
///
/// Query errors are printed and the session continues.
pub fn run_session<R: BufRead>(
    input: R,
    searcher: &IndexSearcher,
    parser: &QueryParser,
    top_k: usize,
    cli_args: &PaperSiftArgs,
) -> Result<()> {
    println!("Enter a query, for example:");
    for example in QUERY_EXAMPLES {
        println!("  '{example}'");
    }
    println!("Type 'exit' to quit.");

    let mut lines = input.lines();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Err(e) = run_query(searcher, parser, query, top_k, cli_args) {
            eprintln!("Error: {e}");
        }
    }
    Ok(())
}

/// Print index statistics.
fn show_stats(config: &PaperSiftConfig, cli_args: &PaperSiftArgs) -> Result<()> {
    let index_path = &config.index_path;
    let searcher = open_searcher(index_path, config)?;
    let reader = searcher.reader();

    let fields = Field::ALL
        .iter()
        .map(|&field| {
            let stats = reader.field_stats(field);
            FieldReport {
                field,
                unique_terms: reader.unique_terms(field),
                total_tokens: stats.total_length,
                average_length: stats.average_length(),
            }
        })
        .collect();

    output_result(
        "",
        &StatsReport {
            index_path: index_path.display().to_string(),
            doc_count: reader.doc_count(),
            committed_at: reader.meta().created_at.to_rfc3339(),
            fields,
        },
        cli_args,
    )
}

/// Open the committed index at `index_path` for searching.
pub fn open_searcher(index_path: &Path, config: &PaperSiftConfig) -> Result<IndexSearcher> {
    let storage = Arc::new(FileStorage::open(index_path, StorageConfig::default())?);
    let reader = InvertedIndexReader::open(storage)?;
    Ok(IndexSearcher::with_bm25(Arc::new(reader), config.bm25))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;
    use crate::error::PaperSiftError;

    fn cli(args: &[&str]) -> PaperSiftArgs {
        PaperSiftArgs::try_parse_from(std::iter::once("papersift").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_index_then_search() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("papers");
        let index = temp_dir.path().join("index");
        fs::create_dir(&source).unwrap();
        fs::write(
            source.join("a.txt"),
            "Title: Neural Ranking\nAbstract: Learning to rank papers.",
        )
        .unwrap();

        let source_arg = source.to_str().unwrap();
        let index_arg = index.to_str().unwrap();
        execute_command(cli(&["-q", "index", "-s", source_arg, "-i", index_arg])).unwrap();

        let searcher = open_searcher(&index, &PaperSiftConfig::default()).unwrap();
        assert_eq!(searcher.doc_count(), 1);

        let parser = searcher.query_parser();
        let input = "\n  \ntitle:\ntitle:neural\nEXIT\ntitle:never-run\n".as_bytes();
        run_session(input, &searcher, &parser, 10, &cli(&["-q", "stats"])).unwrap();

        execute_command(cli(&["-q", "stats", "-i", index_arg])).unwrap();

        // A zero limit is rejected before any search runs.
        let err = execute_command(cli(&["-q", "search", "-i", index_arg, "-l", "0", "title:neural"]))
            .unwrap_err();
        assert!(matches!(err, PaperSiftError::Configuration(_)), "{err}");
    }

    #[test]
    fn test_missing_source_keeps_index() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("papers");
        let index = temp_dir.path().join("index");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "Title: Kept").unwrap();

        let index_arg = index.to_str().unwrap();
        execute_command(cli(&["-q", "index", "-s", source.to_str().unwrap(), "-i", index_arg]))
            .unwrap();

        let missing = temp_dir.path().join("missing");
        let result = execute_command(cli(&[
            "-q",
            "index",
            "-s",
            missing.to_str().unwrap(),
            "-i",
            index_arg,
        ]));
        assert!(result.is_err());

        let searcher = open_searcher(&index, &PaperSiftConfig::default()).unwrap();
        assert_eq!(searcher.doc_count(), 1);
    }
}
