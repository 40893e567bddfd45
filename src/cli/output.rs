//! Output formatting for CLI commands.

use std::time::Duration;

use serde::Serialize;

use crate::cli::args::{OutputFormat, PaperSiftArgs};
use crate::error::Result;
use crate::lexical::index::SkippedFile;
use crate::query::{ParsedQuery, SearchResults};
use crate::schema::Field;

/// A command result that can be printed for people or as JSON.
pub trait Report: Serialize {
    /// Print in human-readable form.
    fn print_human(&self);
}

/// Result of the `index` command.
#[derive(Debug, Serialize)]
pub struct IndexReport {
    pub source_dir: String,
    pub index_path: String,
    pub files_found: usize,
    pub files_indexed: usize,
    pub skipped: Vec<SkippedFile>,
    pub total_time_ms: f64,
    pub average_time_ms: f64,
    pub total_documents: u64,
}

/// One ranked hit.
#[derive(Debug, Serialize)]
pub struct HitReport {
    pub rank: usize,
    pub doc_id: u64,
    pub score: f32,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub filename: String,
}

/// Which fields a query searched.
#[derive(Debug, Serialize)]
pub struct Coverage {
    pub title: bool,
    #[serde(rename = "abstract")]
    pub abstract_text: bool,
}

/// Result of one query.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub hits: Vec<HitReport>,
    pub coverage: Coverage,
    pub total_hits: u64,
    pub returned: usize,
    pub elapsed_ms: f64,
}

impl QueryReport {
    /// Build a report from a parsed query and its results.
    pub fn new(query: &str, parsed: &ParsedQuery, results: SearchResults, elapsed: Duration) -> Self {
        let hits: Vec<HitReport> = results
            .hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| {
                let document = hit.document.unwrap_or_default();
                HitReport {
                    rank: i + 1,
                    doc_id: hit.doc_id,
                    score: hit.score,
                    title: document.title,
                    abstract_text: document.abstract_text,
                    filename: document.filename,
                }
            })
            .collect();

        QueryReport {
            query: query.to_string(),
            returned: hits.len(),
            hits,
            coverage: Coverage {
                title: parsed.touches(Field::Title),
                abstract_text: parsed.touches(Field::Abstract),
            },
            total_hits: results.total_hits,
            elapsed_ms: millis(elapsed),
        }
    }
}

/// Per-field statistics.
#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub field: Field,
    pub unique_terms: u64,
    pub total_tokens: u64,
    pub average_length: f32,
}

/// Result of the `stats` command.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub index_path: String,
    pub doc_count: u64,
    pub committed_at: String,
    pub fields: Vec<FieldReport>,
}

/// Duration in fractional milliseconds.
pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Output a result in the specified format.
pub fn output_result<T: Report>(message: &str, result: &T, args: &PaperSiftArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 && !message.is_empty() {
                println!("{message}");
                println!();
            }
            result.print_human();
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PaperSiftArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl Report for IndexReport {
    fn print_human(&self) {
        println!("Indexing Statistics:");
        println!("════════════════════");
        println!("Source directory: {}", self.source_dir);
        println!("Index directory: {}", self.index_path);
        println!("Total files indexed: {}", self.files_indexed);
        println!("Files skipped: {}", self.skipped.len());
        for skipped in &self.skipped {
            println!("  {}: {}", skipped.path.display(), skipped.reason);
        }
        println!("Total time: {:.2}ms", self.total_time_ms);
        println!("Average time per file: {:.2}ms", self.average_time_ms);
        println!("Total documents in index: {}", self.total_documents);
    }
}

impl Report for QueryReport {
    fn print_human(&self) {
        println!("Search Results for: {}", self.query);
        println!("═══════════════");

        if self.hits.is_empty() {
            println!();
            println!("No matching papers.");
        }

        for hit in &self.hits {
            println!();
            println!("Result {}: (Score: {:.3})", hit.rank, hit.score);
            println!("─────────────");
            println!("Title: {}", hit.title);
            println!("Abstract: {}", hit.abstract_text);
            println!("File: {}", hit.filename);
        }

        println!();
        println!("Fields searched:");
        println!("  title: {}", yes_no(self.coverage.title));
        println!("  abstract: {}", yes_no(self.coverage.abstract_text));
        println!("Total hits: {}", self.total_hits);
        println!("Documents returned: {}", self.returned);
        println!("Search time: {:.2}ms", self.elapsed_ms);
    }
}

impl Report for StatsReport {
    fn print_human(&self) {
        println!("Index Statistics:");
        println!("════════════════");
        println!("Index directory: {}", self.index_path);
        println!("Total documents: {}", self.doc_count);
        println!("Committed at: {}", self.committed_at);

        println!();
        println!("Field Statistics:");
        println!("─────────────────");
        for field in &self.fields {
            println!("{}:", field.field);
            println!("  Unique terms: {}", field.unique_terms);
            println!("  Total tokens: {}", field.total_tokens);
            println!("  Average length: {:.2}", field.average_length);
        }
    }
}
