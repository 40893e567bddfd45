//! Integration tests for query parsing, matching and ranking.

use std::sync::Arc;
use std::thread;

use papersift::document::{ExtractedFields, PaperDocument};
use papersift::error::{ParseError, PaperSiftError, Result};
use papersift::lexical::index::inverted::{InvertedIndexWriter, InvertedIndexWriterConfig};
use papersift::lexical::search::IndexSearcher;
use papersift::query::{BooleanQuery, PhraseQuery, SearchResults, TermQuery};
use papersift::schema::Field;
use papersift::storage::MemoryStorage;

fn paper(name: &str, title: &str, abstract_text: &str) -> PaperDocument {
    PaperDocument::new(format!("papers/{name}"), name, title, abstract_text)
}

fn searcher(papers: Vec<PaperDocument>) -> Result<IndexSearcher> {
    let mut writer = InvertedIndexWriter::create(
        Arc::new(MemoryStorage::new()),
        InvertedIndexWriterConfig::default(),
    )?;
    for paper in papers {
        writer.add_document(paper)?;
    }
    Ok(IndexSearcher::new(Arc::new(writer.commit()?)))
}

fn run(searcher: &IndexSearcher, query: &str) -> Result<SearchResults> {
    let parsed = searcher.query_parser().parse(query)?;
    searcher.search(parsed.query.as_ref(), 10)
}

fn ids(results: &SearchResults) -> Vec<u64> {
    results.hits.iter().map(|hit| hit.doc_id).collect()
}

#[test]
fn test_every_title_term_is_findable() -> Result<()> {
    let title = "Graph-Based Learning for GPT4 Models";
    let searcher = searcher(vec![
        paper("a.txt", "Unrelated Work", "Nothing here."),
        paper("b.txt", title, "Abstract text."),
    ])?;

    let analyzer = searcher.reader().analyzers().for_field(Field::Title).clone();
    let terms: Vec<String> = analyzer.analyze(title)?.map(|token| token.text).collect();
    assert!(terms.contains(&"based".to_string()));
    assert!(terms.contains(&"gpt".to_string()));

    for term in terms {
        let results = run(&searcher, &format!("title:{term}"))?;
        assert!(ids(&results).contains(&1), "title:{term} missed the paper");
    }

    // Surface forms are analyzed the same way at query time.
    assert_eq!(ids(&run(&searcher, "title:Graph-Based")?), vec![1]);
    assert_eq!(ids(&run(&searcher, "title:GPT4")?), vec![1]);
    Ok(())
}

#[test]
fn test_and_of_term_and_phrase() -> Result<()> {
    let searcher = searcher(vec![
        paper("a.txt", "Neural Message Passing", "On graph networks for chemistry."),
        paper("b.txt", "Neural Ranking", "Networks over a graph of documents."),
        paper("c.txt", "Symbolic Reasoning", "Graph networks without learning."),
    ])?;

    let parsed = searcher
        .query_parser()
        .parse("title:neural,abstract:\"graph networks\"")?;
    let boolean = parsed
        .query
        .as_any()
        .downcast_ref::<BooleanQuery>()
        .unwrap();
    assert_eq!(boolean.clauses().len(), 2);
    let term = boolean.clauses()[0]
        .query
        .as_any()
        .downcast_ref::<TermQuery>()
        .unwrap();
    assert_eq!((term.field(), term.term()), (Field::Title, "neural"));
    let phrase = boolean.clauses()[1]
        .query
        .as_any()
        .downcast_ref::<PhraseQuery>()
        .unwrap();
    assert_eq!(phrase.field(), Field::Abstract);

    let results = searcher.search(parsed.query.as_ref(), 10)?;
    assert_eq!(ids(&results), vec![0]);
    assert_eq!(results.total_hits, 1);

    let err = searcher
        .query_parser()
        .parse("title:a,abstract:b,title:c")
        .unwrap_err();
    assert!(matches!(
        err,
        PaperSiftError::Parse(ParseError::TooManyClauses { .. })
    ));
    Ok(())
}

#[test]
fn test_words_in_one_expression_need_only_one_match() -> Result<()> {
    let searcher = searcher(vec![
        paper("a.txt", "Graph Kernels", "x"),
        paper("b.txt", "Transformer Models", "x"),
        paper("c.txt", "Protein Folding", "x"),
        paper("d.txt", "Graph Transformer Networks", "x"),
    ])?;

    let results = run(&searcher, "title:graph transformer")?;
    assert_eq!(results.total_hits, 3);
    // Matching both words ranks first.
    assert_eq!(results.hits[0].doc_id, 3);

    let results = run(&searcher, "title:graph-transformer")?;
    assert_eq!(results.total_hits, 3);

    // Quoted text still has to match as a phrase.
    assert_eq!(ids(&run(&searcher, "title:\"graph transformer\"")?), vec![3]);

    // Clauses are still all required.
    assert_eq!(
        ids(&run(&searcher, "title:kernels transformer,title:graph")?),
        vec![0, 3]
    );
    Ok(())
}

#[test]
fn test_stop_word_expression_finds_nothing() -> Result<()> {
    let searcher = searcher(vec![
        paper("a.txt", "Graph Kernels", "The theory of graphs."),
        paper("b.txt", "Transformer Models", "The attention mechanism."),
    ])?;

    let results = run(&searcher, "abstract:the")?;
    assert_eq!(results.total_hits, 0);
    assert!(results.is_empty());

    let results = run(&searcher, "title:graph,abstract:the")?;
    assert_eq!(results.total_hits, 0);

    let parsed = searcher.query_parser().parse("title:graph,abstract:the")?;
    assert!(parsed.touches(Field::Title));
    assert!(parsed.touches(Field::Abstract));
    Ok(())
}

#[test]
fn test_phrase_requires_adjacency() -> Result<()> {
    let searcher = searcher(vec![
        paper("a.txt", "A", "Deep graph networks."),
        paper("b.txt", "B", "Networks graph inversion."),
        paper("c.txt", "C", "Graph neural deep networks."),
        paper("d.txt", "D", "A graph of networks."),
    ])?;

    assert_eq!(ids(&run(&searcher, "abstract:\"graph networks\"")?), vec![0]);
    // The stop word keeps its slot on both sides.
    assert_eq!(ids(&run(&searcher, "abstract:\"graph of networks\"")?), vec![3]);
    assert_eq!(run(&searcher, "abstract:graph networks")?.total_hits, 4);
    Ok(())
}

#[test]
fn test_ranking_monotonicity() -> Result<()> {
    let searcher = searcher(vec![
        paper("y.txt", "Y", "graph model data set text"),
        paper("x.txt", "X", "graph graph graph graph graph"),
    ])?;

    let results = run(&searcher, "abstract:graph")?;
    assert_eq!(ids(&results), vec![1, 0]);
    assert!(results.hits[0].score >= results.hits[1].score);
    assert_eq!(results.max_score, results.hits[0].score);
    Ok(())
}

#[test]
fn test_rarer_terms_score_higher() -> Result<()> {
    let searcher = searcher(vec![
        paper("a.txt", "common rare", "x"),
        paper("b.txt", "common", "x"),
        paper("c.txt", "common", "x"),
    ])?;

    let common = run(&searcher, "title:common")?;
    let rare = run(&searcher, "title:rare")?;
    let common_score = common.hits.iter().find(|h| h.doc_id == 0).unwrap().score;
    assert!(rare.hits[0].score > common_score);
    Ok(())
}

#[test]
fn test_ties_break_by_doc_id_and_total_survives_truncation() -> Result<()> {
    let papers = (0..5)
        .map(|i| paper(&format!("{i}.txt"), "Identical Title", "Identical abstract."))
        .collect();
    let searcher = searcher(papers)?;

    let parsed = searcher.query_parser().parse("title:identical")?;
    let results = searcher.search(parsed.query.as_ref(), 3)?;
    assert_eq!(ids(&results), vec![0, 1, 2]);
    assert_eq!(results.total_hits, 5);
    Ok(())
}

#[test]
fn test_no_match_is_empty_not_error() -> Result<()> {
    let searcher = searcher(vec![paper("a.txt", "Graphs", "Graphs.")])?;

    let results = run(&searcher, "title:transformers")?;
    assert!(results.is_empty());
    assert_eq!(results.total_hits, 0);
    assert_eq!(results.max_score, 0.0);
    Ok(())
}

#[test]
fn test_fields_are_separate_term_spaces() -> Result<()> {
    let searcher = searcher(vec![
        paper("a.txt", "Attention", "Convolutions only."),
        paper("b.txt", "Convolutions", "Attention everywhere."),
    ])?;

    assert_eq!(ids(&run(&searcher, "title:attention")?), vec![0]);
    assert_eq!(ids(&run(&searcher, "abstract:attention")?), vec![1]);
    assert!(run(&searcher, "title:attention,abstract:attention")?.is_empty());
    Ok(())
}

#[test]
fn test_concurrent_searches_are_repeatable() -> Result<()> {
    let searcher = Arc::new(searcher(vec![
        paper("a.txt", "Graph Learning", "Graph networks learn."),
        paper("b.txt", "Graph Theory", "Graph coloring."),
        paper("c.txt", "Learning Theory", "Bounds."),
    ])?);
    let expected = run(&searcher, "title:graph")?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let searcher = Arc::clone(&searcher);
            thread::spawn(move || run(&searcher, "title:graph"))
        })
        .collect();

    for handle in handles {
        let results = handle.join().unwrap()?;
        assert_eq!(ids(&results), ids(&expected));
        let scores: Vec<f32> = results.hits.iter().map(|h| h.score).collect();
        let expected_scores: Vec<f32> = expected.hits.iter().map(|h| h.score).collect();
        assert_eq!(scores, expected_scores);
    }
    Ok(())
}

#[test]
fn test_extraction_examples() {
    let fields = ExtractedFields::from_text("Title: Foo Bar\nAbstract: X\nY\nIntroduction\nZ");
    assert_eq!(fields.title, "Foo Bar");
    assert_eq!(fields.abstract_text, "X Y");

    let fields = ExtractedFields::from_text("Abstract: only an abstract");
    assert_eq!(fields.title, "Unknown title");
}
