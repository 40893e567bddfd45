//! Matcher implementations for query execution.
//!
//! A matcher walks the documents matching one query node in ascending id
//! order. It is positioned on its first match as soon as it is created;
//! [`Matcher::doc_id`] returns `u64::MAX` once it is exhausted.

use std::fmt::Debug;

use crate::error::Result;
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::lexical::index::inverted::core::PostingList;
use crate::query::scorer::BM25Scorer;
use crate::schema::Field;

/// Sentinel document id of an exhausted matcher.
pub const NO_MORE_DOCS: u64 = u64::MAX;

/// Trait for document matchers.
pub trait Matcher: Send + Debug {
    /// Get the current document ID.
    fn doc_id(&self) -> u64;

    /// Move to the next matching document.
    fn next(&mut self) -> Result<bool>;

    /// Move to the first matching document >= target.
    ///
    /// Does not move if the current document is already >= target.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Score of the current document.
    fn score(&self) -> f32;

    /// Get the cost of iterating through this matcher.
    fn cost(&self) -> u64;

    /// Check if this matcher is exhausted.
    fn is_exhausted(&self) -> bool {
        self.doc_id() == NO_MORE_DOCS
    }
}

/// A matcher that matches no documents.
#[derive(Debug, Default)]
pub struct EmptyMatcher;

impl EmptyMatcher {
    /// Create a new empty matcher.
    pub fn new() -> Self {
        EmptyMatcher
    }
}

impl Matcher for EmptyMatcher {
    fn doc_id(&self) -> u64 {
        NO_MORE_DOCS
    }

    fn next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn skip_to(&mut self, _target: u64) -> Result<bool> {
        Ok(false)
    }

    fn score(&self) -> f32 {
        0.0
    }

    fn cost(&self) -> u64 {
        0
    }
}

/// Cursor over a decoded posting list.
#[derive(Debug)]
struct PostingCursor {
    list: PostingList,
    index: usize,
}

impl PostingCursor {
    fn new(list: PostingList) -> Self {
        PostingCursor { list, index: 0 }
    }

    fn doc_id(&self) -> u64 {
        self.list
            .postings
            .get(self.index)
            .map_or(NO_MORE_DOCS, |p| p.doc_id)
    }

    fn frequency(&self) -> u32 {
        self.list.postings.get(self.index).map_or(0, |p| p.frequency)
    }

    fn positions(&self) -> &[u32] {
        self.list
            .postings
            .get(self.index)
            .map(|p| p.positions.as_slice())
            .unwrap_or_default()
    }

    fn next(&mut self) -> bool {
        if self.index < self.list.postings.len() {
            self.index += 1;
        }
        self.index < self.list.postings.len()
    }

    fn skip_to(&mut self, target: u64) -> bool {
        if self.doc_id() >= target {
            return self.doc_id() != NO_MORE_DOCS;
        }
        // Postings are sorted; search the remainder.
        let rest = &self.list.postings[self.index..];
        self.index += rest.partition_point(|p| p.doc_id < target);
        self.index < self.list.postings.len()
    }

    fn len(&self) -> u64 {
        self.list.postings.len() as u64
    }
}

/// Matches the documents of a single term's postings.
#[derive(Debug)]
pub struct TermMatcher<'a> {
    cursor: PostingCursor,
    field: Field,
    scorer: BM25Scorer,
    reader: &'a InvertedIndexReader,
}

impl<'a> TermMatcher<'a> {
    /// Create a matcher over `list`, the postings of a term in `field`.
    pub fn new(
        list: PostingList,
        field: Field,
        scorer: BM25Scorer,
        reader: &'a InvertedIndexReader,
    ) -> Self {
        TermMatcher {
            cursor: PostingCursor::new(list),
            field,
            scorer,
            reader,
        }
    }

    /// Term frequency in the current document.
    pub fn term_freq(&self) -> u32 {
        self.cursor.frequency()
    }
}

impl Matcher for TermMatcher<'_> {
    fn doc_id(&self) -> u64 {
        self.cursor.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        Ok(self.cursor.next())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        Ok(self.cursor.skip_to(target))
    }

    fn score(&self) -> f32 {
        if self.is_exhausted() {
            return 0.0;
        }
        let length = self.reader.field_length(self.doc_id(), self.field);
        self.scorer.score(self.term_freq() as f32, length as f32)
    }

    fn cost(&self) -> u64 {
        self.cursor.len()
    }
}

/// Matches documents containing a sequence of terms at fixed relative positions.
#[derive(Debug)]
pub struct PhraseMatcher<'a> {
    /// One cursor per phrase term with the term's offset within the phrase.
    cursors: Vec<(PostingCursor, u32)>,
    field: Field,
    scorer: BM25Scorer,
    reader: &'a InvertedIndexReader,
    current_doc: u64,
    phrase_freq: u32,
}

impl<'a> PhraseMatcher<'a> {
    /// Create a matcher from `(postings, offset)` pairs, one per phrase term.
    pub fn new(
        terms: Vec<(PostingList, u32)>,
        field: Field,
        scorer: BM25Scorer,
        reader: &'a InvertedIndexReader,
    ) -> Result<Self> {
        let mut matcher = PhraseMatcher {
            cursors: terms
                .into_iter()
                .map(|(list, offset)| (PostingCursor::new(list), offset))
                .collect(),
            field,
            scorer,
            reader,
            current_doc: 0,
            phrase_freq: 0,
        };
        matcher.advance(0)?;
        Ok(matcher)
    }

    /// Number of phrase occurrences in the current document.
    pub fn phrase_freq(&self) -> u32 {
        self.phrase_freq
    }

    /// Move to the first document >= target containing the phrase.
    fn advance(&mut self, mut target: u64) -> Result<()> {
        loop {
            let Some(doc) = self.align(target) else {
                self.current_doc = NO_MORE_DOCS;
                self.phrase_freq = 0;
                return Ok(());
            };

            let freq = self.count_occurrences();
            if freq > 0 {
                self.current_doc = doc;
                self.phrase_freq = freq;
                return Ok(());
            }
            target = doc + 1;
        }
    }

    /// Leapfrog all cursors to the first document >= target they all contain.
    fn align(&mut self, mut target: u64) -> Option<u64> {
        if self.cursors.is_empty() {
            return None;
        }
        loop {
            let mut agreed = true;
            for (cursor, _) in self.cursors.iter_mut() {
                if !cursor.skip_to(target) {
                    return None;
                }
                let doc = cursor.doc_id();
                if doc > target {
                    target = doc;
                    agreed = false;
                }
            }
            if agreed {
                return Some(target);
            }
        }
    }

    /// Count start positions at which every term sits at its offset.
    fn count_occurrences(&self) -> u32 {
        let Some(((first, first_offset), rest)) = self.cursors.split_first() else {
            return 0;
        };

        let mut count = 0;
        for &position in first.positions() {
            let Some(start) = position.checked_sub(*first_offset) else {
                continue;
            };
            let matched = rest.iter().all(|(cursor, offset)| {
                cursor
                    .positions()
                    .binary_search(&(start + offset))
                    .is_ok()
            });
            if matched {
                count += 1;
            }
        }
        count
    }
}

impl Matcher for PhraseMatcher<'_> {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            return Ok(false);
        }
        self.advance(self.current_doc + 1)?;
        Ok(!self.is_exhausted())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.current_doc >= target {
            return Ok(!self.is_exhausted());
        }
        self.advance(target)?;
        Ok(!self.is_exhausted())
    }

    fn score(&self) -> f32 {
        if self.is_exhausted() {
            return 0.0;
        }
        let length = self.reader.field_length(self.current_doc, self.field);
        self.scorer.score(self.phrase_freq as f32, length as f32)
    }

    fn cost(&self) -> u64 {
        self.cursors
            .iter()
            .map(|(cursor, _)| cursor.len())
            .min()
            .unwrap_or(0)
    }
}

/// Matches documents matched by every sub-matcher, scoring with the sum.
#[derive(Debug)]
pub struct ConjunctionMatcher<'a> {
    matchers: Vec<Box<dyn Matcher + 'a>>,
    current_doc: u64,
}

impl<'a> ConjunctionMatcher<'a> {
    /// Create a conjunction. The cheapest matcher leads the leapfrog.
    pub fn new(mut matchers: Vec<Box<dyn Matcher + 'a>>) -> Result<Self> {
        matchers.sort_by_key(|m| m.cost());
        let mut conjunction = ConjunctionMatcher {
            matchers,
            current_doc: NO_MORE_DOCS,
        };
        let start = conjunction
            .matchers
            .first()
            .map_or(NO_MORE_DOCS, |m| m.doc_id());
        conjunction.align(start)?;
        Ok(conjunction)
    }

    /// Advance every matcher to the first document >= target they all match.
    fn align(&mut self, mut target: u64) -> Result<()> {
        if self.matchers.is_empty() {
            self.current_doc = NO_MORE_DOCS;
            return Ok(());
        }
        'outer: loop {
            if target == NO_MORE_DOCS {
                self.current_doc = NO_MORE_DOCS;
                return Ok(());
            }
            for matcher in self.matchers.iter_mut() {
                if !matcher.skip_to(target)? {
                    self.current_doc = NO_MORE_DOCS;
                    return Ok(());
                }
                let doc = matcher.doc_id();
                if doc > target {
                    target = doc;
                    continue 'outer;
                }
            }
            self.current_doc = target;
            return Ok(());
        }
    }
}

impl Matcher for ConjunctionMatcher<'_> {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            return Ok(false);
        }
        self.align(self.current_doc + 1)?;
        Ok(!self.is_exhausted())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.current_doc >= target {
            return Ok(!self.is_exhausted());
        }
        self.align(target)?;
        Ok(!self.is_exhausted())
    }

    fn score(&self) -> f32 {
        if self.is_exhausted() {
            return 0.0;
        }
        self.matchers.iter().map(|m| m.score()).sum()
    }

    fn cost(&self) -> u64 {
        self.matchers.first().map_or(0, |m| m.cost())
    }
}

/// Matches documents matched by at least one sub-matcher.
///
/// The score is the sum over the sub-matchers positioned on the document.
#[derive(Debug)]
pub struct DisjunctionMatcher<'a> {
    matchers: Vec<Box<dyn Matcher + 'a>>,
    current_doc: u64,
}

impl<'a> DisjunctionMatcher<'a> {
    /// Create a disjunction positioned on the smallest first match.
    pub fn new(matchers: Vec<Box<dyn Matcher + 'a>>) -> Self {
        let mut disjunction = DisjunctionMatcher {
            matchers,
            current_doc: NO_MORE_DOCS,
        };
        disjunction.update_current();
        disjunction
    }

    fn update_current(&mut self) {
        self.current_doc = self
            .matchers
            .iter()
            .map(|m| m.doc_id())
            .min()
            .unwrap_or(NO_MORE_DOCS);
    }
}

impl Matcher for DisjunctionMatcher<'_> {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            return Ok(false);
        }
        let current = self.current_doc;
        for matcher in self.matchers.iter_mut() {
            if matcher.doc_id() == current {
                matcher.next()?;
            }
        }
        self.update_current();
        Ok(!self.is_exhausted())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.current_doc >= target {
            return Ok(!self.is_exhausted());
        }
        for matcher in self.matchers.iter_mut() {
            if matcher.doc_id() < target {
                matcher.skip_to(target)?;
            }
        }
        self.update_current();
        Ok(!self.is_exhausted())
    }

    fn score(&self) -> f32 {
        if self.is_exhausted() {
            return 0.0;
        }
        self.matchers
            .iter()
            .filter(|m| m.doc_id() == self.current_doc)
            .map(|m| m.score())
            .sum()
    }

    fn cost(&self) -> u64 {
        self.matchers.iter().map(|m| m.cost()).sum()
    }
}

/// Walks the documents of a required matcher, adding the score of an
/// optional matcher where it also matches.
#[derive(Debug)]
pub struct ReqOptMatcher<'a> {
    required: Box<dyn Matcher + 'a>,
    optional: Box<dyn Matcher + 'a>,
}

impl<'a> ReqOptMatcher<'a> {
    /// Create the matcher and line the optional side up with the required one.
    pub fn new(required: Box<dyn Matcher + 'a>, optional: Box<dyn Matcher + 'a>) -> Result<Self> {
        let mut matcher = ReqOptMatcher { required, optional };
        matcher.sync_optional()?;
        Ok(matcher)
    }

    fn sync_optional(&mut self) -> Result<()> {
        let doc = self.required.doc_id();
        if doc != NO_MORE_DOCS && self.optional.doc_id() < doc {
            self.optional.skip_to(doc)?;
        }
        Ok(())
    }
}

impl Matcher for ReqOptMatcher<'_> {
    fn doc_id(&self) -> u64 {
        self.required.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        let more = self.required.next()?;
        self.sync_optional()?;
        Ok(more)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        let more = self.required.skip_to(target)?;
        self.sync_optional()?;
        Ok(more)
    }

    fn score(&self) -> f32 {
        if self.is_exhausted() {
            return 0.0;
        }
        let mut score = self.required.score();
        if self.optional.doc_id() == self.required.doc_id() {
            score += self.optional.score();
        }
        score
    }

    fn cost(&self) -> u64 {
        self.required.cost()
    }
}
