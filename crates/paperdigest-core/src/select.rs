//! Picks the single best paper out of an arXiv search listing.
//!
//! Relevance is the number of highlighted query terms in an entry's title.
//! Entries are scanned in document order and only a strictly higher score
//! replaces the current pick, so the first entry reaching the maximum wins.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

pub const DEFAULT_PDF_BASE_URL: &str = "https://arxiv.org/pdf/";

static ENTRY: Lazy<Selector> = Lazy::new(|| Selector::parse("li.arxiv-result").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("p.title.is-5.mathjax").unwrap());
static HIT: Lazy<Selector> = Lazy::new(|| Selector::parse("span.search-hit.mathjax").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("p.list-title a").unwrap());

/// A scored listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Highlighted terms inside the title.
    pub score: usize,
    /// `href` of the entry's abstract-page link, if it has one.
    pub link: Option<String>,
}

/// The paper chosen for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedResource {
    pub paper_id: String,
    pub locator: String,
    pub score: usize,
}

/// Score every titled entry in the listing, in document order.
///
/// Entries without a title paragraph are left out entirely.
pub fn parse_candidates(html: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    document
        .select(&ENTRY)
        .filter_map(score_entry)
        .collect()
}

fn score_entry(entry: ElementRef<'_>) -> Option<Candidate> {
    let title = entry.select(&TITLE).next()?;
    let score = title.select(&HIT).count();
    let link = entry
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);
    Some(Candidate { score, link })
}

/// Final path segment of an abstract link, e.g. `1706.03762` for
/// `https://arxiv.org/abs/1706.03762`.
pub fn paper_id_from_link(link: &str) -> Option<&str> {
    link.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Download locator for an abstract link: `pdf_base` followed by the paper id.
pub fn pdf_locator(pdf_base: &str, link: &str) -> Option<String> {
    paper_id_from_link(link).map(|id| format!("{pdf_base}{id}"))
}

/// Pick the first candidate with the highest non-zero score.
///
/// A candidate whose link yields no paper id is passed over without raising
/// the running maximum.
pub fn select_best(candidates: &[Candidate], pdf_base: &str) -> Option<SelectedResource> {
    let mut max_score = 0;
    let mut best = None;

    for candidate in candidates {
        if candidate.score <= max_score {
            continue;
        }
        let Some(link) = candidate.link.as_deref() else {
            continue;
        };
        let (Some(id), Some(locator)) = (paper_id_from_link(link), pdf_locator(pdf_base, link))
        else {
            continue;
        };
        max_score = candidate.score;
        best = Some(SelectedResource {
            paper_id: id.to_string(),
            locator,
            score: candidate.score,
        });
    }

    best
}

/// Parse a listing and select the best paper. `None` means no entry had a
/// highlighted title term.
pub fn select_resource(html: &str, pdf_base: &str) -> Option<SelectedResource> {
    let candidates = parse_candidates(html);
    tracing::debug!(candidates = candidates.len(), "parsed listing");
    select_best(&candidates, pdf_base)
}
