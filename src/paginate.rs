//! Shared pagination primitive.
//!
//! Both the article body extractor and the comment extractor are "fetch
//! page N, decide whether to continue" loops; [`paginate`] is that loop,
//! parameterized over the fetch and the stop decision so the extractors
//! only supply their own termination rules.

use std::future::Future;
use tracing::{debug, warn};

use crate::models::PageOutcome;

/// Decision returned by the stop predicate after each fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// Keep the page and fetch the next one.
    Continue,
    /// Discard the current page and stop.
    StopExclude,
    /// Keep the current page and stop.
    StopInclude,
}

/// Drive `fetch` for pages 1, 2, ... up to `max_pages`, returning the
/// accepted payloads in order.
///
/// The stop predicate sees the current payload, the previously accepted
/// payload (if any), and the number of pages accepted so far. A fetch
/// that reports [`PageOutcome::Empty`] or [`PageOutcome::Failed`] ends
/// pagination gracefully; everything accepted so far is kept.
pub async fn paginate<P, F, Fut, S>(mut fetch: F, max_pages: usize, mut stop: S) -> Vec<P>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = PageOutcome<P>>,
    S: FnMut(&P, Option<&P>, usize) -> StopDecision,
{
    let mut accepted: Vec<P> = Vec::new();
    for page in 1..=max_pages {
        match fetch(page).await {
            PageOutcome::Content(payload) => {
                match stop(&payload, accepted.last(), accepted.len()) {
                    StopDecision::Continue => accepted.push(payload),
                    StopDecision::StopInclude => {
                        accepted.push(payload);
                        break;
                    }
                    StopDecision::StopExclude => break,
                }
            }
            PageOutcome::Empty => {
                debug!(page, "page yielded no content; stopping pagination");
                break;
            }
            PageOutcome::Failed(reason) => {
                warn!(page, reason, "page fetch failed; stopping pagination");
                break;
            }
        }
    }
    accepted
}
