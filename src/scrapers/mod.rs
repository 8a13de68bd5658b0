//! Scrapers for the search page, article bodies, and comment threads.
//!
//! Three extractors, all read-only and all infallible at their public
//! surface (per-page failures are absorbed as early pagination stops):
//!
//! | Module | Fetch | Pagination |
//! |--------|-------|------------|
//! | [`search`] | rendered | single page per keyword |
//! | [`body`] | plain HTTP | `?page=N`, capped at 10, stops on empty/repeat |
//! | [`comments`] | rendered | `/comments?page=N`, stops on empty/repeat/cap |

pub mod body;
pub mod comments;
pub mod search;
