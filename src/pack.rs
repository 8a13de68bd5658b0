//! Cell packing: encode a capped batch of comments as JSON-array strings,
//! one per tabular cell.
//!
//! The working table stores a variable-length comment stream in a fixed
//! grid, so comments are chunked into pages of `page_capacity` and each
//! page is serialized as one JSON array. Capacity is an explicit
//! parameter because the working-table header width depends on it.

/// Pack `comments` into JSON-array cells of up to `page_capacity`
/// elements each, preserving order. The last cell may be shorter; an
/// empty input yields zero cells.
pub fn pack(comments: &[String], page_capacity: usize) -> Vec<String> {
    if comments.is_empty() {
        return Vec::new();
    }
    comments
        .chunks(page_capacity.max(1))
        .map(|page| serde_json::to_string(page).expect("string slices serialize"))
        .collect()
}
