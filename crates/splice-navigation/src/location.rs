//! Location normalization
//!
//! A navigation candidate is resolved against the document origin:
//! 1. Unparseable candidate → fallback location
//! 2. Candidate resolving to `/` → reinterpreted against the hash location,
//!    keeping only the candidate's query
//! 3. Anything else → the candidate, untouched

use url::Url;

use crate::history::hash_location;

/// Normalize a navigation candidate against the current document URL.
///
/// Never fails: malformed candidates, and candidates that still point at
/// the application root after hash reinterpretation, yield `fallback`.
pub fn normalize_location(candidate: &str, document: &Url, fallback: &str) -> String {
    let resolved = match origin_of(document).join(candidate) {
        Ok(url) => url,
        Err(err) => {
            tracing::debug!(
                candidate = %candidate,
                error = %err,
                "Malformed location, using fallback"
            );
            return fallback.to_string();
        }
    };

    if resolved.path() != "/" {
        return candidate.to_string();
    }

    // Root links stay on the hash location and only swap the query
    let mut relocated = match resolved.join(hash_location(document)) {
        Ok(url) => url,
        Err(_) => return fallback.to_string(),
    };
    relocated.set_query(resolved.query());
    relocated.set_fragment(None);

    if relocated.path() == "/" {
        fallback.to_string()
    } else {
        path_and_query(&relocated)
    }
}

/// `path[?query]` of a URL, the form locations take in the hash.
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn origin_of(document: &Url) -> Url {
    let mut origin = document.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}
