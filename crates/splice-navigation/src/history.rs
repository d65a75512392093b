//! Hash history
//!
//! History entries keep the real document path and query and record the
//! logical location in the fragment.

use url::form_urlencoded;
use url::Url;

use crate::location::path_and_query;
use crate::Result;

/// The logical location stored in the document hash, without the `#`.
pub fn hash_location(document: &Url) -> &str {
    document.fragment().unwrap_or("")
}

/// Document URL recording `location` in its hash.
pub fn hash_url(document: &Url, location: &str) -> Url {
    let mut url = document.clone();
    url.set_fragment(Some(location));
    url
}

/// Where a form submission goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTarget {
    /// The form's action resolved against the document
    pub action: Url,
    /// The action with its query replaced by the serialized fields
    pub merged: Url,
    /// Fields as an `application/x-www-form-urlencoded` string
    pub encoded: String,
}

impl FormTarget {
    /// Location of the merged URL, recorded in history on success.
    pub fn history_location(&self, document: &Url) -> String {
        request_location(&self.merged, document)
    }
}

/// `path[?query]` for URLs on the document's origin, the full URL otherwise.
pub fn request_location(url: &Url, document: &Url) -> String {
    if url.origin() == document.origin() {
        path_and_query(url)
    } else {
        let mut url = url.clone();
        url.set_fragment(None);
        url.to_string()
    }
}

/// Merge a form's action with its serialized fields.
///
/// Without an action attribute the form submits to the current hash
/// location.
pub fn merge_form_action(
    action: Option<&str>,
    fields: &[(String, String)],
    document: &Url,
) -> Result<FormTarget> {
    let action = match action.map(str::trim).filter(|a| !a.is_empty()) {
        Some(action) => document.join(action)?,
        None => document.join(hash_location(document))?,
    };

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();

    let mut merged = action.clone();
    merged.set_fragment(None);
    if encoded.is_empty() {
        merged.set_query(None);
    } else {
        merged.set_query(Some(&encoded));
    }

    Ok(FormTarget {
        action,
        merged,
        encoded,
    })
}
