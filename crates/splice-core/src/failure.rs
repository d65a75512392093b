//! Failed request presentation

use splice_fetch::FetchError;

const COMMUNICATION_ERROR: &str = "Server communication error.";

/// How a failed request is shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationFailure {
    /// Cancelled by a newer navigation; nothing to show
    ClientAbort,
    /// No response reached us
    Transport { message: String },
    /// The server answered with an error status
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
}

impl NavigationFailure {
    pub fn classify(error: &FetchError) -> Self {
        match error {
            FetchError::Aborted => NavigationFailure::ClientAbort,
            FetchError::Status {
                status,
                status_text,
                body,
            } => NavigationFailure::Http {
                status: *status,
                status_text: status_text.clone(),
                body: body.clone(),
            },
            other => NavigationFailure::Transport {
                message: other.to_string(),
            },
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            NavigationFailure::Http { status, .. } => *status,
            _ => 0,
        }
    }

    /// Markup rendered in place of the requested fragment, if any.
    ///
    /// Outside debug mode transport failures render nothing; the caller
    /// raises the server error dialog instead.
    pub fn content(&self, debug: bool) -> Option<String> {
        match (self, debug) {
            (NavigationFailure::ClientAbort, _) => None,
            (NavigationFailure::Transport { .. }, false) => None,
            (NavigationFailure::Transport { .. }, true) => {
                Some(debug_banner(0, COMMUNICATION_ERROR))
            }
            (NavigationFailure::Http { .. }, false) => Some(self.http_message().to_string()),
            (NavigationFailure::Http { status, .. }, true) => {
                Some(debug_banner(*status, self.http_message()))
            }
        }
    }

    fn http_message(&self) -> &str {
        match self {
            NavigationFailure::Http {
                status_text, body, ..
            } if body.trim().is_empty() => status_text,
            NavigationFailure::Http { body, .. } => body,
            _ => COMMUNICATION_ERROR,
        }
    }
}

fn debug_banner(status: u16, message: &str) -> String {
    format!(
        concat!(
            "<div class=\"row\"><div class=\"col-xs-12\"><div id=\"banner-server-error\">",
            "<div class=\"alert alert-danger\" role=\"alert\">Server error, status code: {}</div>",
            "<pre id=\"server-error\"><code>{}</code></pre>",
            "</div></div></div>"
        ),
        status,
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
