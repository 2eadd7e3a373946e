use std::time::Duration;

use tocrawl_tree::TreeError;

/// Failures of the crawl itself, carried inside [`anyhow::Error`].
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("selector `{selector}` not found on {url}")]
    SelectorNotFound { selector: String, url: String },

    #[error("attribute `{attribute}` missing on {url}")]
    MissingAttribute { attribute: String, url: String },

    #[error("invalid URL `{input}`: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("navigation tree invariant violated: {0}")]
    InvariantViolation(#[from] TreeError),

    #[error("navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },
}
