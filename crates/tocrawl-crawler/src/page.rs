use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

/// A browsing session showing one document at a time.
///
/// Pages and their elements are single-threaded handles: futures are not `Send`.
#[async_trait(?Send)]
pub trait Page {
    type Element: ElementHandle;

    /// Loads `url`, replacing the current document.
    async fn navigate(&self, url: &Url) -> Result<()>;

    /// URL of the current document, if any.
    fn current_url(&self) -> Option<Url>;

    /// First element of the current document matching `selector`.
    async fn query_one(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// Waits for an element matching `selector`, failing with
    /// [`CrawlError::SelectorNotFound`](crate::CrawlError::SelectorNotFound).
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Self::Element>;
}

#[async_trait(?Send)]
pub trait ElementHandle: Sized {
    /// First descendant matching `selector`.
    async fn query_one(&self, selector: &str) -> Result<Option<Self>>;

    /// All descendants matching `selector`, in document order. `:scope` is this element.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>>;

    /// Waits for a descendant matching `selector`, failing with
    /// [`CrawlError::SelectorNotFound`](crate::CrawlError::SelectorNotFound).
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Self>;

    async fn text_content(&self) -> Result<String>;

    async fn get_attribute(&self, name: &str) -> Result<Option<String>>;

    async fn inner_html(&self) -> Result<String>;

    /// Root element of the document shown by a frame element, `None` for other elements.
    async fn content_frame(&self) -> Result<Option<Self>>;
}
