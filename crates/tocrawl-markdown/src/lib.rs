//! Page body HTML to cleaned Markdown.
//!
//! The pipeline has three stages, always run in this order:
//!
//! 1. [`sanitize`]: absolutize image sources and remove same-site anchors, in place.
//! 2. [`convert`]: walk the sanitized tree and emit Markdown.
//! 3. [`filter`]: strip residual same-site links and paths with an ordered regex battery,
//!    images excluded.

pub mod convert;
pub mod filter;
pub mod sanitize;

use tocrawl_scraper::Html;
use url::Url;

pub use crate::filter::LinkFilter;

/// Sanitize, convert and filter pages of one site.
#[derive(Debug, Clone)]
pub struct MarkdownPipeline {
    base_url: Url,
    filter: LinkFilter,
}

impl MarkdownPipeline {
    pub fn new(base_url: Url) -> Result<Self, regex::Error> {
        let filter = LinkFilter::new(&base_url)?;
        Ok(Self { base_url, filter })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Converts the inner HTML of a page body.
    pub fn convert(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let images = sanitize::absolutize_images(&fragment, &self.base_url);
        let links = sanitize::strip_internal_links(&fragment, &self.base_url);
        log::debug!("Sanitized page: {images} image(s) absolutized, {links} link(s) removed");
        let markdown = convert::html_to_markdown(&fragment);
        self.filter.apply(&markdown).trim().to_owned()
    }
}

/// One-shot conversion, see [`MarkdownPipeline::convert`].
pub fn html_to_markdown(html: &str, base_url: &Url) -> Result<String, regex::Error> {
    Ok(MarkdownPipeline::new(base_url.clone())?.convert(html))
}
