use anyhow::Result;
use url::Url;

use crate::config::CrawlerConfig;
use crate::error::CrawlError;
use crate::nav::{NavEntry, NavNode, NavTree};
use crate::page::{ElementHandle, Page};

/// Materializes a [`NavTree`] from the nested-list table of contents of a page.
pub struct TreeBuilder<'a, P> {
    page: &'a P,
    config: &'a CrawlerConfig,
}

impl<'a, P: Page> TreeBuilder<'a, P> {
    pub fn new(page: &'a P, config: &'a CrawlerConfig) -> Self {
        Self { page, config }
    }

    /// Navigates to `root_url` and walks its table of contents.
    ///
    /// Only the first item of the outermost list is followed. Items nested deeper than
    /// `max_depth` are left out together with their subtree.
    pub async fn build_tree(&self, root_url: &Url) -> Result<NavTree> {
        self.page.navigate(root_url).await?;
        let toc = self
            .page
            .wait_for(&self.config.toc_selector, self.config.wait_deadline())
            .await?;
        let list = self.required(toc.query_one("ul").await?, "ul")?;
        let first = self.required(list.query_one("li").await?, "li")?;

        let tree = NavTree::new(self.config.root_name.clone(), root_url.as_str());
        let mut worklist: Vec<(P::Element, NavNode, usize)> = vec![(first, tree.root(), 0)];
        while let Some((item, parent, depth)) = worklist.pop() {
            let entry = self.entry(&item).await?;
            log::debug!("TOC item at depth {depth}: {} ({})", entry.name, entry.url);
            let node = parent.add_child(entry)?;

            if depth >= self.config.max_depth {
                continue;
            }
            if let Some(nested) = item.query_one("ul").await? {
                let children = nested.query_all(":scope > li").await?;
                worklist.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|child| (child, node.clone(), depth + 1)),
                );
            }
        }

        log::info!("Built navigation tree of {} node(s) from {root_url}", tree.len());
        Ok(tree)
    }

    async fn entry(&self, item: &P::Element) -> Result<NavEntry> {
        let anchor = self.required(item.query_one("a").await?, "a")?;
        let name = anchor.text_content().await?.trim().to_owned();
        let href = anchor
            .get_attribute("href")
            .await?
            .ok_or_else(|| CrawlError::MissingAttribute {
                attribute: "href".to_owned(),
                url: self.current_url(),
            })?;
        let url = self
            .config
            .base_url
            .join(&href)
            .map_err(|source| CrawlError::InvalidUrl {
                input: href,
                source,
            })?;
        Ok(NavEntry::new(name, url))
    }

    fn required(&self, element: Option<P::Element>, selector: &str) -> Result<P::Element> {
        element.ok_or_else(|| {
            CrawlError::SelectorNotFound {
                selector: selector.to_owned(),
                url: self.current_url(),
            }
            .into()
        })
    }

    fn current_url(&self) -> String {
        self.page.current_url().map(String::from).unwrap_or_default()
    }
}
