//! Static DOM implementation of [`Page`]: documents are fetched and parsed, scripts never run.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tocrawl_scraper::{ElementRef, Html, Selector};
use tokio::time::timeout;
use url::Url;

use crate::config::CrawlerConfig;
use crate::error::CrawlError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::page::{ElementHandle, Page};

#[derive(Debug)]
struct Session {
    fetcher: Rc<dyn Fetch>,
    navigation_timeout: Duration,
}

impl Session {
    async fn load(&self, url: &Url) -> Result<Rc<Frame>> {
        let body = timeout(self.navigation_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| CrawlError::NavigationTimeout {
                url: url.to_string(),
                timeout: self.navigation_timeout,
            })??;
        log::debug!("Loaded {url} ({} bytes)", body.len());
        Ok(Rc::new(Frame {
            url: url.clone(),
            html: Html::parse_document(&body),
        }))
    }
}

/// A parsed document and the URL it was loaded from.
#[derive(Debug)]
struct Frame {
    url: Url,
    html: Html,
}

/// Page backed by a [`Fetch`] implementation and an html5ever-parsed tree.
///
/// `wait_for` inspects the static document once: there is nothing to wait for.
#[derive(Debug)]
pub struct DomPage {
    session: Rc<Session>,
    frame: RefCell<Option<Rc<Frame>>>,
}

impl DomPage {
    pub fn new(fetcher: Rc<dyn Fetch>, navigation_timeout: Duration) -> Self {
        Self {
            session: Rc::new(Session {
                fetcher,
                navigation_timeout,
            }),
            frame: RefCell::new(None),
        }
    }

    /// Page downloading over HTTP with the configured user agent and timeout.
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Rc::new(HttpFetcher::new(config.user_agent.clone())),
            config.navigation_deadline(),
        )
    }

    fn frame(&self) -> Result<Rc<Frame>> {
        self.frame
            .borrow()
            .clone()
            .ok_or_else(|| anyhow!("No document loaded, navigate first"))
    }
}

#[async_trait(?Send)]
impl Page for DomPage {
    type Element = DomElement;

    async fn navigate(&self, url: &Url) -> Result<()> {
        let frame = self.session.load(url).await?;
        *self.frame.borrow_mut() = Some(frame);
        Ok(())
    }

    fn current_url(&self) -> Option<Url> {
        self.frame.borrow().as_ref().map(|frame| frame.url.clone())
    }

    async fn query_one(&self, selector: &str) -> Result<Option<DomElement>> {
        let frame = self.frame()?;
        let root = DomElement {
            session: self.session.clone(),
            element: frame.html.root_element(),
            frame,
        };
        if Selector::parse(selector)?.matches(&root.element) {
            return Ok(Some(root));
        }
        root.query_one(selector).await
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<DomElement> {
        let url = self.current_url().map(String::from).unwrap_or_default();
        self.query_one(selector).await?.ok_or_else(|| {
            CrawlError::SelectorNotFound {
                selector: selector.to_owned(),
                url,
            }
            .into()
        })
    }
}

/// Element of a [`DomPage`] document. Keeps its document alive.
#[derive(Debug, Clone)]
pub struct DomElement {
    session: Rc<Session>,
    frame: Rc<Frame>,
    element: ElementRef,
}

impl DomElement {
    fn sibling(&self, element: ElementRef) -> Self {
        Self {
            session: self.session.clone(),
            frame: self.frame.clone(),
            element,
        }
    }

    /// URL of the document holding this element.
    pub fn document_url(&self) -> &Url {
        &self.frame.url
    }
}

#[async_trait(?Send)]
impl ElementHandle for DomElement {
    async fn query_one(&self, selector: &str) -> Result<Option<Self>> {
        let selector = Selector::parse(selector)?;
        let found = self.element.select(&selector).next();
        Ok(found.map(|element| self.sibling(element)))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Self>> {
        let selector = Selector::parse(selector)?;
        let found = self.element.select(&selector);
        Ok(found.map(|element| self.sibling(element)).collect())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<Self> {
        self.query_one(selector).await?.ok_or_else(|| {
            CrawlError::SelectorNotFound {
                selector: selector.to_owned(),
                url: self.frame.url.to_string(),
            }
            .into()
        })
    }

    async fn text_content(&self) -> Result<String> {
        Ok(self.element.inner_text())
    }

    async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.element.attr(name))
    }

    async fn inner_html(&self) -> Result<String> {
        Ok(self.element.inner_html())
    }

    async fn content_frame(&self) -> Result<Option<Self>> {
        if !matches!(self.element.name().as_str(), "iframe" | "frame") {
            return Ok(None);
        }

        let frame = if let Some(srcdoc) = self.element.attr("srcdoc") {
            Rc::new(Frame {
                url: self.frame.url.clone(),
                html: Html::parse_document(&srcdoc),
            })
        } else if let Some(src) = self.element.attr("src") {
            let url = self
                .frame
                .url
                .join(&src)
                .map_err(|source| CrawlError::InvalidUrl { input: src, source })?;
            self.session.load(&url).await?
        } else {
            return Ok(None);
        };

        Ok(Some(DomElement {
            session: self.session.clone(),
            element: frame.html.root_element(),
            frame,
        }))
    }
}
