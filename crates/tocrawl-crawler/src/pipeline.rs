use std::cell::Cell;
use std::fmt;

use anyhow::{Context, Result};
use tocrawl_markdown::MarkdownPipeline;
use url::Url;

use crate::builder::TreeBuilder;
use crate::config::{CrawlerConfig, OnError};
use crate::error::CrawlError;
use crate::nav::NavTree;
use crate::page::{ElementHandle, Page};

/// Markdown of one leaf page, labeled with its navigation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub body: String,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.path, self.body)
    }
}

/// Documents of one chapter, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    pub chapter: String,
    pub documents: Vec<Document>,
}

impl ChapterReport {
    /// File-name friendly form of the chapter path: `/db/edtdoc` gives `db-edtdoc`.
    pub fn slug(&self) -> String {
        let slug = self
            .chapter
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            String::from("index")
        } else {
            slug
        }
    }
}

/// Drives tree discovery and page conversion over a shared page, one navigation at a time.
pub struct Orchestrator<'a, P> {
    page: &'a P,
    config: &'a CrawlerConfig,
    markdown: MarkdownPipeline,
    navigated: Cell<bool>,
}

impl<'a, P: Page> Orchestrator<'a, P> {
    pub fn new(page: &'a P, config: &'a CrawlerConfig) -> Result<Self> {
        Ok(Self {
            page,
            config,
            markdown: MarkdownPipeline::new(config.base_url.clone())?,
            navigated: Cell::new(false),
        })
    }

    /// Resolves a chapter path against the base URL.
    pub fn chapter_url(&self, chapter_path: &str) -> Result<Url> {
        let url = self
            .config
            .base_url
            .join(chapter_path)
            .map_err(|source| CrawlError::InvalidUrl {
                input: chapter_path.to_owned(),
                source,
            })?;
        Ok(url)
    }

    /// Builds the navigation tree of one chapter.
    pub async fn build_tree(&self, chapter_path: &str) -> Result<NavTree> {
        let url = self.chapter_url(chapter_path)?;
        self.throttle().await;
        TreeBuilder::new(self.page, self.config)
            .build_tree(&url)
            .await
    }

    /// Crawls one chapter: every leaf of its tree becomes a [`Document`].
    ///
    /// The first failing leaf aborts the chapter.
    pub async fn run_chapter(&self, chapter_path: &str) -> Result<Vec<Document>> {
        let tree = self.build_tree(chapter_path).await?;

        let mut documents = Vec::new();
        for leaf in tree.leaves() {
            let url = Url::parse(&leaf.url()).map_err(|source| CrawlError::InvalidUrl {
                input: leaf.url(),
                source,
            })?;
            let html = self
                .fetch_body(&url)
                .await
                .with_context(|| format!("Leaf {} ({url})", leaf.path()))?;
            documents.push(Document {
                path: leaf.path(),
                body: self.markdown.convert(&html),
            });
        }

        log::info!("Chapter {chapter_path}: {} document(s)", documents.len());
        Ok(documents)
    }

    /// Inner HTML of the body shown in the content frame of `url`.
    pub async fn fetch_body(&self, url: &Url) -> Result<String> {
        self.throttle().await;
        self.page.navigate(url).await?;
        let wait = self.config.wait_deadline();
        let holder = self.page.wait_for(&self.config.frame_selector, wait).await?;
        let frame = holder
            .content_frame()
            .await?
            .ok_or_else(|| CrawlError::SelectorNotFound {
                selector: format!("{} (frame content)", self.config.frame_selector),
                url: url.to_string(),
            })?;
        let body = frame.wait_for("body", wait).await?;
        log::debug!("Fetched content of {url}");
        body.inner_html().await
    }

    /// Crawls `chapters` in order, applying the configured [`OnError`] policy to failed
    /// chapters. Chapters already done are kept whatever happens next.
    pub async fn run(&self, chapters: &[String]) -> Result<Vec<ChapterReport>> {
        let mut reports = Vec::with_capacity(chapters.len());
        for chapter in chapters {
            match self.run_chapter(chapter).await {
                Ok(documents) => reports.push(ChapterReport {
                    chapter: chapter.clone(),
                    documents,
                }),
                Err(e) => match self.config.on_chapter_error {
                    OnError::SkipAndLog => {
                        log::error!("Skipping chapter {chapter} got: {e:#}");
                    }
                    OnError::Fail => {
                        return Err(e.context(format!("Chapter {chapter}")));
                    }
                },
            }
        }
        Ok(reports)
    }

    /// Politeness delay before every navigation but the first.
    async fn throttle(&self) {
        if self.navigated.replace(true) {
            if let Some(delay) = self.config.throttle_delay() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
