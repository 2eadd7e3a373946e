mod builder;
mod config;
mod dom;
mod error;
mod fetch;
mod nav;
mod page;
mod pipeline;

pub use builder::TreeBuilder;
pub use config::{CrawlerConfig, OnError};
pub use dom::{DomElement, DomPage};
pub use error::CrawlError;
pub use fetch::{Fetch, HttpFetcher, SiteSnapshot};
pub use nav::{BreadthFirst, DepthFirst, Leaves, NavEntry, NavNode, NavTree, NodeKind};
pub use page::{ElementHandle, Page};
pub use pipeline::{ChapterReport, Document, Orchestrator};

pub use anyhow;
