#![allow(dead_code)]

use std::rc::Rc;

use tocrawl_crawler::{CrawlerConfig, DomPage, SiteSnapshot};
use url::Url;

pub const BASE: &str = "https://docs.example.com";

pub fn config() -> CrawlerConfig {
    CrawlerConfig {
        base_url: Url::parse(BASE).unwrap(),
        chapters: vec!["/db/guide".to_owned()],
        ..Default::default()
    }
}

pub fn page(snapshot: SiteSnapshot, config: &CrawlerConfig) -> DomPage {
    DomPage::new(Rc::new(snapshot), config.navigation_deadline())
}

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

/// Chapter page holding a table of contents.
pub fn toc_page(items: &str) -> String {
    format!(
        r#"<html><body><div id="header">Docs</div>
        <div id="w_metadata_toc"><ul>{items}</ul></div>
        </body></html>"#
    )
}

/// Leaf page showing `doc_path` in the content frame.
pub fn leaf_page(doc_path: &str) -> String {
    format!(
        r#"<html><body><div class="toolbar"><a href="/db">Back</a></div>
        <iframe id="w_metadata_doc_frame" src="{doc_path}"></iframe>
        </body></html>"#
    )
}

/// `Root -> [Ch1 -> [P1, P2]]` under `/db/guide`.
pub fn guide_site() -> SiteSnapshot {
    SiteSnapshot::new()
        .with_page(
            &url("/db/guide"),
            toc_page(
                r#"<li><a href="/db/guide/ch1">Ch1</a>
                    <ul>
                        <li><a href="/db/guide/p1">P1</a></li>
                        <li><a href="/db/guide/p2">P2</a></li>
                    </ul>
                </li>"#,
            ),
        )
        .with_page(&url("/db/guide/p1"), leaf_page("/db/guide/p1/doc.html"))
        .with_page(
            &url("/db/guide/p1/doc.html"),
            r#"<html><body>
                <h1>Page one</h1>
                <p>See <a href="/db/guide/p2">the next page</a> page.</p>
                <p><img src="/db/img/a.png" alt="A"></p>
            </body></html>"#,
        )
        .with_page(&url("/db/guide/p2"), leaf_page("/db/guide/p2/doc.html"))
        .with_page(
            &url("/db/guide/p2/doc.html"),
            r#"<html><body>
                <h1>Page two</h1>
                <p>Read <a href="https://other.org/manual">the manual</a>.</p>
            </body></html>"#,
        )
}
