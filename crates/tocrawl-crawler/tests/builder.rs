mod common;

use common::{config, page, toc_page, url};
use tocrawl_crawler::{CrawlError, NodeKind, SiteSnapshot, TreeBuilder};
use url::Url;

fn names(nodes: impl Iterator<Item = tocrawl_crawler::NavNode>) -> Vec<String> {
    nodes.map(|n| n.name()).collect()
}

fn wide_site() -> SiteSnapshot {
    SiteSnapshot::new().with_page(
        &url("/db/wide"),
        toc_page(
            r#"<li><a href="/db/wide/top">
                    Top
                </a>
                <ul>
                    <li><a href="/db/wide/a">A</a>
                        <ul>
                            <li><a href="/db/wide/a1">A1</a></li>
                            <li><a href="/db/wide/a2">A2</a></li>
                        </ul>
                    </li>
                    <li><a href="/db/wide/b">B</a></li>
                    <li><a href="/db/wide/c">C</a>
                        <ul><li><a href="/db/wide/c1">C1</a></li></ul>
                    </li>
                </ul>
            </li>
            <li><a href="/db/wide/ignored">Ignored sibling of the first item</a></li>"#,
        ),
    )
}

#[tokio::test]
async fn tree_mirrors_nested_lists() {
    let config = config();
    let page = page(wide_site(), &config);
    let tree = TreeBuilder::new(&page, &config)
        .build_tree(&Url::parse(&url("/db/wide")).unwrap())
        .await
        .unwrap();

    assert_eq!(
        names(tree.root().iter_depth_first()),
        vec!["Root", "Top", "A", "A1", "A2", "B", "C", "C1"]
    );
    assert_eq!(names(tree.leaves()), vec!["A1", "A2", "B", "C1"]);
    assert_eq!(tree.root().url(), url("/db/wide"));
    assert_eq!(tree.root().max_depth(), 3);

    let c1 = tree.find(&url("/db/wide/c1")).unwrap();
    assert_eq!(c1.path(), "Root|Top|C|C1");
    assert_eq!(c1.kind(), NodeKind::Leaf);
    assert_eq!(c1.depth(), 3);
    assert!(tree.find(&url("/db/wide/ignored")).is_none());
}

#[tokio::test]
async fn depth_cap_drops_deep_items() {
    let mut config = config();
    config.max_depth = 2;
    let site = SiteSnapshot::new().with_page(
        &url("/db/deep"),
        toc_page(
            r#"<li><a href="/l0">L0</a><ul>
                <li><a href="/l1">L1</a><ul>
                    <li><a href="/l2">L2</a><ul>
                        <li><a href="/l3">L3</a><ul>
                            <li><a href="/l4">L4</a></li>
                        </ul></li>
                    </ul></li>
                </ul></li>
            </ul></li>"#,
        ),
    );
    let page = page(site, &config);
    let tree = TreeBuilder::new(&page, &config)
        .build_tree(&Url::parse(&url("/db/deep")).unwrap())
        .await
        .unwrap();

    assert_eq!(
        names(tree.root().iter_depth_first()),
        vec!["Root", "L0", "L1", "L2"]
    );
    assert_eq!(tree.len(), 4);
    assert_eq!(names(tree.leaves()), vec!["L2"]);
}

#[tokio::test]
async fn missing_toc_is_reported() {
    let config = config();
    let site = SiteSnapshot::new().with_page(&url("/db/empty"), "<p>No TOC here</p>");
    let page = page(site, &config);
    let err = TreeBuilder::new(&page, &config)
        .build_tree(&Url::parse(&url("/db/empty")).unwrap())
        .await
        .unwrap_err();
    match err.downcast_ref::<CrawlError>() {
        Some(CrawlError::SelectorNotFound { selector, url: at }) => {
            assert_eq!(selector, "#w_metadata_toc");
            assert_eq!(at, &url("/db/empty"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn anchor_without_href_is_reported() {
    let config = config();
    let site = SiteSnapshot::new().with_page(
        &url("/db/broken"),
        toc_page(r#"<li><a href="/ok">Ok</a><ul><li><a>No link</a></li></ul></li>"#),
    );
    let page = page(site, &config);
    let err = TreeBuilder::new(&page, &config)
        .build_tree(&Url::parse(&url("/db/broken")).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrawlError>(),
        Some(CrawlError::MissingAttribute { attribute, .. }) if attribute == "href"
    ));
}

#[tokio::test]
async fn item_without_anchor_is_reported() {
    let config = config();
    let site = SiteSnapshot::new().with_page(
        &url("/db/bare"),
        toc_page(r#"<li><a href="/ok">Ok</a><ul><li>plain text</li></ul></li>"#),
    );
    let page = page(site, &config);
    let err = TreeBuilder::new(&page, &config)
        .build_tree(&Url::parse(&url("/db/bare")).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrawlError>(),
        Some(CrawlError::SelectorNotFound { selector, .. }) if selector == "a"
    ));
}
