//! In-place HTML rewrites applied before Markdown conversion.

use lazy_static::lazy_static;
use tocrawl_scraper::{ElementRef, Html, Selector};
use url::Url;

lazy_static! {
    static ref IMG_WITH_SRC: Selector = Selector::parse("img[src]").unwrap();
    static ref A_WITH_HREF: Selector = Selector::parse("a[href]").unwrap();
}

/// Resolves relative `img[src]` against `base_url`.
///
/// Sources that already carry a scheme, `data:` URIs included, are left untouched, which makes
/// the rewrite idempotent. Returns the number of rewritten images.
pub fn absolutize_images(html: &Html, base_url: &Url) -> usize {
    let images: Vec<ElementRef> = html.select(&IMG_WITH_SRC).collect();
    let mut rewritten = 0;
    for img in images {
        let Some(src) = img.attr("src") else {
            continue;
        };
        if Url::parse(&src).is_ok() {
            continue;
        }
        match base_url.join(&src) {
            Ok(url) => {
                if img.set_attr("src", url.as_str()) {
                    rewritten += 1;
                }
            }
            Err(e) => log::warn!("Keeping image source {src:?} got: {e}"),
        }
    }
    rewritten
}

/// Removes every anchor pointing to the site of `base_url` or one of its subdomains.
///
/// Anchors go away together with their content. Hrefs containing `image` are always kept.
/// Returns the number of removed anchors.
pub fn strip_internal_links(html: &Html, base_url: &Url) -> usize {
    let Some(site_host) = base_url.host_str() else {
        log::warn!("Base URL {base_url} has no host, keeping all links");
        return 0;
    };

    let internal: Vec<ElementRef> = html
        .select(&A_WITH_HREF)
        .filter(|a| {
            let Some(href) = a.attr("href") else {
                return false;
            };
            if href.contains("image") {
                return false;
            }
            match Url::parse(&href).or_else(|_| base_url.join(&href)) {
                Ok(url) => url.host_str().map_or(false, |host| same_site(host, site_host)),
                Err(e) => {
                    log::warn!("Keeping link {href:?} got: {e}");
                    false
                }
            }
        })
        .collect();

    let removed = internal.len();
    for a in internal {
        a.remove();
    }
    removed
}

fn same_site(host: &str, site_host: &str) -> bool {
    host == site_host
        || host
            .strip_suffix(site_host)
            .map_or(false, |prefix| prefix.ends_with('.'))
}

/// Parses `html` as a fragment, applies [`absolutize_images`] then [`strip_internal_links`], and
/// serializes the result.
pub fn sanitize(html: &str, base_url: &Url) -> String {
    let fragment = Html::parse_fragment(html);
    absolutize_images(&fragment, base_url);
    strip_internal_links(&fragment, base_url);
    fragment.html()
}
