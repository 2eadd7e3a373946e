//! Regex pass removing internal links and URLs from generated Markdown.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use url::Url;

/// Delimiters of image placeholders. Private-use code points never show up in converted pages
/// and are excluded from every pattern below.
const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Link label: text with at most one level of nested brackets, newlines included.
const LABEL: &str = r"\[((?:[^\[\]]|\[[^\[\]]*\])*)\]";

lazy_static! {
    static ref IMAGE: Regex = Regex::new(&format!(r"!{LABEL}\([^)]*\)")).unwrap();
    static ref PLACEHOLDER: Regex = Regex::new(r"\x{E000}(\d+)\x{E001}").unwrap();
    static ref ROOT_RELATIVE_LINK: Regex = Regex::new(&format!(r"{LABEL}\(/[^)]*\)")).unwrap();
    static ref ROOT_RELATIVE_PATH: Regex =
        Regex::new(r"(?m)(^|[\s(])(?:/[^\s/?)\x{E000}\x{E001}]*)+").unwrap();
}

/// How a pattern match is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    /// Keep the link label.
    Label,
    /// Drop the match.
    Delete,
    /// Keep the boundary character captured before the match.
    Boundary,
}

/// Ordered battery of rewrites tied to one site.
///
/// Markdown link patterns run before bare URL patterns, and images are protected by
/// placeholders for the whole pass.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    patterns: Vec<(Regex, Rewrite)>,
}

impl LinkFilter {
    pub fn new(base_url: &Url) -> Result<Self, regex::Error> {
        let base = regex::escape(base_url.as_str().trim_end_matches('/'));
        let mut patterns = Vec::with_capacity(6);

        let domain = base_url.host_str().map(|host| match base_url.port() {
            Some(port) => regex::escape(&format!("{host}:{port}")),
            None => regex::escape(host),
        });
        if let Some(domain) = &domain {
            patterns.push((link_to(domain)?, Rewrite::Label));
        }
        patterns.push((link_to(&base)?, Rewrite::Label));
        patterns.push((ROOT_RELATIVE_LINK.clone(), Rewrite::Label));
        if let Some(domain) = &domain {
            patterns.push((bare_url(domain)?, Rewrite::Delete));
        }
        patterns.push((bare_url(&base)?, Rewrite::Delete));
        patterns.push((ROOT_RELATIVE_PATH.clone(), Rewrite::Boundary));

        Ok(Self { patterns })
    }

    /// Applies the battery to `markdown`, leaving image syntax untouched.
    pub fn apply(&self, markdown: &str) -> String {
        let mut images = Vec::new();
        let mut text = IMAGE
            .replace_all(markdown, |caps: &Captures| {
                images.push(caps[0].to_owned());
                format!("{OPEN}{}{CLOSE}", images.len() - 1)
            })
            .into_owned();

        for (pattern, rewrite) in &self.patterns {
            let replacement = match rewrite {
                Rewrite::Label | Rewrite::Boundary => "${1}",
                Rewrite::Delete => "",
            };
            text = pattern.replace_all(&text, replacement).into_owned();
        }

        PLACEHOLDER
            .replace_all(&text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| images.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

fn link_to(fragment: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{LABEL}\([^)]*{fragment}[^)]*\)"))
}

fn bare_url(fragment: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"https?://[^\s)\x{{E000}}\x{{E001}}]*{fragment}[^\s)\x{{E000}}\x{{E001}}]*"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> LinkFilter {
        LinkFilter::new(&Url::parse("https://its.example.com").unwrap()).unwrap()
    }

    #[test]
    fn images_survive() {
        let md = "![alt](https://its.example.com/img/pic.png) and [text](https://its.example.com/page)";
        assert_eq!(
            filter().apply(md),
            "![alt](https://its.example.com/img/pic.png) and text"
        );
    }

    #[test]
    fn root_relative_images_survive() {
        let md = "![diagram](/db/img/d.png)\n[next](/db/next)";
        assert_eq!(filter().apply(md), "![diagram](/db/img/d.png)\nnext");
    }

    #[test]
    fn links_keep_labels() {
        let md = "See [a](https://sub.its.example.com/x \"t\"), [b](/db/y) and [c](https://other.org/z).";
        assert_eq!(
            filter().apply(md),
            "See a, b and [c](https://other.org/z)."
        );
    }

    #[test]
    fn bare_urls_deleted() {
        let md = "Visit https://its.example.com/db/page?x=1 now\nor http://cdn.its.example.com/a.";
        assert_eq!(filter().apply(md), "Visit  now\nor ");
    }

    #[test]
    fn root_relative_paths_deleted() {
        let md = "/db/edtdoc/content/1 is gone, (/x/y) too\nbut 1/2 and https://other.org/keep stay";
        assert_eq!(
            filter().apply(md),
            " is gone, () too\nbut 1/2 and https://other.org/keep stay"
        );
    }

    #[test]
    fn image_inside_link_label() {
        let md = "[![logo](https://its.example.com/logo.png)](https://its.example.com/home)";
        assert_eq!(
            filter().apply(md),
            "![logo](https://its.example.com/logo.png)"
        );
    }

    #[test]
    fn bare_url_next_to_image() {
        let md = "https://its.example.com/a![i](https://its.example.com/i.png)";
        assert_eq!(filter().apply(md), "![i](https://its.example.com/i.png)");
    }

    #[test]
    fn bracketed_labels_are_kept() {
        let md = "[arr[0]](https://its.example.com/x) tail, [fig[1]](/db/image/x.png) and [ext[2]](https://other.org/y)";
        assert_eq!(
            filter().apply(md),
            "arr[0] tail, fig[1] and [ext[2]](https://other.org/y)"
        );
    }

    #[test]
    fn bare_url_stops_at_closing_paren() {
        let md = "(mirror https://its.example.com/a) and [see](https://other.org/?ref=x)";
        assert_eq!(
            filter().apply(md),
            "(mirror ) and [see](https://other.org/?ref=x)"
        );
    }

    #[test]
    fn multiline_image_alt_is_protected() {
        let md = "![line one\nline two](https://its.example.com/img/a.png) [p](https://its.example.com/p)";
        assert_eq!(
            filter().apply(md),
            "![line one\nline two](https://its.example.com/img/a.png) p"
        );
    }

    #[test]
    fn port_is_part_of_the_domain() {
        let filter = LinkFilter::new(&Url::parse("http://localhost:8080/").unwrap()).unwrap();
        assert_eq!(
            filter.apply("[a](http://localhost:8080/x) [b](http://localhost:9090/y)"),
            "a [b](http://localhost:9090/y)"
        );
    }
}
