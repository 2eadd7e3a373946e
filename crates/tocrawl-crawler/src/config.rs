use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://its.1c.ru";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Chapter entry paths, resolved against `base_url`.
    #[serde(default = "default_chapters")]
    pub chapters: Vec<String>,

    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Deepest table-of-contents level kept, the first item being level 0.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_toc_selector")]
    pub toc_selector: String,

    #[serde(default = "default_frame_selector")]
    pub frame_selector: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Seconds allowed for one navigation.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout: f32,

    /// Seconds allowed when waiting for a selector.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: f32,

    /// Delay in seconds between navigations.
    #[serde(default = "default_throttle")]
    pub throttle: Option<f32>,

    #[serde(default = "default_on_chapter_error")]
    pub on_chapter_error: OnError,
}

impl CrawlerConfig {
    pub fn navigation_deadline(&self) -> Duration {
        secs(self.navigation_timeout)
    }

    pub fn wait_deadline(&self) -> Duration {
        secs(self.wait_timeout)
    }

    pub fn throttle_delay(&self) -> Option<Duration> {
        self.throttle.map(secs).filter(|delay| !delay.is_zero())
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chapters: default_chapters(),
            root_name: default_root_name(),
            max_depth: default_max_depth(),
            toc_selector: default_toc_selector(),
            frame_selector: default_frame_selector(),
            user_agent: default_user_agent(),
            navigation_timeout: default_navigation_timeout(),
            wait_timeout: default_wait_timeout(),
            throttle: default_throttle(),
            on_chapter_error: default_on_chapter_error(),
        }
    }
}

/// Negative or non-finite values count as zero.
fn secs(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or_default()
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn default_chapters() -> Vec<String> {
    ["/db/edtdoc", "/db/cs27doc", "/db/kip", "/db/freshpub"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_root_name() -> String {
    String::from("Root")
}

fn default_max_depth() -> usize {
    5
}

fn default_toc_selector() -> String {
    String::from("#w_metadata_toc")
}

fn default_frame_selector() -> String {
    String::from("#w_metadata_doc_frame")
}

fn default_user_agent() -> String {
    String::from("tocrawl")
}

fn default_navigation_timeout() -> f32 {
    30.0
}

fn default_wait_timeout() -> f32 {
    10.0
}

fn default_throttle() -> Option<f32> {
    None
}

fn default_on_chapter_error() -> OnError {
    OnError::SkipAndLog
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OnError {
    Fail,
    SkipAndLog,
}
