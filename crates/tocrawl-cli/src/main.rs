use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use tocrawl_crawler::{
    ChapterReport, CrawlerConfig, DomPage, Fetch, HttpFetcher, OnError, Orchestrator,
    SiteSnapshot,
};
use tocrawl_markdown::MarkdownPipeline;
use tokio::runtime;
use url::Url;

const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";
const DEFAULT_LOG_FILTER: &str = "tocrawl_crawler=info,tocrawl_markdown=warn";

/// Documentation site crawler producing Markdown
#[derive(Debug, Parser)]
#[command(name = "tocrawl", version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "crawl")]
    Crawl(CrawlArgs),
    #[command(name = "tree")]
    Tree(TreeArgs),
    #[command(name = "convert")]
    Convert(ConvertArgs),
    #[command(hide = true)]
    Completion,
}

#[derive(Debug, clap::Args)]
pub struct SiteArgs {
    /// Optional crawler yaml configuration file
    #[arg(env = "TOCRAWL_CONFIG", long)]
    pub config: Option<PathBuf>,
    /// Override crawler's documentation site
    #[arg(long)]
    pub base_url: Option<Url>,
    /// Yaml map of URL to local html file, served instead of downloading pages
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
    /// Override crawler's user agent
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Override crawler's deepest table of contents level
    #[arg(long)]
    pub max_depth: Option<usize>,
}

impl TryFrom<&SiteArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &SiteArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(path) = &args.config {
            let file = File::open(path).with_context(|| format!("Config {}", path.display()))?;
            serde_yaml::from_reader(file)?
        } else {
            CrawlerConfig::default()
        };
        if let Some(base_url) = &args.base_url {
            conf.base_url = base_url.clone();
        }
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        if let Some(max_depth) = args.max_depth {
            conf.max_depth = max_depth;
        }
        Ok(conf)
    }
}

/// Crawl chapters and convert their pages to Markdown
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub site: SiteArgs,
    /// Chapter path to crawl, repeat for several (overrides configured chapters)
    #[arg(long = "chapter")]
    pub chapters: Vec<String>,
    /// Override crawler's delay in seconds between navigations
    #[arg(long)]
    pub throttle: Option<f32>,
    /// Override crawler's failed chapter handling strategy
    #[arg(value_enum, long)]
    pub on_chapter_error: Option<OnError>,
    /// Directory receiving one Markdown file per chapter, stdout if absent
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

impl TryFrom<&CrawlArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlArgs) -> Result<Self, Self::Error> {
        let mut conf = CrawlerConfig::try_from(&args.site)?;
        if !args.chapters.is_empty() {
            conf.chapters = args.chapters.clone();
        }
        if let Some(throttle) = args.throttle {
            conf.throttle = Some(throttle);
        }
        if let Some(on_chapter_error) = args.on_chapter_error {
            conf.on_chapter_error = on_chapter_error;
        }
        Ok(conf)
    }
}

pub async fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let conf = CrawlerConfig::try_from(&args)?;
    let page = open_page(&args.site, &conf)?;
    let orchestrator = Orchestrator::new(&page, &conf)?;
    let reports = orchestrator.run(&conf.chapters).await?;

    match &args.output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            for report in &reports {
                let path = dir.join(format!("{}.md", report.slug()));
                fs::write(&path, render_report(report))
                    .with_context(|| format!("Writing {}", path.display()))?;
                log::info!(
                    "Wrote {} document(s) to {}",
                    report.documents.len(),
                    path.display()
                );
            }
        }
        None => {
            let mut out = io::stdout().lock();
            for report in &reports {
                writeln!(out, "{}", render_report(report))?;
            }
        }
    }
    Ok(())
}

/// Print the navigation tree of a chapter
#[derive(Debug, clap::Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub site: SiteArgs,
    /// Chapter path, resolved against the base URL
    #[arg(long)]
    pub chapter: String,
}

pub async fn tree(args: TreeArgs) -> anyhow::Result<()> {
    let conf = CrawlerConfig::try_from(&args.site)?;
    let page = open_page(&args.site, &conf)?;
    let tree = Orchestrator::new(&page, &conf)?
        .build_tree(&args.chapter)
        .await?;
    print!("{tree}");
    Ok(())
}

/// Convert a single page body to Markdown and print the result to stdout
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("page").required(true))]
pub struct ConvertArgs {
    /// A local html page to convert
    #[arg(group = "page", long)]
    pub file: Option<PathBuf>,
    /// A distant html page to convert
    #[arg(group = "page", long)]
    pub url: Option<Url>,
    /// Site whose links are stripped, defaults to the page's own site
    #[arg(long)]
    pub base_url: Option<Url>,
    /// Custom user agent to download the page
    #[arg(long, conflicts_with = "file")]
    pub ua: Option<String>,
}

pub async fn convert(args: ConvertArgs) -> anyhow::Result<()> {
    let (html, site) = if let Some(url) = &args.url {
        let fetcher = HttpFetcher::new(args.ua.as_deref().unwrap_or("tocrawl"));
        (fetcher.fetch(url).await?, url.join("/")?)
    } else if let Some(path) = &args.file {
        let html = fs::read_to_string(path)?;
        (html, CrawlerConfig::default().base_url)
    } else {
        anyhow::bail!("Missing `url` or `file`");
    };
    let base_url = args.base_url.unwrap_or(site);
    println!("{}", MarkdownPipeline::new(base_url)?.convert(&html));
    Ok(())
}

fn open_page(site: &SiteArgs, conf: &CrawlerConfig) -> anyhow::Result<DomPage> {
    match &site.snapshot {
        Some(path) => {
            let snapshot = load_snapshot(path)?;
            log::info!("Serving {} page(s) from {}", snapshot.len(), path.display());
            Ok(DomPage::new(Rc::new(snapshot), conf.navigation_deadline()))
        }
        None => Ok(DomPage::from_config(conf)),
    }
}

/// Reads a yaml map of URL to html file, files being relative to the map itself.
fn load_snapshot(path: &Path) -> anyhow::Result<SiteSnapshot> {
    let file = File::open(path).with_context(|| format!("Snapshot {}", path.display()))?;
    let index: BTreeMap<String, PathBuf> = serde_yaml::from_reader(file)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut snapshot = SiteSnapshot::new();
    for (url, page) in index {
        let page = dir.join(page);
        let html = fs::read_to_string(&page)
            .with_context(|| format!("Snapshot page {url} ({})", page.display()))?;
        snapshot.insert(&url, html);
    }
    Ok(snapshot)
}

fn render_report(report: &ChapterReport) -> String {
    report
        .documents
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let rt = runtime::Builder::new_current_thread().enable_all().build()?;

    match args.cmd {
        SubCommand::Crawl(args) => {
            if !args.quiet {
                init_logger();
            }
            rt.block_on(crawl(args))
        }
        SubCommand::Tree(args) => {
            init_logger();
            rt.block_on(tree(args))
        }
        SubCommand::Convert(args) => {
            init_logger();
            rt.block_on(convert(args))
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "tocrawl", &mut io::stdout());
            Ok(())
        }
    }
}
