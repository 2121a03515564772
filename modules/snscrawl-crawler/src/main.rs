use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use snscrawl_common::{Config, CrawlError, CrawlResult, Platform, Post};
use snscrawl_crawler::export::{self, WebhookExporter};
use snscrawl_crawler::feed::{collect_posts, CrawlBudget};
use snscrawl_crawler::{login, platforms};
use webdriver_client::{DriverOptions, PageDriver};

#[derive(Parser)]
#[command(
    name = "snscrawl",
    about = "Social feed crawler with persistent browser sessions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl the Threads home feed
    Threads(CrawlArgs),
    /// Crawl the LinkedIn feed
    Linkedin(CrawlArgs),
    /// Crawl the X home timeline
    X(CrawlArgs),
    /// Crawl the Reddit front page
    Reddit(CrawlArgs),
    /// Crawl GeekNews topics
    Geeknews(CrawlArgs),
}

#[derive(Args)]
struct CrawlArgs {
    /// How many posts to collect
    #[arg(short, long, default_value_t = 5)]
    count: usize,

    /// Output file (default: data/<platform>_<timestamp>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show the browser, save screenshots, log verbosely
    #[arg(short, long)]
    debug: bool,

    /// Also export to the spreadsheet webhook (SHEETS_WEBHOOK_URL)
    #[arg(long)]
    sheet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let (platform, args) = match cli.command {
        Command::Threads(args) => (Platform::Threads, args),
        Command::Linkedin(args) => (Platform::LinkedIn, args),
        Command::X(args) => (Platform::X, args),
        Command::Reddit(args) => (Platform::Reddit, args),
        Command::Geeknews(args) => (Platform::GeekNews, args),
    };

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(platform, &args).await {
        error!(error = %e, "Crawl failed");
        if let CrawlError::Login { .. } = e {
            eprintln!();
            eprintln!("Login failed. Things to check:");
            eprintln!(
                "  - {0}_USERNAME / {0}_PASSWORD in the environment or .env",
                platform.as_str().to_uppercase()
            );
            eprintln!("  - run with --debug to watch the browser and pass any challenge once");
            eprintln!("  - a stale session blob is discarded automatically on the next run");
        }
        std::process::exit(1);
    }
}

async fn run(platform: Platform, args: &CrawlArgs) -> Result<(), CrawlError> {
    let config = Config::from_env()?;
    let debug_mode = args.debug || config.debug;

    info!(%platform, count = args.count, debug = debug_mode, "Starting crawl");

    let opts = DriverOptions {
        headless: !debug_mode,
        user_agent: config.user_agent.clone(),
        page_load_timeout: Duration::from_millis(config.login_timeout_ms),
    };
    let driver = PageDriver::connect(&config.webdriver_url, &opts)
        .await
        .map_err(|e| CrawlError::Driver(e.to_string()))?;

    // Always tear the browser down, crawl outcome notwithstanding.
    let outcome = crawl(&driver, platform, args, &config, debug_mode).await;
    if let Err(e) = driver.quit().await {
        warn!(error = %e, "Browser did not shut down cleanly");
    }
    let posts = outcome?;

    if posts.is_empty() {
        eprintln!("No posts were extracted from {platform}.");
        if platform.requires_login() {
            eprintln!("The feed may require a (fresh) login; try --debug to watch the browser.");
        } else {
            eprintln!("The site markup may have changed; try --debug to watch the browser.");
        }
        return Err(CrawlError::Extraction(format!(
            "no posts extracted from {platform}"
        )));
    }

    let result = CrawlResult::new(platform, posts);
    let output = args.output.clone().unwrap_or_else(|| {
        export::default_output_path(&config.data_dir, platform, result.metadata.crawled_at)
    });
    export::write_json(&result, &output)?;

    if args.sheet {
        match config.webhook_url {
            Some(ref url) => {
                let exporter = WebhookExporter::new(url);
                match exporter.export(&result).await {
                    Ok(Some(sheet_url)) => info!(sheet_url, "Spreadsheet updated"),
                    Ok(None) => info!("Spreadsheet updated"),
                    // Local file is already written; remote failure is a warning.
                    Err(e) => warn!(error = %e, "Webhook export failed, local output kept"),
                }
            }
            None => warn!("--sheet given but SHEETS_WEBHOOK_URL is not set"),
        }
    }

    print_summary(&result, &output);
    Ok(())
}

async fn crawl(
    driver: &PageDriver,
    platform: Platform,
    args: &CrawlArgs,
    config: &Config,
    debug: bool,
) -> Result<Vec<Post>, CrawlError> {
    login::ensure_logged_in(driver, platform, config).await?;

    driver
        .goto(platform.feed_url())
        .await
        .map_err(|e| CrawlError::Driver(e.to_string()))?;
    driver.settle(Duration::from_millis(3000)).await;

    if debug {
        let shot = config.screenshot_dir().join(format!("{platform}_feed.png"));
        if let Err(e) = driver.screenshot_to(&shot).await {
            warn!(error = %e, "Screenshot failed");
        }
    }

    let mut feed = platforms::feed_for(platform, driver);
    let posts = collect_posts(feed.as_mut(), &CrawlBudget::with_target(args.count)).await?;
    Ok(posts)
}

fn print_summary(result: &CrawlResult, output: &std::path::Path) {
    println!();
    println!("Crawl summary");
    println!("  platform : {}", result.metadata.platform);
    println!("  posts    : {}", result.metadata.total_posts);
    println!("  output   : {}", output.display());

    if let Some(first) = result.posts.first() {
        let preview: String = first.content.chars().take(100).collect();
        println!();
        println!("First post");
        println!("  author : @{}", first.author);
        println!("  content: {preview}");
        println!("  posted : {}", first.timestamp);
    }
}
