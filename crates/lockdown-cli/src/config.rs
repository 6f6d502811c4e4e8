use clap::Parser;
use lockdown_core::config::{HttpConfig, RunConfig, DEFAULT_PROGRESS_INTERVAL};

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "lockdown")]
#[command(
    author,
    version,
    about = "Make every project private and apply a permission template to all of them"
)]
#[command(after_help = "Examples:
  LOCKDOWN_TOKEN=... lockdown --base-url https://projects.example.com --template-id AU-Tpxb--iU5OvuD2FLy
  lockdown --base-url https://projects.example.com --template-id tpl-1 --max-batch-size 200
  lockdown --base-url https://projects.example.com --template-id tpl-1 --dry-run")]
pub struct Config {
    /// Base URL of the service; requests go to <URL>/api/...
    #[arg(long, value_name = "URL")]
    pub base_url: String,

    /// Authentication token, sent as the basic-auth username. Read from the
    /// environment; the flag is hidden so the token stays out of help output
    #[arg(long, env = "LOCKDOWN_TOKEN", hide = true, hide_env_values = true)]
    pub token: String,

    /// Permission template to apply to every project
    #[arg(long, value_name = "ID")]
    pub template_id: String,

    /// Projects requested per listing page
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..=500))]
    pub page_size: u32,

    /// Read timeout for every request, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 120_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub read_timeout: u64,

    /// Projects per bulk template call
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub max_batch_size: u64,

    /// Maximum number of requests in flight per phase (unlimited when omitted)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// List projects and plan the batches without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::with_read_timeout_ms(self.read_timeout)
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            page_size: self.page_size,
            max_batch_size: self.max_batch_size as usize,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            concurrency: self.concurrency.map(|n| n as usize),
            dry_run: self.dry_run,
        }
    }
}
