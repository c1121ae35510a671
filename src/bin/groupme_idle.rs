use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};

use groupme_idle::api::GroupDirectory;
use groupme_idle::config::{self, ClientConfig, ScanConfig};
use groupme_idle::{GroupMeClient, IdleError, InactivityScanner, output};

/// Find members of a GroupMe group who have gone quiet
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(flatten)]
    verbosity: Verbosity,

    /// GroupMe access token (falls back to GROUPME_TOKEN, then ~/.groupy.key)
    #[clap(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// Base URL of the GroupMe API
    #[clap(long, global = true, value_name = "URL", default_value = config::DEFAULT_BASE_URL)]
    api_url: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct Verbosity {
    /// Show very detailed logging
    #[clap(short, long, conflicts_with = "quiet")]
    debug: bool,

    /// Show very little logging
    #[clap(short, long)]
    quiet: bool,
}

impl Verbosity {
    fn level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report days since each member's last post or like
    Inactive {
        /// Days to go back checking for activity
        #[clap(short = 'D', long, default_value_t = ScanConfig::DEFAULT_LOOKBACK_DAYS)]
        days: u32,

        /// GroupMe group ID to check; lists visible groups when omitted
        group_id: Option<String>,
    },
    /// List the members of a group
    Members {
        /// GroupMe group ID to list; lists visible groups when omitted
        group_id: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    groupme_idle::init_tracing(args.verbosity.level());

    let code = match run(args).await {
        Ok(()) => 0,
        Err(err) => {
            match err.downcast_ref::<IdleError>() {
                Some(IdleError::GroupNotFound(_)) => {
                    tracing::error!("{}. Run without a group ID to list visible groups.", err)
                }
                _ => tracing::error!("{:#}", err),
            }
            1
        }
    };

    groupme_idle::flush_tracing();
    std::process::exit(code);
}

async fn run(args: Args) -> Result<()> {
    let token = config::resolve_token(args.token)?;
    let client = GroupMeClient::new(&ClientConfig::new(token).with_base_url(args.api_url))
        .context("Failed to build GroupMe client")?;

    let mut stdout = std::io::stdout().lock();

    match args.command {
        Command::Inactive { group_id: None, .. } | Command::Members { group_id: None } => {
            let groups = client.list_groups().await?;
            output::write_group_list(&mut stdout, &groups)?;
        }
        Command::Members {
            group_id: Some(group_id),
        } => {
            let listing = groupme_idle::list_members(&client, &group_id).await?;
            output::write_membership(&mut stdout, &listing)?;
        }
        Command::Inactive {
            days,
            group_id: Some(group_id),
        } => {
            let report = InactivityScanner::new(&client, &client, ScanConfig::new(days))
                .scan(&group_id)
                .await?;
            if report.walk_terminal.is_partial() {
                tracing::warn!(
                    "History walk ended early; members may be reported as less active than they are"
                );
            }
            output::write_inactivity_report(&mut stdout, &report)?;
        }
    }

    Ok(())
}
