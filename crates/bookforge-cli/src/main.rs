// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bookforge — genre-aware manuscript formatting
//
// Entry point. Initialises logging, opens the pipeline's persistence under
// the data directory, and dispatches the subcommand.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::human_errors::humanize_error;
use bookforge_core::types::{AccountId, JobId, Tier};
use bookforge_engine::standards::FORMATTING_STANDARDS;
use bookforge_engine::{AccountProfile, Pipeline};

#[derive(Parser)]
#[command(name = "bookforge")]
#[command(author, version, about = "Genre-aware manuscript formatting", long_about = None)]
struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Subscription tier of the acting account.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum TierArg {
    #[default]
    Free,
    Creator,
    Business,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Free => Tier::Free,
            TierArg::Creator => Tier::Creator,
            TierArg::Business => Tier::Business,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Format a manuscript (.docx or .pdf)
    Format {
        /// Input manuscript file
        input: PathBuf,

        /// Target trim size (5x8, 6x9, 7x10, 8.5x11)
        #[arg(long, default_value = "6x9")]
        trim_size: String,

        /// Body font (Times New Roman, Arial, Georgia, Garamond)
        #[arg(long, default_value = "Times New Roman")]
        font: String,

        /// Genre id (see `bookforge genres`)
        #[arg(long)]
        genre: String,

        /// Acting account id
        #[arg(long, default_value = "local")]
        account: String,

        /// Acting account's subscription tier
        #[arg(long, value_enum, default_value_t = TierArg::Free)]
        tier: TierArg,

        /// Where to write the formatted output (defaults to formatted_<input>)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show a job's lifecycle state
    Status {
        /// Job id
        job_id: String,

        /// Acting account id
        #[arg(long, default_value = "local")]
        account: String,
    },

    /// Write a completed job's output to disk
    Fetch {
        /// Job id
        job_id: String,

        /// Acting account id
        #[arg(long, default_value = "local")]
        account: String,

        /// Output path (defaults to the formatted filename)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List an account's jobs, newest first
    History {
        /// Acting account id
        #[arg(long, default_value = "local")]
        account: String,
    },

    /// Show current-month usage against the tier quota
    Usage {
        /// Acting account id
        #[arg(long, default_value = "local")]
        account: String,

        /// Acting account's subscription tier
        #[arg(long, value_enum, default_value_t = TierArg::Free)]
        tier: TierArg,
    },

    /// List genres and their formatting conventions
    Genres {
        /// Tier to evaluate access against
        #[arg(long, value_enum, default_value_t = TierArg::Free)]
        tier: TierArg,
    },

    /// List subscription tiers
    Tiers,

    /// Print the formatting standards reference
    Standards,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    tracing::debug!("Bookforge starting");

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let pipeline = Pipeline::open(&dir)?;

    match cli.command {
        Commands::Format {
            input,
            trim_size,
            font,
            genre,
            account,
            tier,
            out,
        } => {
            let filename = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| BookforgeError::UnsupportedFormat(input.display().to_string()))?;
            let bytes = std::fs::read(&input)?;

            let profile = AccountProfile {
                id: AccountId(account),
                tier: tier.into(),
            };
            let receipt =
                pipeline.upload(&profile, &filename, &bytes, &trim_size, &font, &genre)?;
            println!("job {} {}", receipt.job_id, receipt.status);

            let output = pipeline.fetch_output(&profile.id, &receipt.job_id)?;
            let path = out.unwrap_or_else(|| PathBuf::from(&output.filename));
            std::fs::write(&path, &output.bytes)?;
            println!("wrote {}", path.display());
        }

        Commands::Status { job_id, account } => {
            let view = pipeline.status(&AccountId(account), &parse_job_id(&job_id)?)?;
            println!("job {} {}", view.job_id, view.status);
            if let Some(error) = view.error {
                println!("  {error}");
            }
        }

        Commands::Fetch {
            job_id,
            account,
            out,
        } => {
            let output = pipeline.fetch_output(&AccountId(account), &parse_job_id(&job_id)?)?;
            let path = out.unwrap_or_else(|| PathBuf::from(&output.filename));
            std::fs::write(&path, &output.bytes)?;
            println!("wrote {}", path.display());
        }

        Commands::History { account } => {
            for job in pipeline.history(&AccountId(account))? {
                println!(
                    "{}  {}  {}  {}  {}",
                    job.id,
                    job.created_at.format("%Y-%m-%d %H:%M"),
                    job.status,
                    job.genre.id(),
                    job.original_filename,
                );
            }
        }

        Commands::Usage { account, tier } => {
            let profile = AccountProfile {
                id: AccountId(account),
                tier: tier.into(),
            };
            let report = pipeline.usage(&profile)?;
            println!(
                "{}: {} of {} jobs used",
                report.month.0, report.used, report.limit
            );
        }

        Commands::Genres { tier } => {
            let catalog = pipeline.rules().genre_catalog(tier.into());
            let mut locked = false;
            for listing in &catalog {
                let marker = if listing.allowed { ' ' } else { '*' };
                println!(
                    "{marker} {:<18} {:<18} {:.2} spacing, {:.0}pt",
                    listing.id, listing.display_name, listing.line_spacing, listing.font_size_pt,
                );
                locked |= !listing.allowed;
            }
            if locked {
                println!("* requires an upgraded plan");
            }
        }

        Commands::Tiers => {
            for policy in pipeline.rules().tier_policies() {
                let price = if policy.monthly_price_cents == 0 {
                    "free".to_string()
                } else {
                    format!(
                        "${}.{:02}/mo",
                        policy.monthly_price_cents / 100,
                        policy.monthly_price_cents % 100
                    )
                };
                println!(
                    "{:<10} {:<8} {} jobs/month, {} genres",
                    policy.display_name,
                    price,
                    policy.monthly_limit,
                    policy.allowed_genres.len(),
                );
            }
        }

        Commands::Standards => {
            print!("{FORMATTING_STANDARDS}");
        }
    }

    Ok(())
}

/// Where job records, usage counters, and formatted outputs live when no
/// `--data-dir` is given: `$XDG_DATA_HOME/bookforge`, falling back to
/// `~/.local/share/bookforge`. `Pipeline::open` creates it on first use.
fn default_data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    };
    base.join("bookforge")
}

fn parse_job_id(raw: &str) -> Result<JobId> {
    Uuid::parse_str(raw)
        .map(JobId)
        .map_err(|_| BookforgeError::NotFound)
}
