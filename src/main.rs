//! kgprep CLI: knowledge-graph / interaction-log preprocessing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use kgprep::config::PrepConfig;
use kgprep::{expconfig, pipeline};

#[derive(Parser)]
#[command(name = "kgprep", version, about = "Knowledge-graph dataset preprocessing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full preprocessing pipeline over a data folder.
    Run {
        /// Data folder with dataset.tsv and knowledge/{kg,linking}.tsv.
        #[arg(long)]
        data_folder: Option<PathBuf>,

        /// TOML config file; CLI flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Minimum user/item degree for the k-core filter.
        #[arg(long)]
        core: Option<usize>,

        /// Test holdout ratio.
        #[arg(long)]
        test_ratio: Option<f64>,

        /// Validation holdout ratio.
        #[arg(long)]
        val_ratio: Option<f64>,

        /// Seed for the random split.
        #[arg(long)]
        seed: Option<u64>,

        /// Split by timestamp order instead of the seeded random strategy.
        #[arg(long)]
        temporal: bool,

        /// Print the run report as JSON instead of text.
        #[arg(long)]
        json_report: bool,

        /// Notification reference: reads <ref>_info.txt (credentials) and
        /// <ref>_message.txt (messages), and emails the run outcome.
        /// Requires a build with the `email` feature.
        #[arg(long)]
        email: Option<String>,
    },

    /// Generate the evaluation config referencing the split artifacts.
    Expconfig {
        /// Dataset name (folder under ../data/).
        #[arg(long)]
        dataset: String,

        /// Ranking cutoff for the metrics.
        #[arg(long, default_value = "10")]
        cutoff: usize,

        /// Folder holding pre-computed recommendation lists.
        #[arg(long)]
        recs: String,

        /// Output directory for the config file.
        #[arg(long, default_value = "config_files")]
        out: PathBuf,
    },

    /// Send the configured notification messages.
    #[cfg(feature = "email")]
    Notify {
        /// Credentials TSV (sender/receiver rows).
        #[arg(long)]
        credentials: PathBuf,

        /// Messages TSV (role, subject, body rows).
        #[arg(long)]
        messages: PathBuf,

        /// SMTP relay host.
        #[arg(long, default_value = kgprep::notify::DEFAULT_SMTP_HOST)]
        smtp_host: String,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data_folder,
            config,
            core,
            test_ratio,
            val_ratio,
            seed,
            temporal,
            json_report,
            email,
        } => {
            let mut prep = match (config, data_folder.clone()) {
                (Some(path), _) => PrepConfig::from_file(&path)?,
                (None, Some(folder)) => PrepConfig::new(folder),
                (None, None) => miette::bail!("either --data-folder or --config is required"),
            };
            if let Some(folder) = data_folder {
                prep.data_folder = folder;
            }
            if let Some(core) = core {
                prep.core = core;
            }
            if let Some(ratio) = test_ratio {
                prep.test_ratio = ratio;
            }
            if let Some(ratio) = val_ratio {
                prep.val_ratio = ratio;
            }
            if let Some(seed) = seed {
                prep.seed = seed;
            }
            if temporal {
                prep.temporal = true;
            }

            #[cfg(not(feature = "email"))]
            if email.is_some() {
                miette::bail!("this build has no email support; rebuild with --features email");
            }

            match pipeline::run(&prep) {
                Ok(report) => {
                    if json_report {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&report).into_diagnostic()?
                        );
                    } else {
                        println!("{report}");
                    }
                    #[cfg(feature = "email")]
                    if let Some(reference) = email {
                        notify_outcome(&reference, Ok(&report));
                    }
                    Ok(())
                }
                Err(err) => {
                    #[cfg(feature = "email")]
                    if let Some(reference) = email {
                        notify_outcome(&reference, Err(&err));
                    }
                    Err(err.into())
                }
            }
        }

        Commands::Expconfig {
            dataset,
            cutoff,
            recs,
            out,
        } => {
            let path = expconfig::write(&out, &dataset, cutoff, &recs)?;
            println!("Wrote experiment config to {}", path.display());
            Ok(())
        }

        #[cfg(feature = "email")]
        Commands::Notify {
            credentials,
            messages,
            smtp_host,
        } => {
            use kgprep::notify;

            let (senders, receivers) = notify::read_credentials(&credentials)?;
            let notices = notify::read_notices(&messages)?;
            let delivered = notify::send_all(&senders, &receivers, &notices, &smtp_host);
            println!("Delivered {delivered} notification(s)");
            Ok(())
        }
    }
}

/// Send the run outcome to the configured receivers. Never fails the run.
#[cfg(feature = "email")]
fn notify_outcome(
    reference: &str,
    outcome: std::result::Result<&pipeline::RunReport, &kgprep::error::PrepError>,
) {
    use kgprep::notify;

    let credentials_path = PathBuf::from(format!("{reference}_info.txt"));
    let (senders, receivers) = match notify::read_credentials(&credentials_path) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "cannot read notification credentials");
            return;
        }
    };

    let notices = match outcome {
        Ok(report) => {
            let messages_path = PathBuf::from(format!("{reference}_message.txt"));
            match notify::read_notices(&messages_path) {
                Ok(notices) if !notices.is_empty() => notices,
                _ => vec![notify::Notice::success(&report.to_string())],
            }
        }
        Err(err) => vec![notify::Notice::failure(&err.to_string())],
    };

    notify::send_all(&senders, &receivers, &notices, notify::DEFAULT_SMTP_HOST);
}
