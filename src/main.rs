use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use firstcry_e2e::{report, runner};

#[derive(Parser)]
#[command(name = "firstcry-e2e")]
#[command(version = "0.1.0")]
#[command(about = "Browser end-to-end tests for the FirstCry storefront", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the storefront suite in one browser session
    Run {
        /// Suite configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for reports
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for failure screenshots
        #[arg(long)]
        screenshots: Option<PathBuf>,

        /// Run the browser without a window
        #[arg(long, default_value = "false")]
        headless: bool,

        /// Generate reports (JSON, HTML, JUnit)
        #[arg(long, default_value = "false")]
        report: bool,

        /// Type this OTP instead of waiting for manual entry
        #[arg(long)]
        otp_code: Option<String>,
    },

    /// Generate report from test results
    Report {
        /// Path to test results JSON
        results: PathBuf,

        /// Output format (json, html, junit)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            screenshots,
            headless,
            report,
            otp_code,
        } => {
            println!("{} Running FirstCry storefront suite", "▶".green().bold());
            if let Some(ref path) = config {
                println!("  Config: {}", path.display().to_string().cyan());
            }
            if headless {
                println!("  Headless: {}", "Enabled".yellow());
            }

            let summary = runner::run_suite(runner::RunOptions {
                config,
                output,
                screenshots,
                headless,
                report,
                otp_code,
            })
            .await?;

            if summary.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}
