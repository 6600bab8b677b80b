use clap::Parser;
use issue_stats_app::args::{Args, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    issue_stats_app::init();
    let args = Args::parse();

    match args.command {
        Command::Fetch(fetch) => {
            println!("Getting issues...");
            let path = issue_stats_app::fetch_issues(fetch).await?;
            println!("Issues saved to {}", path.display());
        }
        Command::Report(report) => {
            let summary = issue_stats_app::build_report(report)?;
            print!("{}", summary);
        }
    }

    Ok(())
}
