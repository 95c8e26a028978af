mod aggregate;
mod crawler;
mod dataset;
mod error;
mod insights;
mod parser;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use insights::ReferenceCountries;
use settings::Settings;

#[derive(Parser)]
#[command(name = "coara_signatories", about = "CoARA signatories crawler and country insights")]
struct Cli {
    /// Dataset CSV (overrides COARA_DATASET_PATH)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Freshness date file (overrides COARA_FRESHNESS_PATH)
    #[arg(long, global = true)]
    freshness: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the signatories site and overwrite the dataset
    Crawl {
        /// Landing page listing the categories
        #[arg(long)]
        url: Option<String>,
        /// Give up on a category after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },
    /// Show when the dataset was last refreshed
    Freshness,
    /// Show dataset statistics
    Stats,
    /// Signatories per country
    Overview {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Reference country names, one per line
        #[arg(long)]
        countries: Option<PathBuf>,
    },
    /// List the signatories of one country
    Country {
        name: String,
        /// Reference country names, one per line
        #[arg(long)]
        countries: Option<PathBuf>,
    },
    /// Signatories filed under organization types
    Types,
    /// Signatories from EU widening countries
    Widening,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(path) = cli.dataset {
        settings.dataset_path = path;
    }
    if let Some(path) = cli.freshness {
        settings.freshness_path = path;
    }

    let result = match cli.command {
        Commands::Crawl { url, max_pages } => {
            if let Some(url) = url {
                settings.base_url = url;
            }
            if let Some(max_pages) = max_pages {
                settings.max_pages_per_category = max_pages;
            }
            settings.validate()?;
            println!("Crawling {} ...", settings.base_url);
            let fetcher = crawler::HttpFetcher::new();
            let today = chrono::Local::now().date_naive();
            let report = crawler::refresh(&fetcher, &settings, today)?;
            println!(
                "Crawled {} categories over {} pages: {} signatories.",
                report.categories, report.pages, report.rows
            );
            if report.is_consistent() {
                println!("Last updated: {}", report.stamped);
            } else {
                print_save_status("Freshness", &report.freshness);
                print_save_status("Dataset", &report.dataset);
                println!("Last updated: unknown (files may describe different crawls)");
            }
            Ok(())
        }
        Commands::Freshness => {
            println!(
                "Last updated: {}",
                dataset::read_stored_date(&settings.freshness_path)
            );
            Ok(())
        }
        Commands::Stats => {
            let rows = dataset::read_dataset(&settings.dataset_path)?;
            let categories = insights::country_counts(&rows).len();
            println!("Rows:         {}", rows.len());
            println!("Categories:   {}", categories);
            println!(
                "Last updated: {}",
                dataset::read_stored_date(&settings.freshness_path)
            );
            Ok(())
        }
        Commands::Overview { limit, countries } => {
            let reference = reference_countries(countries, &settings)?;
            let rows = insights::filter_countries(
                &dataset::read_dataset(&settings.dataset_path)?,
                &reference,
            );
            let counts = insights::country_counts(&rows);
            if counts.is_empty() {
                println!("No signatories found. Run 'crawl' first.");
                return Ok(());
            }

            println!(
                "Last updated: {}\n",
                dataset::read_stored_date(&settings.freshness_path)
            );
            println!("{:>3} | {:<32} | {:>10}", "#", "Country", "Signatories");
            println!("{}", "-".repeat(52));
            for (i, c) in counts.iter().take(limit).enumerate() {
                println!("{:>3} | {:<32} | {:>10}", i + 1, truncate(&c.country, 32), c.count);
            }
            println!("\n{} countries | {} signatories", counts.len(), rows.len());
            Ok(())
        }
        Commands::Country { name, countries } => {
            let reference = reference_countries(countries, &settings)?;
            let rows = insights::filter_countries(
                &dataset::read_dataset(&settings.dataset_path)?,
                &reference,
            );
            let name = insights::normalize_country(name.trim()).to_string();
            let orgs = insights::signatories_of(&rows, &name);
            match orgs.len() {
                0 => println!("No signatories in {}", name),
                1 => println!("There is only one signatory in {}", name),
                n => println!("There are {} signatories in {}", n, name),
            }
            for org in orgs {
                println!("- {}", org);
            }
            Ok(())
        }
        Commands::Types => {
            let rows = dataset::read_dataset(&settings.dataset_path)?;
            let counts = insights::organization_type_counts(&rows);
            if counts.is_empty() {
                println!("No organization-type categories in the dataset.");
                return Ok(());
            }
            for (label, count) in counts {
                println!("{:<24} {:>6}", label, count);
            }
            Ok(())
        }
        Commands::Widening => {
            let rows = dataset::read_dataset(&settings.dataset_path)?;
            let counts = insights::widening_counts(&rows);
            if counts.is_empty() {
                println!("No signatories from EU widening countries.");
                return Ok(());
            }
            for c in &counts {
                println!("{:<24} {:>6}", c.country, c.count);
            }
            let total: usize = counts.iter().map(|c| c.count).sum();
            println!("\n{} countries | {} signatories", counts.len(), total);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn reference_countries(
    flag: Option<PathBuf>,
    settings: &Settings,
) -> anyhow::Result<ReferenceCountries> {
    match flag.or_else(|| settings.reference_countries_path.clone()) {
        Some(path) => ReferenceCountries::load(&path),
        None => Ok(ReferenceCountries::any()),
    }
}

fn print_save_status(what: &str, status: &crawler::SaveStatus) {
    match status {
        crawler::SaveStatus::Saved => println!("{}: saved", what),
        crawler::SaveStatus::Failed(e) => println!("{}: NOT saved ({})", what, e),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Italy", 32), "Italy");
        assert_eq!(truncate("Bosnia and Herzegovina", 6), "Bosnia...");
    }

    #[test]
    fn duration_formats() {
        use std::time::Duration;
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn cli_parses_global_paths() {
        let cli = Cli::parse_from(["coara_signatories", "overview", "--dataset", "x.csv", "-n", "5"]);
        assert_eq!(cli.dataset, Some(PathBuf::from("x.csv")));
        assert!(matches!(cli.command, Commands::Overview { limit: 5, .. }));
    }
}
