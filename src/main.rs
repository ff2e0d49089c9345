use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use yansi::Paint;

use selcheck::{CheckerConfig, DuplicateGroup, LocatorConfig, SelectorChecker, SelectorPattern};

#[derive(Parser, Debug)]
#[command(name = "selcheck")]
#[command(about = "Check for duplicate component selectors across your project")]
#[command(version)]
struct Args {
    /// Paths to check, separated by semicolons (e.g. "apps/web-app;libs")
    paths: String,

    /// Component file suffix
    #[arg(short, long, default_value = selcheck::DEFAULT_COMPONENT_SUFFIX)]
    suffix: String,

    /// Extraction pattern with exactly one capture group
    #[arg(long, default_value = selcheck::DEFAULT_SELECTOR_PATTERN)]
    selector_pattern: String,

    /// Emit the duplicate groups as JSON instead of the report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so the report stream stays clean.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    let paths: Vec<PathBuf> = args
        .paths
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();
    if paths.is_empty() {
        anyhow::bail!("No paths to check");
    }

    let checker = SelectorChecker::new(CheckerConfig {
        locator: LocatorConfig {
            component_suffix: args.suffix,
            ..LocatorConfig::default()
        },
        selector_pattern: SelectorPattern::new(&args.selector_pattern)?,
    });

    println!("{}", "Starting duplicate selectors check...".blue());
    let results = checker.check(&paths).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        for path in &paths {
            let count = checker.file_count(path).await;
            println!(
                "{}",
                format!(
                    "No duplicate selectors found in {} ({} files checked)",
                    path.display(),
                    count
                )
                .green()
            );
        }
        println!("{}", "Duplicate selector check complete.".blue());
    } else {
        println!("{}", "Duplicate selectors found!".yellow());
        for group in &results {
            print_group(group);
        }

        println!("\n{}", "Summary:".yellow());
        for group in &results {
            println!(
                "- {}: {} instances found",
                format!("\"{}\"", group.selector).cyan(),
                group.instances.len()
            );
        }
        println!("{}", "Duplicate selector check complete.".blue());
    }

    if !results.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_group(group: &DuplicateGroup) {
    println!(
        "\n{}",
        format!("Duplicate selector \"{}\"", group.selector).cyan()
    );
    for (index, instance) in group.instances.iter().enumerate() {
        let name = instance
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| instance.display().to_string());
        println!("  Instance {}: {}", index + 1, name);
        println!("    {}", instance.display().dim());
    }
}
