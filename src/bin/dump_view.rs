use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use aram_board::config::{self, DataConfig};
use aram_board::dataset::{DataCache, Datasets};
use aram_board::selector::filter_by_name_substring;
use aram_board::view::assemble_dashboard;

fn main() -> Result<()> {
    config::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let mut config = DataConfig::from_env();
    if let Some(dir) = parse_dir_arg(&args) {
        config = DataConfig {
            top_n: config.top_n,
            ..DataConfig::with_dir(dir)
        };
    }
    let query = args
        .iter()
        .find(|arg| !arg.starts_with("--") && !is_dir_value(&args, arg))
        .cloned()
        .unwrap_or_default();

    let mut cache = DataCache::new();
    let datasets = Datasets::load(&mut cache, &config).context("load champion data")?;
    for warning in cache.warnings() {
        eprintln!("warning: {warning}");
    }

    let matches = filter_by_name_substring(datasets.master.names(), &query);
    let Some(champion) = matches.first() else {
        bail!("no champion matches {query:?}");
    };
    let view = assemble_dashboard(&datasets, champion, config.top_n)?;
    let json = serde_json::to_string_pretty(&view).context("serialize dashboard")?;
    println!("{json}");
    Ok(())
}

fn parse_dir_arg(args: &[String]) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--dir=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--dir" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

fn is_dir_value(args: &[String], candidate: &String) -> bool {
    args.windows(2)
        .any(|pair| pair[0] == "--dir" && std::ptr::eq(&pair[1], candidate))
}
