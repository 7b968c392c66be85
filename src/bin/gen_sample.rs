use std::path::PathBuf;

use anyhow::{Context, Result};

use aram_board::sample::SampleSet;

const DEFAULT_CHAMPIONS: usize = 40;
const DEFAULT_SEED: u64 = 2024;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let out = arg_value(&args, "out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let champions = arg_value(&args, "champions")
        .map(|raw| raw.parse::<usize>())
        .transpose()
        .context("--champions must be a positive integer")?
        .unwrap_or(DEFAULT_CHAMPIONS)
        .max(1);
    let seed = arg_value(&args, "seed")
        .map(|raw| raw.parse::<u64>())
        .transpose()
        .context("--seed must be an unsigned integer")?
        .unwrap_or(DEFAULT_SEED);

    let sample = SampleSet::generate(champions, seed)?;
    let written = sample.write_to(&out)?;

    println!("Sample dataset written");
    println!("Champions: {}", sample.champions);
    println!("Seed: {seed}");
    for path in written {
        println!(" - {}", path.display());
    }
    Ok(())
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("--{name}=");
    let flag = format!("--{name}");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
