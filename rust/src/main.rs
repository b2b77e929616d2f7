//! Command-line front end for the hash pipeline sandbox. Each command feeds a
//! password, salt, and pipeline into the library and prints the result as
//! text or, with `--json`, as pretty-printed JSON.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use hashlab_rs::config::{load_or_default, RuntimeConfig};
use hashlab_rs::logging;
use hashlab_rs::pipeline::presets::{self, PRESETS};
use hashlab_rs::pipeline::{avalanche_report, avalanche_survey, catalog, evaluate, AvalancheRow, Pipeline, Step};
use hashlab_rs::reference::{sha256_avalanche, sha256_hex};
use hashlab_rs::strength::estimate;

#[derive(Parser)]
#[command(
    name = "hashlab",
    version,
    about = "Compose toy hash pipelines, trace every step, and measure avalanche"
)]
struct Cli {
    /// JSON config file (defaults to $HASHLAB_CONFIG, then ./hashlab.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct PipelineArgs {
    /// Comma separated step ids, e.g. `charcode_sum,avalanche,hex_encode`.
    #[arg(long, conflicts_with = "preset")]
    steps: Option<String>,

    /// Named pipeline from the config file or the built-in presets.
    #[arg(long)]
    preset: Option<String>,

    /// Salt appended to the password (overrides the config salt).
    #[arg(long)]
    salt: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a pipeline and print the per-step trace.
    Run {
        password: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Compare the digest against single-character mutations of the password.
    Avalanche {
        password: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Average avalanche over many random passwords.
    Survey {
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Random passwords to mutate (capped at 10000).
        #[arg(long, default_value_t = 100)]
        trials: usize,
        #[arg(long, default_value_t = 12)]
        length: usize,
        /// Seed for reproducible passwords.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Estimate password strength from entropy heuristics.
    Strength { password: String },
    /// SHA-256 of the same input, with the same mutations, for contrast.
    Reference {
        password: String,
        #[arg(long)]
        salt: Option<String>,
    },
    /// List every step in the catalog.
    Catalog,
    /// List built-in and configured pipelines.
    Presets,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref()).context("load config")?;
    logging::init(config.log_level.as_deref());
    info!(pipelines = config.pipelines.len(), "config ready");

    let json = cli.json;
    match cli.command {
        Command::Run { password, pipeline } => cmd_run(&config, &password, &pipeline, json),
        Command::Avalanche { password, pipeline } => cmd_avalanche(&config, &password, &pipeline, json),
        Command::Survey {
            pipeline,
            trials,
            length,
            seed,
        } => cmd_survey(&config, &pipeline, trials, length, seed, json),
        Command::Strength { password } => cmd_strength(&password, json),
        Command::Reference { password, salt } => {
            let salt = salt.or_else(|| config.salt.clone()).unwrap_or_default();
            cmd_reference(&password, &salt, json)
        }
        Command::Catalog => cmd_catalog(json),
        Command::Presets => cmd_presets(&config, json),
    }
}

/// Picks the pipeline and salt for a command. An empty selection is passed
/// through so the evaluator reports it as an empty pipeline.
fn select(config: &RuntimeConfig, args: &PipelineArgs) -> Result<(Pipeline, String)> {
    let pipeline = match (&args.steps, &args.preset) {
        (Some(list), _) => Pipeline::parse_list(list),
        (None, Some(name)) => config
            .pipeline(name)
            .cloned()
            .or_else(|| presets::find(name).map(|preset| preset.pipeline()))
            .ok_or_else(|| anyhow!("unknown preset '{name}'; see `hashlab presets`"))?,
        (None, None) => Pipeline::new(),
    };
    let salt = args
        .salt
        .clone()
        .or_else(|| config.salt.clone())
        .unwrap_or_default();
    Ok((pipeline, salt))
}

fn cmd_run(config: &RuntimeConfig, password: &str, args: &PipelineArgs, json: bool) -> Result<()> {
    let (pipeline, salt) = select(config, args)?;
    let result = evaluate(password, &salt, &pipeline)
        .context("evaluate pipeline (add steps with --steps or pick a --preset)")?;
    if json {
        return print_json(&result);
    }

    println!("pipeline: {pipeline}");
    for (i, entry) in result.trace.iter().enumerate() {
        let icon = Step::from_id(entry.step_id).map(|s| s.info().icon).unwrap_or("?");
        let shown = entry.display.clone().unwrap_or_else(|| entry.value.to_string());
        println!("{:>3}. {icon} {:<24} {shown}", i + 1, entry.step_label);
        println!("     {}", entry.description);
    }
    println!("final accumulator: {}", result.final_accumulator);
    println!("final hash:        {}", result.final_hash);
    Ok(())
}

fn cmd_avalanche(config: &RuntimeConfig, password: &str, args: &PipelineArgs, json: bool) -> Result<()> {
    let (pipeline, salt) = select(config, args)?;
    let rows = avalanche_report(password, &salt, &pipeline)
        .context("avalanche report (add steps with --steps or pick a --preset)")?;
    if json {
        return print_json(&rows);
    }
    println!("pipeline: {pipeline}");
    print_rows(&rows);
    Ok(())
}

fn cmd_survey(
    config: &RuntimeConfig,
    args: &PipelineArgs,
    trials: usize,
    length: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let (pipeline, salt) = select(config, args)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let summary = avalanche_survey(&mut rng, &salt, &pipeline, trials, length)
        .context("avalanche survey (add steps with --steps or pick a --preset)")?;
    if json {
        return print_json(&summary);
    }
    println!("pipeline: {pipeline}");
    println!("trials: {} ({} mutated runs)", summary.trials, summary.samples);
    println!(
        "hex chars changed: mean {:.1}%  min {}%  max {}%",
        summary.mean_diff_percent, summary.min_diff_percent, summary.max_diff_percent
    );
    println!("bits changed:      mean {:.1}%", summary.mean_bit_diff_percent);
    Ok(())
}

fn cmd_strength(password: &str, json: bool) -> Result<()> {
    let report = estimate(password);
    if json {
        return print_json(&report);
    }
    println!("strength: {} ({}/4)", report.label.as_str(), report.score);
    println!(
        "entropy:  {:.1} bits (pool {} → {:.1} bits, minus {:.1} for patterns)",
        report.entropy_bits, report.pool_size, report.pool_entropy_bits, report.penalty_bits
    );
    println!("shannon:  {:.2} bits/char over {} chars", report.shannon_bits_per_char, report.length);
    for suggestion in &report.suggestions {
        println!("  - {suggestion}");
    }
    Ok(())
}

fn cmd_reference(password: &str, salt: &str, json: bool) -> Result<()> {
    let report = sha256_avalanche(password, salt);
    if json {
        return print_json(&report);
    }
    println!("{}: {}", report.algorithm, sha256_hex(password, salt));
    print_rows(&report.rows);
    Ok(())
}

fn cmd_catalog(json: bool) -> Result<()> {
    let entries = catalog();
    if json {
        return print_json(&entries);
    }
    for entry in entries {
        println!("{} {:<14} {:<24} {}", entry.icon, entry.id, entry.label, entry.formula);
    }
    Ok(())
}

#[derive(Serialize)]
struct PresetListing<'a> {
    name: &'a str,
    source: &'static str,
    pipeline: &'a Pipeline,
}

fn cmd_presets(config: &RuntimeConfig, json: bool) -> Result<()> {
    let builtin: Vec<(&str, Pipeline)> = PRESETS.iter().map(|p| (p.name, p.pipeline())).collect();
    let mut listings: Vec<PresetListing<'_>> = builtin
        .iter()
        .filter(|(name, _)| config.pipeline(name).is_none())
        .map(|(name, pipeline)| PresetListing {
            name,
            source: "built-in",
            pipeline,
        })
        .collect();
    listings.extend(config.pipelines.iter().map(|(name, pipeline)| PresetListing {
        name,
        source: "config",
        pipeline,
    }));

    if json {
        return print_json(&listings);
    }
    for listing in listings {
        println!("{:<12} [{}] {}", listing.name, listing.source, listing.pipeline);
    }
    Ok(())
}

fn print_rows(rows: &[AvalancheRow]) {
    for row in rows {
        println!(
            "{:<18} {}  chars {:>3}%  bits {:>3}%",
            row.label, row.hash, row.diff_percent, row.bit_diff_percent
        );
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}
