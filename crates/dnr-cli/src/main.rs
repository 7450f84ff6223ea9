//! DNR rule set compiler CLI
//!
//! Converts pre-parsed filter rules into a declarative rule set.

mod input;
mod output;

use std::time::Instant;

use clap::{Parser, Subcommand};
use log::{info, warn};

use dnr_compiler::grouper::{GroupedRules, RulesGroup};
use dnr_compiler::{convert, ConverterOptions};

use crate::input::{load_filters, load_options};
use crate::output::{write_rule_set, write_source_map};

#[derive(Parser)]
#[command(name = "dnr-cli")]
#[command(about = "Compiles filter rules into declarative rule sets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input filter rule files (JSON)
    #[arg(short, long, required = true)]
    input: Vec<String>,

    /// Converter options file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Base path of bundled redirect resources
    #[arg(long)]
    resources_path: Option<String>,

    /// Maximum number of declarative rules (0 for no limit)
    #[arg(long)]
    max_rules: Option<usize>,

    /// Maximum number of regex rules (0 for no limit)
    #[arg(long)]
    max_regexp_rules: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl ConvertArgs {
    fn options(&self) -> Result<ConverterOptions, String> {
        let mut options = load_options(self.config.as_deref())?;
        if let Some(path) = &self.resources_path {
            options.resources_path = Some(path.clone());
        }
        if self.max_rules.is_some() {
            options.max_number_of_rules = self.max_rules;
        }
        if self.max_regexp_rules.is_some() {
            options.max_number_of_regexp_rules = self.max_regexp_rules;
        }
        Ok(options)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert filter rules into a declarative rule set
    Convert {
        #[command(flatten)]
        args: ConvertArgs,

        /// Output rule set file
        #[arg(short, long, default_value = "ruleset.json")]
        output: String,

        /// Output file for the source map, errors and limitations
        #[arg(short, long)]
        source_map: Option<String>,
    },

    /// Print group and limit counts without writing anything
    Stats {
        #[command(flatten)]
        args: ConvertArgs,
    },
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            args,
            output,
            source_map,
        } => {
            init_logger(args.verbose);
            cmd_convert(&args, &output, source_map.as_deref())
        }
        Commands::Stats { args } => {
            init_logger(args.verbose);
            cmd_stats(&args)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_convert(args: &ConvertArgs, output: &str, source_map: Option<&str>) -> Result<(), String> {
    let start = Instant::now();
    let options = args.options()?;
    let loaded = load_filters(&args.input)?;
    let load_time = start.elapsed();

    let filter_count = loaded.filters.len();
    let convert_start = Instant::now();
    let result = convert(loaded.filters, &options);
    let convert_time = convert_start.elapsed();

    for error in &result.errors {
        warn!("{error}");
    }

    let rule_set_bytes = write_rule_set(output, &result.declarative_rules)?;
    if let Some(path) = source_map {
        write_source_map(path, &result)?;
        info!("Wrote source map to '{}'", path);
    }

    let total_time = start.elapsed();

    println!("Converted {} filters to '{}'", filter_count, output);
    println!(
        "  Rules:    {} loaded, {} skipped -> {} declarative ({} regexp)",
        loaded.total_rules,
        loaded.skipped_rules,
        result.declarative_rules.len(),
        result.regexp_rules_count()
    );
    println!("  Errors:   {}", result.errors.len());
    for limitation in &result.limitations {
        println!("  Limit:    {}", limitation);
    }
    println!("  Size:     {} bytes ({:.1} KB)", rule_set_bytes, rule_set_bytes as f64 / 1024.0);
    println!(
        "  Time:     {:.1}ms (load: {:.1}ms, convert: {:.1}ms)",
        total_time.as_secs_f64() * 1000.0,
        load_time.as_secs_f64() * 1000.0,
        convert_time.as_secs_f64() * 1000.0,
    );

    Ok(())
}

fn cmd_stats(args: &ConvertArgs) -> Result<(), String> {
    let options = args.options()?;
    let loaded = load_filters(&args.input)?;

    let mut group_counts = [0usize; RulesGroup::ALL.len()];
    for filter in &loaded.filters {
        let grouped = GroupedRules::split(filter.rules.clone());
        for (count, group) in group_counts.iter_mut().zip(RulesGroup::ALL) {
            *count += grouped.get(group).len();
        }
    }

    let filter_count = loaded.filters.len();
    let result = convert(loaded.filters, &options);

    println!("Filters:           {}", filter_count);
    println!("Source rules:      {} ({} skipped)", loaded.total_rules, loaded.skipped_rules);
    for (count, group) in group_counts.iter().zip(RulesGroup::ALL) {
        println!("  {:<16} {}", format!("{:?}:", group), count);
    }
    println!("Declarative rules: {}", result.declarative_rules.len());
    println!("  Regexp:          {}", result.regexp_rules_count());
    println!("Source map:        {}", result.source_map.len());
    println!("Errors:            {}", result.errors.len());
    for limitation in &result.limitations {
        println!("  {}", limitation);
    }

    Ok(())
}
