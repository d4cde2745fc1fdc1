mod check;
mod personas;
mod search;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spookychef_core::DataSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "spookychef")]
#[command(about = "SpookyChef CLI", long_about = None)]
struct Cli {
    /// Directory with recipes_seed.json and friends (default: embedded data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the catalog against a list of ingredients
    Search {
        /// Ingredients on hand, e.g. "spaghetti" "tomat"
        #[arg(required = true)]
        ingredients: Vec<String>,
        /// Diet categories to honor (repeatable)
        #[arg(long)]
        diet: Vec<String>,
        /// Allergen categories to avoid (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
    },
    /// Run the safety filter over a list of ingredients
    Check {
        #[arg(required = true)]
        ingredients: Vec<String>,
        #[arg(long)]
        diet: Vec<String>,
        #[arg(long = "allergy")]
        allergies: Vec<String>,
    },
    /// Print the canonical token for each ingredient
    Normalize {
        #[arg(required = true)]
        ingredients: Vec<String>,
    },
    /// List the persona pool
    Personas,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data = load_data(cli.data_dir.as_deref())?;

    let output = match cli.command {
        Commands::Search {
            ingredients,
            diet,
            allergies,
        } => search::run(&data, &ingredients, diet, allergies, cli.json)?,
        Commands::Check {
            ingredients,
            diet,
            allergies,
        } => {
            let report = check::run(&data, &ingredients, &diet, &allergies);
            let rendered = check::render(&report, cli.json)?;
            if !report.is_clean() {
                println!("{}", rendered);
                std::process::exit(1);
            }
            rendered
        }
        Commands::Normalize { ingredients } => normalize(&data, &ingredients, cli.json)?,
        Commands::Personas => personas::run(&data, cli.json)?,
    };

    println!("{}", output);
    Ok(())
}

fn load_data(dir: Option<&Path>) -> Result<DataSet> {
    match dir {
        Some(dir) => DataSet::load_dir(dir)
            .with_context(|| format!("Failed to load data from {}", dir.display())),
        None => Ok(DataSet::embedded()),
    }
}

fn normalize(data: &DataSet, ingredients: &[String], json: bool) -> Result<String> {
    let canonical = data.aliases.normalize_all(ingredients);
    if json {
        let pairs: Vec<_> = ingredients
            .iter()
            .zip(&canonical)
            .map(|(raw, token)| serde_json::json!({ "raw": raw, "canonical": token }))
            .collect();
        return Ok(serde_json::to_string_pretty(&pairs)?);
    }

    Ok(ingredients
        .iter()
        .zip(&canonical)
        .map(|(raw, token)| format!("{} -> {}", raw, token))
        .collect::<Vec<_>>()
        .join("\n"))
}
