use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use treatline_core::constants::LIKELY_TRIAL_CATEGORIES_ENV;
use treatline_core::{
    likely_trial_categories_from_env_value, CategoryCriterion, Classification, Drug, Treatment,
    TreatmentCategory, TreatmentHistoryEngine, TreatmentHistoryEntry, TreatmentMatcher,
    TreatmentType,
};
use treatline_records::TreatmentHistoryYaml;

#[derive(Parser)]
#[command(name = "treatline")]
#[command(about = "Treatment history reconciliation for oncology eligibility rules")]
struct Cli {
    /// Comma-separated categories in which trial entries may count as possible matches
    /// (overrides TREATLINE_LIKELY_TRIAL_CATEGORIES)
    #[arg(long, global = true)]
    likely_trial_categories: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bound the number of systemic treatment lines
    Lines {
        /// Treatment history YAML file
        file: PathBuf,
    },
    /// Summarise the history for a treatment category
    Summary {
        /// Treatment history YAML file
        file: PathBuf,
        /// Category, e.g. chemotherapy
        #[arg(long)]
        category: TreatmentCategory,
        /// Required types, e.g. drug:taxane (repeatable)
        #[arg(long = "type")]
        types: Vec<TreatmentType>,
    },
    /// Print the matching portion of every entry as JSON
    Portion {
        /// Treatment history YAML file
        file: PathBuf,
        #[command(flatten)]
        matcher: MatcherArgs,
    },
    /// Evaluate progression on specific drugs
    Drugs {
        /// Treatment history YAML file
        file: PathBuf,
        /// Drug name (repeatable)
        #[arg(long = "drug", required = true)]
        drugs: Vec<String>,
        /// Only consider drugs of this category
        #[arg(long)]
        category: Option<TreatmentCategory>,
    },
    /// Check whether matching treatments were given since a date
    Since {
        /// Treatment history YAML file
        file: PathBuf,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        matcher: MatcherArgs,
    },
    /// List trial entries that could have delivered one of the categories
    Trial {
        /// Treatment history YAML file
        file: PathBuf,
        /// Category (repeatable)
        #[arg(long = "category", required = true)]
        categories: Vec<TreatmentCategory>,
    },
}

#[derive(Args)]
struct MatcherArgs {
    /// Treatment name (repeatable, takes precedence over --category)
    #[arg(long = "treatment")]
    treatments: Vec<String>,
    /// Category, e.g. immunotherapy
    #[arg(long)]
    category: Option<TreatmentCategory>,
    /// Required types, e.g. drug:anti_pd1 (repeatable)
    #[arg(long = "type")]
    types: Vec<TreatmentType>,
}

impl MatcherArgs {
    fn to_matcher(&self) -> anyhow::Result<TreatmentMatcher> {
        let treatments = (!self.treatments.is_empty()).then(|| self.treatments.clone());
        let types = (!self.types.is_empty()).then(|| self.types.iter().copied().collect());
        TreatmentMatcher::new(treatments, self.category, types)
            .context("either --treatment or --category is required")
    }
}

/// Main entry point for the treatline CLI
///
/// # Environment Variables
/// - `TREATLINE_LIKELY_TRIAL_CATEGORIES`: comma-separated likely trial categories
/// - `RUST_LOG`: log filter (default directive: `treatline=info`)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("treatline=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let categories = cli
        .likely_trial_categories
        .clone()
        .or_else(|| std::env::var(LIKELY_TRIAL_CATEGORIES_ENV).ok());
    let cfg = likely_trial_categories_from_env_value(categories)
        .context("invalid likely trial categories")?;
    let engine = TreatmentHistoryEngine::new(Arc::new(cfg));

    let Some(command) = cli.command else {
        println!("Use 'treatline --help' for commands");
        return Ok(());
    };

    let output = run(&engine, command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load(file: &Path) -> anyhow::Result<Vec<TreatmentHistoryEntry>> {
    let history = TreatmentHistoryYaml::load_file(file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    tracing::info!("++ Loaded {} entries from {}", history.len(), file.display());
    Ok(history)
}

fn run(engine: &TreatmentHistoryEngine, command: Commands) -> anyhow::Result<serde_json::Value> {
    let output = match command {
        Commands::Lines { file } => {
            let history = load(&file)?;
            let bounds = engine.systemic_line_bounds(&history);
            json!({
                "min": bounds.min,
                "max": bounds.max,
                "first": engine.first_systemic_treatment(&history).map(TreatmentHistoryEntry::treatment_display),
                "last": engine.last_systemic_treatment(&history).map(TreatmentHistoryEntry::treatment_display),
            })
        }
        Commands::Summary {
            file,
            category,
            types,
        } => {
            let history = load(&file)?;
            let mut criterion = CategoryCriterion::new(category);
            if !types.is_empty() {
                let types: BTreeSet<TreatmentType> = types.into_iter().collect();
                criterion = criterion.with_classifier(move |t| classify_by_type(t, &types));
            }
            serde_json::to_value(engine.summarize_category(&history, &criterion))?
        }
        Commands::Portion { file, matcher } => {
            let matcher = matcher.to_matcher()?;
            let history = load(&file)?;
            serde_json::to_value(engine.matching_portions(&history, &matcher))?
        }
        Commands::Drugs {
            file,
            drugs,
            category,
        } => {
            let history = load(&file)?;
            let targets = target_drugs(&history, &drugs, category);
            if targets.is_empty() {
                tracing::warn!(?drugs, "none of the drugs appear in the history");
            }
            serde_json::to_value(engine.evaluate_drug_progression(&history, &targets))?
        }
        Commands::Since {
            file,
            date,
            matcher,
        } => {
            let matcher = matcher.to_matcher()?;
            let history = load(&file)?;
            json!({ "outcome": engine.matching_portions_since(&history, &matcher, date) })
        }
        Commands::Trial { file, categories } => {
            let history = load(&file)?;
            let categories: BTreeSet<TreatmentCategory> = categories.into_iter().collect();
            let names: Vec<String> = engine
                .possible_trial_entries(&history, &categories)
                .into_iter()
                .map(|entry| {
                    entry
                        .trial_acronym()
                        .map_or_else(|| entry.treatment_display(), str::to_owned)
                })
                .collect();
            json!({ "possible_trial_entries": names })
        }
    };
    Ok(output)
}

/// Drugs in `history` named like one of `names`, ignoring case.
fn target_drugs(
    history: &[TreatmentHistoryEntry],
    names: &[String],
    category: Option<TreatmentCategory>,
) -> BTreeSet<Drug> {
    let names: BTreeSet<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
    history
        .iter()
        .flat_map(TreatmentHistoryEntry::all_treatments)
        .flat_map(Treatment::drugs)
        .filter(|drug| names.contains(&drug.name.to_lowercase()))
        .filter(|drug| category.map_or(true, |c| drug.category == c))
        .cloned()
        .collect()
}

/// Treatments without a declared type are ambiguous.
fn classify_by_type(treatment: &Treatment, types: &BTreeSet<TreatmentType>) -> Classification {
    if !treatment.types().is_disjoint(types) {
        Classification::Match
    } else if treatment.has_declared_type() {
        Classification::NoMatch
    } else {
        Classification::Ambiguous
    }
}
