//! Command-line interface for nutriscan
//!
//! Prints the JSON result on stdout and a short human summary on stderr.
//! Logging goes to stderr as well; set `RUST_LOG` to change the level.

use clap::{Parser, Subcommand};
use nutriscan::image_loader::load_image;
use nutriscan::{AnalysisOptions, AnalyzerConfig, FoodAnalyzer, NutritionProfile};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nutriscan",
    version,
    about = "Estimate nutrition and suggest recipes from a food photo"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a food photo
    Analyze {
        /// Photo to analyze (JPEG, PNG, GIF, WebP, TIFF, BMP)
        image: PathBuf,

        /// Free-text notes, e.g. "vegan" or "keto"
        #[arg(long)]
        notes: Option<String>,

        /// Serving size in grams
        #[arg(long)]
        serving_grams: Option<f64>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Verify a nutrition profile JSON file against reference calories
    Verify {
        /// Profile JSON, as produced by `analyze`
        profile: PathBuf,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write the default configuration to a file
    GenerateConfig {
        /// Output path
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            image,
            notes,
            serving_grams,
            config,
        } => run_analyze(&image, notes, serving_grams, config.as_deref()),
        Command::Verify { profile, config } => run_verify(&profile, config.as_deref()),
        Command::GenerateConfig { output } => run_generate_config(&output),
    }
}

fn load_config(path: Option<&Path>) -> AnalyzerConfig {
    match path {
        Some(path) => AnalyzerConfig::from_json_file(path)
            .unwrap_or_else(|e| fail("Invalid configuration", &e)),
        None => AnalyzerConfig::default(),
    }
}

fn build_analyzer(config: AnalyzerConfig) -> FoodAnalyzer {
    FoodAnalyzer::new(config).unwrap_or_else(|e| fail("Cannot start analyzer", &e))
}

fn run_analyze(
    image: &Path,
    notes: Option<String>,
    serving_grams: Option<f64>,
    config: Option<&Path>,
) {
    if !image.exists() {
        eprintln!("Error: File '{}' does not exist", image.display());
        process::exit(1);
    }

    let analyzer = build_analyzer(load_config(config));
    let photo = load_image(image).unwrap_or_else(|e| fail("Analysis failed", &e));
    let options = AnalysisOptions {
        notes,
        serving_grams,
    };

    match analyzer.analyze(&photo, &options) {
        Ok(recommendation) => {
            let recognition = &recommendation.recognition;
            let profile = &recommendation.profile;
            eprintln!(
                "Food: {} (confidence {:.2}, consensus {:?})",
                recognition.label, recognition.confidence, recognition.consensus
            );
            eprintln!(
                "Nutrition: {} kcal per {} g | protein {} g, carbs {} g, fat {} g",
                profile.calories,
                profile.serving_grams,
                profile.macros.protein_g,
                profile.macros.carbs_g,
                profile.macros.fat_g
            );
            for card in &recommendation.recipes {
                eprintln!("Recipe: {} ({} min)", card.title, card.time_minutes);
            }
            print_json(&recommendation);
        }
        Err(e) => fail("Analysis failed", &e),
    }
}

fn run_verify(profile_path: &Path, config: Option<&Path>) {
    let content = std::fs::read_to_string(profile_path).unwrap_or_else(|e| {
        eprintln!("Error reading '{}': {}", profile_path.display(), e);
        process::exit(1);
    });
    let profile: NutritionProfile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error: '{}' is not a nutrition profile: {}", profile_path.display(), e);
        process::exit(1);
    });

    let analyzer = build_analyzer(load_config(config));
    let report = analyzer.verify(&profile);
    for item in &report.items {
        eprintln!("{:?}: {} ({:.2})", item.status, item.claim, item.confidence);
    }
    print_json(&report);
}

fn run_generate_config(output: &Path) {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let config = AnalyzerConfig::default();
    match config.to_json_file(output) {
        Ok(()) => {
            eprintln!("Configuration saved to {}", output.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!(
                "  Weights: google_vision {:.2}, color_histogram {:.2}, hugging_face {:.2}, feature_matching {:.2}",
                config.ensemble.weights.google_vision,
                config.ensemble.weights.color_histogram,
                config.ensemble.weights.hugging_face,
                config.ensemble.weights.feature_matching
            );
            eprintln!(
                "  Low confidence below {:.2}, cap {:.2}",
                config.ensemble.low_confidence, config.ensemble.confidence_cap
            );
            eprintln!(
                "  Calorie tolerance {:.0}%",
                config.verification.calorie_tolerance * 100.0
            );
        }
        Err(e) => fail("Error saving config", &e),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing result: {}", e);
            process::exit(1);
        }
    }
}

fn fail(context: &str, error: &nutriscan::AnalysisError) -> ! {
    eprintln!("{}: {}", context, error);
    if error.is_client_error() {
        eprintln!("Suggestion: {}", error.user_message());
    }
    process::exit(1);
}
