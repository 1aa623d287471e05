use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dish_go::config::{self, AppConfig};
use dish_go::form::{IngredientList, build_request};
use dish_go::generator::{HttpRecipeApi, RecipeGenerator};
use dish_go::imaging::{
    ImageError, NormalizeParams, RustBackend, SourceImage, normalize, normalize_file,
};
use dish_go::logging::{DEFAULT_LOG_LEVEL, init_logging};
use dish_go::output::{self, PrepareEntry};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dish-go")]
#[command(about = "Suggest recipes from a photo of your ingredients")]
#[command(long_about = "\
Suggest recipes from a photo of your ingredients

Photos are shrunk to fit 1024x1024, flattened onto white and sent as JPEG to
the recipe service together with any ingredients you type.

Service location (first available wins):
  DISH_GO_API_URL environment variable
  [api] base_url in the config file
  http://localhost:3000

Run 'dish-go gen-config' to generate a documented dish-go.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = defaults)
    #[arg(long, default_value = "dish-go.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize photos into upload payloads and report their sizes
    Prepare {
        /// Photos to normalize
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write each base64 payload to stdout instead of the summary
        #[arg(long)]
        print: bool,
    },
    /// Ask the service for recipes
    Generate {
        /// Free-text note sent with the request
        #[arg(long)]
        text: Option<String>,
        /// Ingredient to include (repeatable)
        #[arg(long = "ingredient", value_name = "INGREDIENT")]
        ingredients: Vec<String>,
        /// Photo of the ingredients
        #[arg(long)]
        image: Option<PathBuf>,
        /// Number of recipes (1-5)
        #[arg(long)]
        count: Option<u8>,
        /// Use every detected ingredient
        #[arg(long)]
        all: bool,
    },
    /// Print a stock dish-go.toml with all options documented
    GenConfig,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(DEFAULT_LOG_LEVEL)?;

    match cli.command {
        Command::Prepare { files, print } => {
            let app_config = load_config(&cli.config)?;
            Ok(prepare(&files, &app_config.normalize_params(), print))
        }
        Command::Generate {
            text,
            ingredients,
            image,
            count,
            all,
        } => {
            let app_config = load_config(&cli.config)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(generate(
                &app_config,
                text,
                &ingredients,
                image.as_deref(),
                count,
                all,
            ))
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    config::load_config_from_env(path).with_context(|| format!("loading {}", path.display()))
}

fn prepare(files: &[PathBuf], params: &NormalizeParams, print: bool) -> ExitCode {
    let backend = RustBackend::new();
    let results: Vec<(String, Result<_, ImageError>)> = files
        .par_iter()
        .map(|path| {
            let name = path.display().to_string();
            let outcome = SourceImage::read(path)
                .map_err(ImageError::from)
                .and_then(|source| normalize(&backend, &source, params));
            if let Err(e) = &outcome {
                tracing::error!(file = %name, error = %e, "normalize failed");
            }
            (name, outcome)
        })
        .collect();

    let failed = results.iter().any(|(_, outcome)| outcome.is_err());
    if print {
        for (_, outcome) in &results {
            if let Ok(image) = outcome {
                println!("{}", image.base64);
            }
        }
    } else {
        let entries: Vec<PrepareEntry<'_>> = results
            .iter()
            .map(|(name, outcome)| PrepareEntry { name, outcome })
            .collect();
        output::print_prepare_output(&entries);
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

async fn generate(
    app_config: &AppConfig,
    note: Option<String>,
    ingredients: &[String],
    image: Option<&Path>,
    count: Option<u8>,
    all: bool,
) -> anyhow::Result<ExitCode> {
    let mut chips = IngredientList::new();
    for ingredient in ingredients {
        chips.add(ingredient);
    }
    let text = chips.compose_text(note.as_deref().unwrap_or_default());

    let payload = match image {
        Some(path) => match normalize_file(path, app_config.normalize_params()).await {
            Ok(normalized) => Some(normalized.base64),
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "normalize failed");
                eprintln!("Error: {}", e.user_message());
                return Ok(ExitCode::FAILURE);
            }
        },
        None => None,
    };

    let request = match build_request(
        text,
        payload.as_deref(),
        count.unwrap_or(app_config.request.recipe_count),
        all || app_config.request.use_all_ingredients,
    ) {
        Ok(request) => request,
        Err(errors) => {
            let details: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect();
            bail!("invalid request: {}", details.join("; "));
        }
    };

    let api = HttpRecipeApi::new(&app_config.api.base_url, app_config.api.timeout())?;
    tracing::info!(endpoint = api.endpoint(), "requesting recipes");
    let generator = RecipeGenerator::new(api);
    generator.generate(&request).await;

    let state = generator.state();
    output::print_generate_output(&state);
    Ok(if state.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
