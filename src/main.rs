use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error, warn};

use gamp::model::MAX_RATING;
use gamp::{GampConfig, Kitchen, MealPlan, Worksheet};

#[derive(Parser)]
#[command(name = "gamp")]
#[command(about = "Plan meals, track stock and build grocery lists", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./gamp.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every recipe against the ingredient catalog and unit table
    ValidateRecipes,
    /// Print the name and rating of every recipe
    ListRecipes,
    /// Sum a meal plan's ingredients into an inventory worksheet
    Worksheet {
        /// Meal plan YAML (tag: recipe name)
        meal_plan: PathBuf,
        /// Where to write the CSV worksheet (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Turn a filled-in worksheet into the list of what to buy
    GroceryList {
        /// Worksheet CSV with the `have` column filled in
        worksheet: PathBuf,
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
        /// Where to write the list (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => GampConfig::load_from(path)?,
        None => GampConfig::load()?,
    };
    debug!("{:#?}", config);

    let kitchen = Kitchen::builder().config(config).build()?;

    match cli.command {
        Commands::ValidateRecipes => validate_recipes(&kitchen),
        Commands::ListRecipes => {
            kitchen.recipes().ensure_not_empty()?;
            for recipe in kitchen.recipes().recipes() {
                println!("{} ({}/{})", recipe.name, recipe.rating, MAX_RATING);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Worksheet { meal_plan, output } => {
            let plan = MealPlan::load(&meal_plan)?;
            let result = kitchen.worksheet(&plan)?;
            for warning in &result.warnings {
                warn!("{}", warning);
                eprintln!("warning: {}", warning);
            }
            match output {
                Some(path) => result.worksheet.save(path)?,
                None => print!("{}", result.worksheet.to_csv()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::GroceryList {
            worksheet,
            json,
            output,
        } => {
            let worksheet = Worksheet::load(&worksheet)?;
            let list = kitchen.grocery_list(&worksheet)?;
            let text = if json {
                list.to_json()? + "\n"
            } else {
                list.to_yaml()?
            };
            write_output(output.as_deref(), &text)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn validate_recipes(kitchen: &Kitchen) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut all_valid = kitchen.load_issues().is_empty();
    for issue in kitchen.load_issues() {
        println!("{}", issue);
    }

    for report in kitchen.validate_recipes()? {
        match &report.path {
            Some(path) => println!("{}: {}", report.recipe, path.display()),
            None => println!("{}", report.recipe),
        }
        if report.is_valid() {
            println!("\tIs Valid");
        }
        for issue in &report.issues {
            println!("\t{}", issue);
        }
        all_valid &= report.is_valid();
    }

    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn write_output(path: Option<&Path>, text: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, text),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
