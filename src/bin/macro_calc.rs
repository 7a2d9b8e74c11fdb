//! Command-line macro calculator
//!
//! Computes targets from flags without touching the database. Estimator
//! defaults come from the same environment variables the servers read.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use macro_planner::config::AppConfig;
use macro_planner::estimator::{GoalPlans, MacroPlan};
use macro_planner::tools::macros::{self, EstimatorOverrides, MacroRequest};

#[derive(Debug, Parser)]
#[command(name = "macro-calc")]
#[command(about = "Calculate daily calorie and macro targets", version)]
struct Cli {
    /// Body weight in pounds
    #[arg(long)]
    weight: f64,

    /// Height in inches
    #[arg(long)]
    height: Option<f64>,

    /// Age in years
    #[arg(long)]
    age: Option<u32>,

    /// male or female
    #[arg(long, alias = "gender")]
    sex: Option<String>,

    /// Body fat percentage
    #[arg(long)]
    body_fat: Option<f64>,

    /// sedentary, light, moderate, active or very_active
    #[arg(long, default_value = "sedentary")]
    activity: String,

    /// Print a single detailed plan for this goal (cut, maintain, bulk)
    #[arg(long)]
    goal: Option<String>,

    /// mifflin_st_jeor, mifflin_st_jeor_metric or katch_mcardle
    #[arg(long)]
    model: Option<String>,

    /// tdee or rmr
    #[arg(long)]
    basis: Option<String>,

    /// percentage, bodyweight_protein or lean_mass
    #[arg(long)]
    policy: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn to_request(&self) -> MacroRequest {
        MacroRequest {
            weight: self.weight,
            height: self.height,
            age: self.age,
            sex: self.sex.clone(),
            body_fat_pct: self.body_fat,
            activity_level: self.activity.clone(),
            goal: self.goal.clone(),
            overrides: EstimatorOverrides {
                model: self.model.clone(),
                basis: self.basis.clone(),
                policy: self.policy.clone(),
            },
        }
    }
}

fn print_row(label: &str, plan: &MacroPlan) {
    println!(
        "{:<12} {:>8} {:>11} {:>9} {:>7}",
        label, plan.calories, plan.protein_g, plan.carbs_g, plan.fat_g
    );
}

fn print_header() {
    println!(
        "{:<12} {:>8} {:>11} {:>9} {:>7}",
        "Goal", "Calories", "Protein (g)", "Carbs (g)", "Fat (g)"
    );
}

fn print_table(plans: &GoalPlans) {
    print_header();
    print_row("cutting", &plans.cutting);
    print_row("maintaining", &plans.maintaining);
    print_row("bulking", &plans.bulking);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let request = cli.to_request();

    if cli.goal.is_some() {
        let estimate = macros::calculate_macro_plan(&config.estimator, &request)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        } else {
            println!(
                "Model: {}  Basis: {}  Policy: {}",
                estimate.model.as_str(),
                estimate.basis.as_str(),
                estimate.policy.as_str()
            );
            println!(
                "RMR: {:.1} kcal  TDEE: {:.1} kcal  Activity: {}",
                estimate.rmr,
                estimate.tdee,
                estimate.activity.display_name()
            );
            println!();
            print_header();
            print_row(estimate.goal.as_str(), &estimate.plan);
        }
    } else {
        let plans = macros::calculate_macros(&config.estimator, &request)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plans)?);
        } else {
            print_table(&plans);
        }
    }

    Ok(())
}
