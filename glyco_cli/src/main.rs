use clap::{Args, Parser, Subcommand, ValueEnum};
use glyco_core::units::{
    bmi_from_imperial, cm_to_feet_inches, feet_inches_to_cm, kg_to_lbs, lbs_to_kg,
};
use glyco_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "glyco")]
#[command(about = "Diabetes risk check from self-reported health metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the risk score (default)
    Assess(AssessArgs),

    /// Calculate BMI from height and weight
    Bmi(BmiArgs),

    /// Show or edit the saved physical profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Change the signed-in user's display name
    Rename {
        #[arg(long)]
        name: String,
    },

    /// Request password reset instructions
    ResetPassword {
        #[arg(long)]
        email: String,
    },
}

#[derive(Args, Default)]
struct AssessArgs {
    #[arg(long)]
    age: Option<u32>,

    #[arg(long, value_enum)]
    hypertension: Option<YesNo>,

    #[arg(long, value_enum)]
    heart_disease: Option<YesNo>,

    #[arg(long)]
    bmi: Option<f64>,

    /// Blood glucose in mg/dL; also estimates HbA1c
    #[arg(long)]
    glucose: Option<f64>,

    /// HbA1c in percent; overrides the estimate from glucose
    #[arg(long)]
    hba1c: Option<f64>,

    /// Show the result without saving the profile
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct BmiArgs {
    #[arg(long, conflicts_with_all = ["feet", "inches", "lbs"])]
    height_cm: Option<f64>,

    #[arg(long, conflicts_with = "lbs")]
    weight_kg: Option<f64>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(..=9))]
    feet: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(..=11))]
    inches: Option<u32>,

    #[arg(long)]
    lbs: Option<f64>,

    /// Store height and weight in the profile
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the saved profile (default)
    Show,

    /// Update profile fields
    Set {
        #[arg(long)]
        height_cm: Option<f64>,

        #[arg(long)]
        weight_kg: Option<f64>,

        /// Blood glucose in mg/dL
        #[arg(long)]
        glucose: Option<f64>,

        /// Target BMI; adjusts weight at the current height
        #[arg(long, conflicts_with = "weight_kg")]
        bmi: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum YesNo {
    Yes,
    No,
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        matches!(value, YesNo::Yes)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    glyco_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Assess(args)) => cmd_assess(&data_dir, &config, args),
        Some(Commands::Bmi(args)) => cmd_bmi(&data_dir, &config, args),
        Some(Commands::Profile { action }) => cmd_profile(&data_dir, &config, action),
        Some(Commands::Login { email, password }) => {
            cmd_login(&data_dir, &config, &email, &password).await
        }
        Some(Commands::Signup {
            email,
            password,
            name,
        }) => cmd_signup(&data_dir, &config, &email, &password, &name).await,
        Some(Commands::Logout) => cmd_logout(&data_dir, &config),
        Some(Commands::Whoami) => cmd_whoami(&data_dir, &config),
        Some(Commands::Rename { name }) => cmd_rename(&data_dir, &config, name).await,
        Some(Commands::ResetPassword { email }) => {
            cmd_reset_password(&data_dir, &config, &email).await
        }
        None => {
            // Default to "assess" with saved values
            cmd_assess(&data_dir, &config, AssessArgs::default())
        }
    }
}

fn cmd_assess(data_dir: &Path, config: &Config, args: AssessArgs) -> Result<()> {
    let mut stores = Stores::open(data_dir, config)?;

    if let Some(age) = args.age {
        stores.risk.set_age(age);
    }
    if let Some(answer) = args.hypertension {
        stores
            .risk
            .set_binary_value(BinaryField::Hypertension, answer.into());
    }
    if let Some(answer) = args.heart_disease {
        stores
            .risk
            .set_binary_value(BinaryField::HeartDisease, answer.into());
    }
    if let Some(bmi) = args.bmi {
        stores.risk.set_bmi(bmi)?;
    }
    if let Some(glucose) = args.glucose {
        stores.set_blood_level(BloodLevel::Glucose, glucose)?;
    }
    if let Some(hba1c) = args.hba1c {
        stores.set_blood_level(BloodLevel::Hba1c, hba1c)?;
    }

    stores.risk.calculate_risk();
    display_assessment(stores.risk.assessment(), &stores.risk.contributions());

    if args.glucose.is_some() {
        if args.dry_run {
            println!("\n[Dry run - profile not saved]");
        } else {
            stores.save_profile()?;
        }
    }

    Ok(())
}

fn cmd_bmi(data_dir: &Path, config: &Config, args: BmiArgs) -> Result<()> {
    let (bmi, height_cm, weight_kg) = match (args.height_cm, args.weight_kg, args.feet, args.lbs) {
        (Some(height_cm), Some(weight_kg), _, _) => {
            let bmi = bmi_from_height_weight(height_cm, weight_kg)?;
            (bmi, height_cm, weight_kg)
        }
        (None, None, Some(feet), Some(lbs)) => {
            let height = FeetInches::new(feet, args.inches.unwrap_or(0));
            let bmi = bmi_from_imperial(height, lbs)?;
            (bmi, feet_inches_to_cm(height), lbs_to_kg(lbs))
        }
        _ => {
            return Err(Error::validation(
                "provide --height-cm and --weight-kg, or --feet [--inches] and --lbs",
            ))
        }
    };

    println!("BMI: {:.1} ({})", bmi, classify_bmi(bmi));

    if args.save {
        let mut stores = Stores::open(data_dir, config)?;
        stores.update_profile(
            &ProfilePatch::new()
                .height_cm(height_cm)
                .weight_kg(weight_kg),
        )?;
        stores.save_profile()?;
        println!(
            "✓ Profile updated: {}, {}",
            format_height(height_cm, config.display.units),
            format_weight(weight_kg, config.display.units)
        );
    }

    Ok(())
}

fn cmd_profile(data_dir: &Path, config: &Config, action: Option<ProfileAction>) -> Result<()> {
    let mut stores = Stores::open(data_dir, config)?;

    if let Some(ProfileAction::Set {
        height_cm,
        weight_kg,
        glucose,
        bmi,
    }) = action
    {
        let mut patch = ProfilePatch::new();
        if let Some(height_cm) = height_cm {
            patch = patch.height_cm(height_cm);
        }
        if let Some(weight_kg) = weight_kg {
            patch = patch.weight_kg(weight_kg);
        }
        if let Some(glucose) = glucose {
            patch = patch.glucose_level(glucose);
        }
        stores.update_profile(&patch)?;
        if let Some(bmi) = bmi {
            stores.set_bmi_target(bmi)?;
        }
        stores.save_profile()?;
        println!("✓ Profile saved");
    }

    display_profile(&stores.profile, config.display.units);
    Ok(())
}

async fn cmd_login(data_dir: &Path, config: &Config, email: &str, password: &str) -> Result<()> {
    let mut auth = AuthStore::open(data_dir, config.auth.clone())?;

    match auth.login(email, password).await {
        Ok(user) => {
            println!("✓ Logged in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Err(e @ Error::InvalidCredentials) => {
            eprintln!("✗ Invalid email or password");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

async fn cmd_signup(
    data_dir: &Path,
    config: &Config,
    email: &str,
    password: &str,
    name: &str,
) -> Result<()> {
    let mut auth = AuthStore::open(data_dir, config.auth.clone())?;
    let user = auth.signup(email, password, name).await?;
    println!("✓ Welcome, {}! Signed in as {}", user.name, user.email);
    Ok(())
}

fn cmd_logout(data_dir: &Path, config: &Config) -> Result<()> {
    let mut auth = AuthStore::open(data_dir, config.auth.clone())?;
    auth.logout()?;
    println!("✓ Logged out");
    Ok(())
}

fn cmd_whoami(data_dir: &Path, config: &Config) -> Result<()> {
    let auth = AuthStore::open(data_dir, config.auth.clone())?;
    match auth.user() {
        Some(user) => println!("Signed in as {} <{}> (id {})", user.name, user.email, user.id),
        None => println!("Not signed in"),
    }
    Ok(())
}

async fn cmd_rename(data_dir: &Path, config: &Config, name: String) -> Result<()> {
    let mut auth = AuthStore::open(data_dir, config.auth.clone())?;
    let patch = UserPatch {
        name: Some(name),
        email: None,
    };
    match auth.update_profile(patch).await? {
        Some(user) => println!("✓ Name updated to {}", user.name),
        None => println!("Not signed in - nothing to update"),
    }
    Ok(())
}

async fn cmd_reset_password(data_dir: &Path, config: &Config, email: &str) -> Result<()> {
    let auth = AuthStore::open(data_dir, config.auth.clone())?;
    auth.request_password_reset(email).await?;
    println!("✓ Password reset instructions sent to {}", email);
    Ok(())
}

fn display_assessment(assessment: &RiskAssessment, factors: &[RiskFactor]) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  DIABETES RISK CHECK");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Risk score: {:.2} ({:.0}%)",
        assessment.risk,
        assessment.risk * 100.0
    );
    println!();
    println!("  Age:           {}", assessment.age);
    println!("  Hypertension:  {}", format_answer(assessment.hypertension));
    println!("  Heart disease: {}", format_answer(assessment.heart_disease));
    println!(
        "  BMI:           {:.1} ({})",
        assessment.bmi,
        classify_bmi(assessment.bmi)
    );
    println!("  HbA1c:         {:.1}%", assessment.hba1c);
    println!("  Glucose:       {} mg/dL", assessment.glucose);
    println!();

    if factors.is_empty() {
        println!("  No risk factors found");
    } else {
        println!("  Contributing factors:");
        for factor in factors {
            println!("  → {} (+{:.2})", factor, factor.weight());
        }
    }

    println!();
    println!("  ℹ Heuristic screening score, not a diagnosis.");
}

fn display_profile(profile: &ProfileStore, units: UnitSystem) {
    println!("Height:  {}", format_height(profile.height_cm(), units));
    println!("Weight:  {}", format_weight(profile.weight_kg(), units));
    println!("Glucose: {} mg/dL", profile.glucose_level());
    match profile.bmi() {
        Ok(bmi) => println!("BMI:     {:.1} ({})", bmi, classify_bmi(bmi)),
        Err(e) => println!("BMI:     unavailable ({})", e),
    }
}

fn format_answer(answer: Option<bool>) -> &'static str {
    match answer {
        Some(true) => "yes",
        Some(false) => "no",
        None => "not answered",
    }
}

fn format_height(height_cm: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{} cm", height_cm),
        UnitSystem::Imperial => cm_to_feet_inches(height_cm).to_string(),
    }
}

fn format_weight(weight_kg: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{} kg", weight_kg),
        UnitSystem::Imperial => format!("{} lbs", kg_to_lbs(weight_kg)),
    }
}
