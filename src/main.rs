use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use internconnect::cache::ServeSource;
use internconnect::config::Config;
use internconnect::internships::{filter_internships, Catalog, Internship, InternshipService};
use internconnect::profile::{ProfileStore, Theme};

#[derive(Parser, Debug)]
#[command(name = "internconnect")]
#[command(about = "Offline-first internship catalog and recommendations")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/internconnect/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Prime the offline cache and prune stale generations
  Sync,
  /// List internships, optionally narrowed by filters
  List {
    /// Location substring to match, or "all"
    #[arg(short, long)]
    location: Option<String>,

    /// Sector to match, or "all"
    #[arg(short, long)]
    sector: Option<String>,

    /// Skill to match (repeatable); one matching skill keeps a listing
    #[arg(long = "skill")]
    skills: Vec<String>,
  },
  /// Show personalized recommendations for the saved profile
  Recommend,
  /// Manage the locally saved profile
  Profile {
    #[command(subcommand)]
    action: ProfileAction,
  },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
  /// Save the fields recommendations are computed from
  Set {
    /// Comma-separated skills, e.g. "React,SQL"
    #[arg(long)]
    skills: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    sector: Option<String>,

    #[arg(long)]
    education: Option<String>,

    /// Color theme: light or dark
    #[arg(long)]
    theme: Option<String>,

    /// Interface language code, e.g. "en" or "hi"
    #[arg(long)]
    language: Option<String>,
  },
  /// Print the saved profile
  Show,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  match args.command {
    Command::Sync => {
      let config = Config::load(args.config.as_deref())?;
      let service = InternshipService::new(&config)?;
      let (installed, removed) = service.sync().await?;
      println!(
        "Cached {} app-shell assets, removed {} stale cache generation(s).",
        installed, removed
      );
    }

    Command::List {
      location,
      sector,
      skills,
    } => {
      let config = Config::load(args.config.as_deref())?;
      let service = InternshipService::new(&config)?;
      service.activate().await?;

      let catalog = service.list().await?;
      let location = location.or(config.filters.location);
      let sector = sector.or(config.filters.sector);
      let filtered = filter_internships(
        &catalog.internships,
        location.as_deref(),
        sector.as_deref(),
        &skills,
      );
      print_listings(&filtered, &catalog);
    }

    Command::Recommend => {
      let config = Config::load(args.config.as_deref())?;
      let stored = ProfileStore::open()?
        .load()?
        .ok_or_else(|| eyre!("No profile saved. Run `internconnect profile set` first."))?;

      let service = InternshipService::new(&config)?;
      service.activate().await?;

      let catalog = service.recommendations(&stored.profile).await?;
      if catalog.internships.is_empty() {
        println!("No matching internships right now. Try broadening your profile.");
      } else {
        print_listings(&catalog.internships, &catalog);
      }
    }

    Command::Profile { action } => match action {
      ProfileAction::Set {
        skills,
        location,
        sector,
        education,
        theme,
        language,
      } => {
        let store = ProfileStore::open()?;
        let mut stored = store.load()?.unwrap_or_default();

        if let Some(skills) = skills {
          stored.profile.skills = skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        }
        if let Some(location) = location {
          stored.profile.location = location;
        }
        if let Some(sector) = sector {
          stored.profile.sector = sector;
        }
        if let Some(education) = education {
          stored.profile.education = education;
        }
        if let Some(theme) = theme {
          stored.preferences.theme = parse_theme(&theme)?;
        }
        if let Some(language) = language {
          stored.preferences.language = language;
        }

        store.save(&stored)?;
        println!("Profile saved.");
      }

      ProfileAction::Show => match ProfileStore::open()?.load()? {
        Some(stored) => {
          println!("Location:  {}", stored.profile.location);
          println!("Sector:    {}", stored.profile.sector);
          println!("Education: {}", stored.profile.education);
          println!("Skills:    {}", stored.profile.skills.join(", "));
          println!("Theme:     {}", stored.preferences.theme);
          println!("Language:  {}", stored.preferences.language);
        }
        None => println!("No profile saved yet."),
      },
    },
  }

  Ok(())
}

fn parse_theme(value: &str) -> Result<Theme> {
  match value.to_lowercase().as_str() {
    "light" => Ok(Theme::Light),
    "dark" => Ok(Theme::Dark),
    other => Err(eyre!("Unknown theme '{}'; use light or dark", other)),
  }
}

fn print_listings(listings: &[Internship], catalog: &Catalog) {
  if catalog.is_offline() {
    let kind = if catalog.source == ServeSource::Cache {
      "cached"
    } else {
      "bundled offline"
    };
    println!("You appear to be offline; showing {} data.\n", kind);
  }

  for internship in listings {
    println!("{} - {}", internship.title, internship.organization);
    println!(
      "  {} | {} | {} | {}",
      internship.location, internship.sector, internship.mode, internship.stipend
    );
    println!(
      "  {} | apply by {}",
      internship.duration, internship.application_deadline
    );
    if !internship.skills.is_empty() {
      println!("  skills: {}", internship.skills.join(", "));
    }
    println!();
  }

  println!("{} internship(s)", listings.len());
}
