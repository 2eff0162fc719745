use clap::{Parser, Subcommand};
use medimap_core::hospital::{import_path, level_description, template_csv, HospitalDirectory};
use medimap_core::triage::{manual_level, severity_label};
use medimap_core::{RecommendQuery, ScenarioForest, SearchQuery, TriageEngine, TriageStep};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medimap")]
#[command(about = "MediMap triage and hospital search CLI")]
struct Cli {
    /// Scenario definitions to use instead of the built-in set
    #[arg(long, global = true, env = "MEDIMAP_SCENARIO_FILE")]
    scenarios: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List triage scenarios
    Scenarios,
    /// Walk a scenario with the given answers
    Triage {
        /// Scenario id, e.g. "Chest Pain"
        scenario: String,
        /// Answers in order, one per question
        answers: Vec<String>,
    },
    /// Assign a severity level directly
    Manual {
        /// Level 1 (non-urgent) to 4 (critical)
        level: i64,
    },
    /// Find the nearest hospitals in a data file
    Search {
        /// CSV or JSON hospital data
        #[arg(long)]
        data: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Allowed hospital level; repeat for several (default: all)
        #[arg(long = "level")]
        levels: Vec<i64>,
        /// Number of results
        #[arg(long = "top", default_value_t = medimap_core::constants::DEFAULT_TOP_N)]
        top_n: usize,
        /// Search radius in kilometres
        #[arg(long)]
        max_distance: Option<f64>,
    },
    /// Rank hospitals for a caller at a given severity
    Recommend {
        /// CSV or JSON hospital data
        #[arg(long)]
        data: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Triage level 1 (non-urgent) to 4 (critical)
        #[arg(long)]
        severity: i64,
        /// Reported symptom, e.g. "chest pain"; repeat for several
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
        /// Number of results
        #[arg(long = "top", default_value_t = medimap_core::constants::DEFAULT_TOP_N)]
        top_n: usize,
        /// Search radius in kilometres
        #[arg(long, default_value_t = medimap_core::constants::DEFAULT_RECOMMEND_RADIUS_KM)]
        max_distance: f64,
    },
    /// Write a sample hospital data file
    Template {
        /// Output path (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check a hospital data file and list rejected rows
    Validate {
        file: PathBuf,
    },
    /// Summarise a hospital data file
    Stats {
        #[arg(long)]
        data: PathBuf,
    },
}

fn load_engine(path: Option<PathBuf>) -> Result<TriageEngine, Box<dyn std::error::Error>> {
    let forest = match path {
        Some(path) => ScenarioForest::from_path(&path)?,
        None => ScenarioForest::builtin()?,
    };
    Ok(TriageEngine::new(forest))
}

fn load_directory(path: &std::path::Path) -> Result<HospitalDirectory, Box<dyn std::error::Error>> {
    let report = import_path(path);
    for problem in report.error_messages() {
        eprintln!("warning: {}", problem);
    }
    Ok(HospitalDirectory::with_records(report.into_records()?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scenarios) => {
            let engine = load_engine(cli.scenarios)?;
            for scenario in engine.forest().iter() {
                match scenario.description() {
                    Some(description) => println!("{}: {}", scenario.id(), description),
                    None => println!("{}", scenario.id()),
                }
            }
        }
        Some(Commands::Triage { scenario, answers }) => {
            let engine = load_engine(cli.scenarios)?;
            let step = engine.step(&scenario, answers.as_slice())?;
            for entry in step.history() {
                println!("{} -> {}", entry.question, entry.answer);
            }
            match step {
                TriageStep::Level { level, .. } => {
                    println!("Level {} ({})", level, severity_label(level));
                }
                TriageStep::Question { node, .. } => {
                    println!("Next: {}", node.question());
                    println!("Options: {}", node.labels().collect::<Vec<_>>().join(" / "));
                }
            }
        }
        Some(Commands::Manual { level }) => {
            let level = manual_level(level)?;
            println!("Level {} ({})", level, severity_label(level));
        }
        Some(Commands::Search {
            data,
            lat,
            lng,
            levels,
            top_n,
            max_distance,
        }) => {
            let directory = load_directory(&data)?;
            let mut query = SearchQuery::new(lat, lng)?;
            if !levels.is_empty() {
                query = query.with_levels(levels)?;
            }
            if let Some(km) = max_distance {
                query = query.with_max_distance(km)?;
            }
            let result = directory.search(&query, top_n)?;
            if result.is_empty() {
                println!("No hospitals found.");
                if result.should_widen_levels() {
                    println!("Hospitals exist at other levels; try without --level.");
                }
            }
            for hit in &result.hits {
                println!(
                    "{:>8.2} km  ~{:>3} min  L{} {}  [{}]",
                    hit.distance_km,
                    hit.travel_time_minutes,
                    hit.hospital.level,
                    hit.hospital.name,
                    hit.hospital.id
                );
            }
        }
        Some(Commands::Recommend {
            data,
            lat,
            lng,
            severity,
            symptoms,
            top_n,
            max_distance,
        }) => {
            let directory = load_directory(&data)?;
            let severity = manual_level(severity)?;
            let query = RecommendQuery::new(lat, lng, severity)?
                .with_symptoms(symptoms)
                .with_max_distance(max_distance)?;
            let result = directory.recommend(&query, top_n)?;
            println!("Severity: {} ({})", severity, severity_label(severity));
            if result.hits.is_empty() {
                println!("No hospitals within {} km.", max_distance);
            }
            for hit in &result.hits {
                println!(
                    "{:>7.2}  {:>8.2} km  ~{:>3} min  L{} {}  [{}]",
                    hit.priority_score,
                    hit.distance_km,
                    hit.travel_time_minutes,
                    hit.hospital.level,
                    hit.hospital.name,
                    hit.hospital.id
                );
                println!("         {}", hit.reason);
            }
        }
        Some(Commands::Template { output }) => {
            let text = template_csv()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    println!("Template written to {}", path.display());
                }
                None => print!("{}", text),
            }
        }
        Some(Commands::Validate { file }) => {
            let report = import_path(&file);
            println!("Accepted: {}", report.accepted());
            for problem in report.error_messages() {
                println!("Rejected: {}", problem);
            }
            if report.accepted() == 0 {
                return Err("no valid hospital rows".into());
            }
        }
        Some(Commands::Stats { data }) => {
            let stats = load_directory(&data)?.stats()?;
            println!("Hospitals: {}", stats.total_hospitals);
            for (level, count) in &stats.by_level {
                let description = medimap_core::Level::try_from(*level)
                    .map(level_description)
                    .unwrap_or("unknown");
                println!("  Level {} ({}): {}", level, description, count);
            }
            println!("With emergency services: {}", stats.with_emergency_services);
            if let Some(beds) = stats.average_bed_count {
                println!("Average beds: {:.1}", beds);
            }
            println!("Facilities: {}", stats.unique_facilities);
            println!("Specialties: {}", stats.unique_specialties);
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
