use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use coursedeck::model::{RecommendationRequest, SearchParams};
use coursedeck::remote::CatalogClient;
use coursedeck::tui::{TuiRunOptions, run_with_options};

#[derive(Parser)]
#[command(name = "coursedeck")]
#[command(about = "Course catalog explorer", long_about = None)]
struct Cli {
    /// Catalog API base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog interactively
    Explore {
        /// Quiet period after typing before a search fires (0 = every keystroke)
        #[arg(long, default_value_t = 250)]
        debounce_ms: u64,
    },

    /// Run one catalog search and print the results
    Search {
        /// Department code ("all" matches everything)
        #[arg(long)]
        major: Option<String>,
        /// Gen ed category; repeat for multiple
        #[arg(long = "gened")]
        geneds: Vec<String>,
        /// Free-text query over code, name, and description
        #[arg(short, long)]
        query: Option<String>,
        /// Result window size
        #[arg(long, default_value_t = 30)]
        limit: usize,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the department and gen ed lists
    Meta {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the AI assistant for course recommendations
    Recommend {
        /// Intended major
        #[arg(long)]
        major: String,
        /// Free-text goals
        #[arg(long, default_value = "")]
        goals: String,
        /// Priority label; repeat for multiple
        #[arg(long = "priority")]
        priorities: Vec<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Explore { debounce_ms } => run_with_options(TuiRunOptions {
            base_url: cli.base_url,
            debounce: Duration::from_millis(debounce_ms),
        }),
        Commands::Search {
            major,
            geneds,
            query,
            limit,
            json,
        } => {
            let client = CatalogClient::new(&cli.base_url)?;
            let params = SearchParams {
                major: major.filter(|m| m != "all"),
                geneds: if geneds.is_empty() {
                    None
                } else {
                    Some(geneds.join(","))
                },
                q: query.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
                limit,
            };
            let response = client.search(&params)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&response)
                        .context("serialize search response")?
                );
            } else {
                for course in &response.results {
                    let tags = course.gen_ed_tags();
                    if tags.is_empty() {
                        println!(
                            "{} {} ({}, {} hrs)",
                            course.course_code,
                            course.course_name,
                            course.department,
                            course.credit_label()
                        );
                    } else {
                        println!(
                            "{} {} ({}, {} hrs) [{}]",
                            course.course_code,
                            course.course_name,
                            course.department,
                            course.credit_label(),
                            tags.join(", ")
                        );
                    }
                }
                println!(
                    "{} of {} matching courses",
                    response.results.len(),
                    response.matches
                );
            }
            Ok(())
        }
        Commands::Meta { json } => {
            let client = CatalogClient::new(&cli.base_url)?;
            let meta = client.meta()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("serialize catalog meta")?
                );
            } else {
                println!("departments:");
                for dept in &meta.departments {
                    println!("  {}", dept);
                }
                println!("gen eds:");
                for gened in &meta.geneds {
                    println!("  {}", gened);
                }
            }
            Ok(())
        }
        Commands::Recommend {
            major,
            goals,
            priorities,
            json,
        } => {
            let client = CatalogClient::new(&cli.base_url)?;
            let request = RecommendationRequest {
                major,
                goals,
                priorities,
            };
            let value = client.recommend(&request)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).context("serialize recommendation")?
                );
                return Ok(());
            }
            match coursedeck::assistant::decode_recommendation(&value) {
                coursedeck::assistant::RecommendationOutcome::Structured(advice) => {
                    for item in advice {
                        println!("{}: {}", item.course, item.reason);
                        println!("  {}", item.detail_path);
                    }
                }
                coursedeck::assistant::RecommendationOutcome::Opaque(text) => println!("{}", text),
            }
            Ok(())
        }
    }
}
