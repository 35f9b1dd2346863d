//! Command-line delivery zone check.
//!
//! Checks a raw coordinate, geocodes an address and checks every candidate, or
//! runs an interactive prompt with debounced suggestions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use perimeter::config::Config;
use perimeter::geocoder::{Geocoder, YandexGeocoder};
use perimeter::session::{CheckSession, SuggestionDebouncer, SuggestionEvent};
use perimeter::{City, ContainmentEngine, Coordinate};

#[derive(Parser, Debug)]
#[command(name = "perimeter-check")]
#[command(about = "Check whether an address is inside a delivery zone")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a coordinate
    Point {
        /// City identifier: moscow or spb
        #[arg(long, default_value = "moscow")]
        city: City,

        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
    /// Geocode an address and check the candidates
    Address {
        /// City identifier: moscow or spb
        #[arg(long, default_value = "moscow")]
        city: City,

        /// Pick this candidate (0-based) and confirm delivery
        #[arg(long)]
        select: Option<usize>,

        /// Free-text address
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Type addresses line by line and pick from debounced suggestions
    Interactive {
        /// City identifier: moscow or spb
        #[arg(long, default_value = "moscow")]
        city: City,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_or_default(args.config.as_ref())?;
    let engine = ContainmentEngine::default();

    match args.command {
        Command::Point { city, lat, lon } => {
            let verdict = engine.check(city, Coordinate::new(lat, lon));
            print_verdict(verdict.inside, city, &verdict.coordinate.to_string());
        }
        Command::Address { city, select, text } => {
            let geocoder =
                YandexGeocoder::new(&config.geocoder).context("Failed to create geocoder")?;
            check_address(&engine, &geocoder, &config, city, &text.join(" "), select).await?;
        }
        Command::Interactive { city } => {
            let geocoder: Arc<dyn Geocoder> = Arc::new(
                YandexGeocoder::new(&config.geocoder).context("Failed to create geocoder")?,
            );
            interactive(&engine, geocoder, &config, city).await?;
        }
    }

    Ok(())
}

async fn check_address(
    engine: &ContainmentEngine,
    geocoder: &dyn Geocoder,
    config: &Config,
    city: City,
    text: &str,
    select: Option<usize>,
) -> Result<()> {
    let mut session = CheckSession::new(city, &config.suggest);
    println!("{}", session.prompt());

    let Some(request) = session.on_query_changed(text) else {
        anyhow::bail!(
            "Address must be at least {} characters",
            config.suggest.min_query_len
        );
    };

    info!("Geocoding {:?} in {}", request.query, request.city);
    let suggestions = geocoder
        .suggest(request.city, &request.query)
        .await
        .context("Geocoding failed")?;
    session.apply(SuggestionEvent::Loaded {
        generation: request.generation,
        suggestions,
    });

    if session.suggestions().is_empty() {
        println!("No addresses found");
        return Ok(());
    }

    print_suggestions(engine, &session);

    let Some(index) = select else {
        return Ok(());
    };

    session
        .on_suggestion_selected(index, engine)
        .with_context(|| format!("No candidate with index {}", index))?;
    print_outcome(&session);

    Ok(())
}

/// Read input lines from stdin. Plain text updates the query, `:N` selects a
/// suggestion, `:city <id>` switches city and `:q` quits.
async fn interactive(
    engine: &ContainmentEngine,
    geocoder: Arc<dyn Geocoder>,
    config: &Config,
    city: City,
) -> Result<()> {
    let (mut debouncer, mut events) = SuggestionDebouncer::with_config(geocoder, &config.suggest);
    let mut session = CheckSession::new(city, &config.suggest);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", session.prompt());
    println!("Commands: :N selects a suggestion, :city <moscow|spb> switches city, :q quits");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let line = line.trim();

                match line.strip_prefix(':') {
                    Some("q") => break,
                    Some(command) => {
                        if let Some(id) = command.strip_prefix("city ") {
                            match id.trim().parse::<City>() {
                                Ok(city) => {
                                    debouncer.cancel();
                                    session.on_city_changed(city);
                                    println!("{}", session.prompt());
                                }
                                Err(e) => println!("{}", e),
                            }
                        } else if let Ok(index) = command.parse::<usize>() {
                            if session.on_suggestion_selected(index, engine).is_some() {
                                debouncer.cancel();
                                print_outcome(&session);
                            } else {
                                println!("No candidate with index {}", index);
                            }
                        } else {
                            println!("Unknown command :{}", command);
                        }
                    }
                    None => match session.on_query_changed(line) {
                        Some(request) => debouncer.submit(request),
                        None => debouncer.cancel(),
                    },
                }
            }
            Some(event) = events.recv() => {
                let failure = match &event {
                    SuggestionEvent::Failed { error, .. } => Some(error.clone()),
                    _ => None,
                };
                let loaded = matches!(event, SuggestionEvent::Loaded { .. });

                if !session.apply(event) {
                    continue;
                }
                if let Some(error) = failure {
                    println!("Suggestions unavailable: {}", error);
                } else if loaded && session.suggestions().is_empty() {
                    println!("No addresses found");
                } else if loaded {
                    print_suggestions(engine, &session);
                }
            }
        }
    }

    Ok(())
}

fn print_suggestions(engine: &ContainmentEngine, session: &CheckSession) {
    for (i, suggestion) in session.suggestions().iter().enumerate() {
        let mark = if engine.is_inside(session.city(), suggestion.coordinate) {
            "+"
        } else {
            "-"
        };
        println!(
            "[{}] {} {} ({})",
            i, mark, suggestion.name, suggestion.coordinate
        );
    }
}

fn print_outcome(session: &CheckSession) {
    if let Some(message) = session.verdict_message() {
        println!("{}", message);
    }
    if let Some(confirmation) = session.confirm() {
        println!("Доставка по адресу: {}", confirmation.address);
    }
}

fn print_verdict(inside: bool, city: City, location: &str) {
    if inside {
        println!("{}: inside {} ({})", location, city.zone_name(), city);
    } else {
        println!("{}: outside {} ({})", location, city.zone_name(), city);
    }
}
