//! Atlas Quiz - terminal front end
//!
//! Loads the config and country catalog, starts the game driver and reads
//! commands from stdin. Lines are either the text grammar (`help` lists
//! it) or a JSON UI trigger such as
//! `{"class":"country-polygon","data":{"name_en":"Kenya"}}`.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use atlas_quiz::catalog::load_from_file;
use atlas_quiz::command::{parse_command, Command, UiTrigger};
use atlas_quiz::core::error::{GeoError, Result};
use atlas_quiz::core::GameConfig;
use atlas_quiz::game::{GameEvent, GameSession};
use atlas_quiz::lookup::{DetailLookup, RestCountriesClient, StaticLookup};
use atlas_quiz::runtime::GameDriver;
use atlas_quiz::storage::JsonFileStore;
use atlas_quiz::timer::format_clock;

#[derive(Parser, Debug)]
#[command(name = "atlas-quiz")]
#[command(about = "Find countries on the world map")]
struct Args {
    /// GeoJSON FeatureCollection of guessable countries
    #[arg(long, default_value = "data/countries.geojson")]
    catalog: PathBuf,

    /// Optional TOML config; defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file holding high score, saved timer and settings
    #[arg(long, default_value = "atlas-quiz-store.json")]
    store: PathBuf,

    /// RNG seed (random if not set)
    #[arg(long)]
    seed: Option<u64>,

    /// Answer detail lookups from the catalog instead of the network
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("atlas_quiz=info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let catalog = Arc::new(load_from_file(&args.catalog)?);
    tracing::info!("Loaded {} countries from {}", catalog.len(), args.catalog.display());

    let store = JsonFileStore::open(&args.store)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Session seed {}", seed);
    let session = GameSession::new(Arc::clone(&catalog), config.clone(), Box::new(store), seed);

    print_help();
    let rt = Runtime::new()?;
    if args.offline {
        let lookup = StaticLookup::from_catalog(&catalog);
        rt.block_on(play(session, Arc::new(lookup)))
    } else {
        let client = RestCountriesClient::new(&config.lookup)?;
        rt.block_on(play(session, Arc::new(client)))
    }
}

async fn play<L: DetailLookup>(session: GameSession, lookup: Arc<L>) -> Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();

    let driver = tokio::spawn(GameDriver::new(session, lookup).run(cmd_rx, ev_tx));
    let printer = tokio::spawn(async move {
        while let Some(event) = ev_rx.recv().await {
            print_event(&event);
        }
    });
    let reader = tokio::task::spawn_blocking(move || read_commands(cmd_tx));

    reader.await.map_err(join_error)??;
    let session = driver.await.map_err(join_error)?;
    printer.await.map_err(join_error)?;

    println!(
        "\nGoodbye! Score {} (high score {}).",
        session.score(),
        session.high_score()
    );
    Ok(())
}

fn join_error(e: tokio::task::JoinError) -> GeoError {
    GeoError::Io(io::Error::other(e))
}

/// Read stdin until EOF or `quit`; dropping the sender stops the driver
fn read_commands(commands: mpsc::Sender<Command>) -> Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "q" => break,
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        let parsed = if line.starts_with('{') {
            serde_json::from_str::<UiTrigger>(line)
                .map_err(|e| e.to_string())
                .and_then(|t| t.to_command().map_err(|e| e.to_string()))
        } else {
            parse_command(line).map_err(|e| e.to_string())
        };

        match parsed {
            Ok(command) => {
                if commands.blocking_send(command).is_err() {
                    break;
                }
            }
            Err(e) => println!("  ! {}", e),
        }
    }
    Ok(())
}

fn print_help() {
    println!("=== ATLAS QUIZ ===");
    println!("  easy | medium | hard          start a map game");
    println!("  guess <country>               click a country");
    println!("  forfeit | again | menu");
    println!("  timer <min> <sec> | timer saved | timer stop");
    println!("  timer save <min> <sec> | timer clear");
    println!("  clue | clue stop | estimate");
    println!("  flags | flag <code> | flags leave");
    println!("  marker add <lat> <lng> <name> | marker remove <id> | marker clear");
    println!("  set music|effects <0..1>");
    println!("  set mute-music|mute-effects|zoom|trivia on|off");
    println!("  quit");
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::CountrySelected { name, .. } => println!("Find: {}", name),
        GameEvent::PromptFlag { flag_png, .. } => println!("Find the country with this flag: {}", flag_png),
        GameEvent::GuessResolved { outcome, clicked, .. } => println!("{} -> {:?}", clicked, outcome),
        GameEvent::GuessesChanged { remaining } => println!("Guesses left: {}", remaining),
        GameEvent::ScoreChanged { score } => println!("Score: {}", score),
        GameEvent::HighScoreChanged { high_score } => println!("New high score: {}", high_score),
        GameEvent::TimerStarted { role, remaining } | GameEvent::TimerTick { role, remaining } => {
            println!("[{:?}] {}", role, format_clock(*remaining))
        }
        GameEvent::TimerBonus { remaining } => println!("Bonus! {}", format_clock(*remaining)),
        GameEvent::Trivia {
            trivia: Some(trivia),
            ..
        } => println!(
            "{}: capital {}, population {}, languages {}, currencies {}",
            trivia.name, trivia.capital, trivia.population, trivia.languages, trivia.currencies
        ),
        GameEvent::GameOver { name, coords, .. } => {
            println!("Game over! It was {} ({:.2}, {:.2})", name, coords.lat, coords.lng)
        }
        GameEvent::GameOverInfo {
            trivia: Some(trivia),
            ..
        } => println!("{}: capital {}", trivia.name, trivia.capital),
        GameEvent::AllCountriesGuessed => println!("You found every country!"),
        GameEvent::FlagRoundReady(round) => {
            println!("Which flag belongs to {}?", round.target_name());
            for choice in &round.choices {
                println!("  {}  {}", choice.detail.cca2, choice.detail.flag_png);
            }
        }
        GameEvent::FlagGuessResolved { outcome, .. } => println!("Flag guess: {:?}", outcome),
        GameEvent::TimerInputRejected { error } => println!("  ! {}", error),
        GameEvent::MarkerAdded(marker) => println!("Marker {} added ({})", marker.name, marker.id),
        GameEvent::MarkerRejected(error) => println!("  ! {}", error),
        // Control and clue state only matter to a graphical surface
        GameEvent::ControlChanged { .. } | GameEvent::MapClue { .. } => {}
        other => tracing::debug!("{:?}", other),
    }
}
