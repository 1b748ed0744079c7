use picture_games::config::{
    AppPaths, DifferenceConfig, GuessingConfig, LOG_FILTER_ENV, MemoryConfig,
};
use picture_games::error::{GameError, Result};
use picture_games::games::{self, Session};
use picture_games::ledger::{JsonFileStore, ScoreLedger};
use std::env;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main()
{
    let paths = AppPaths::resolve();
    init_logging(&paths);

    if let Err(err) = run(&paths) {
        tracing::error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to a file; the terminal belongs to the games.
fn init_logging(paths: &AppPaths)
{
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let file = fs::create_dir_all(&paths.dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(paths.log())
    });
    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(err) => eprintln!("Warning: logging disabled ({err})."),
    }
}

fn run(paths: &AppPaths) -> Result<()>
{
    let mut args = env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();
    match command.as_deref() {
        None => interactive_menu(paths),
        Some("list") => {
            list_games();
            Ok(())
        }
        Some("scores") => show_scores(paths, &rest),
        Some(name @ ("difference" | "guessing" | "memory")) => run_game(name, &rest, paths),
        Some("-h") | Some("--help") => {
            print_help();
            Ok(())
        }
        Some(other) => Err(GameError::Usage(format!(
            "Unknown command '{other}'. Run with --help."
        ))),
    }
}

fn run_game(name: &str, args: &[String], paths: &AppPaths) -> Result<()>
{
    tracing::info!(game = name, "starting");
    match name {
        "difference" => {
            let config = DifferenceConfig::from_args(args)?;
            let mut session = Session::new(&config.common, paths);
            games::difference::run(&mut session)
        }
        "guessing" => {
            let config = GuessingConfig::from_args(args)?;
            let mut session = Session::new(&config.common, paths);
            games::guessing::run(&mut session, &config)
        }
        "memory" => {
            let config = MemoryConfig::from_args(args)?;
            let mut session = Session::new(&config.common, paths);
            games::memory::run(&mut session, &config)
        }
        _ => Err(GameError::Usage(format!(
            "Unknown game '{name}'. Run with --help."
        ))),
    }
}

fn interactive_menu(paths: &AppPaths) -> Result<()>
{
    let registry = games::registry();
    println!("Picture Games");
    println!();
    println!("Select a game:");
    for (idx, game) in registry.iter().enumerate() {
        println!("  {}. {} - {}", idx + 1, game.title, game.description);
    }
    println!();
    print!("Enter number or name (default 1, s for scores, q to quit): ");
    std::io::Write::flush(&mut std::io::stdout()).map_err(GameError::Terminal)?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(GameError::Terminal)?;
    let choice = input.trim();

    if choice.is_empty() {
        return run_game(registry[0].name, &[], paths);
    }
    if choice.eq_ignore_ascii_case("q") {
        return Ok(());
    }
    if choice.eq_ignore_ascii_case("s") {
        return show_scores(paths, &[]);
    }
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 && index <= registry.len() {
            return run_game(registry[index - 1].name, &[], paths);
        }
    }

    for game in registry {
        if game.name.eq_ignore_ascii_case(choice) {
            return run_game(game.name, &[], paths);
        }
    }

    Err(GameError::Usage("Invalid selection.".to_string()))
}

fn show_scores(paths: &AppPaths, args: &[String]) -> Result<()>
{
    let filter = match args {
        [] => None,
        [name] => Some(games::title_for(name).ok_or_else(|| {
            GameError::Usage(format!("Unknown game '{name}'. Run 'list' to see games."))
        })?),
        _ => return Err(GameError::Usage("scores takes at most one game name".to_string())),
    };

    let ledger = ScoreLedger::new(JsonFileStore::new(paths.scores()));
    let entries = ledger.query(filter);
    if entries.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }

    println!("{:<20} {:>6} {:>6}  {}", "Game", "Score", "Time", "Date");
    for entry in entries {
        println!(
            "{:<20} {:>6} {:>5}s  {}",
            entry.game,
            entry.score,
            entry.time,
            entry.date.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn list_games()
{
    println!("Available games:");
    for game in games::registry() {
        println!("  {:<10} - {}: {}", game.name, game.title, game.description);
    }
}

fn print_help()
{
    println!("picture-games");
    println!("\nUsage:");
    println!("  picture-games list");
    println!("  picture-games difference");
    println!("  picture-games guessing [--seconds=30]");
    println!("  picture-games memory [--difficulty=easy|medium|hard]");
    println!("  picture-games scores [game]");
    println!("\nEvery game also takes --seed=N and --mute.");
    println!("\nNotes:");
    println!("  Scores are kept in scores.json in the data directory; set");
    println!("  PICTURE_GAMES_DATA to move it. PICTURE_GAMES_LOG sets the log filter.");
}
