pub mod difference;
pub mod guessing;
pub mod memory;
pub mod terminal;

use crate::config::{AppPaths, CommonOptions};
use crate::images::{ImageSource, PicsumSource};
use crate::ledger::{JsonFileStore, ScoreLedger};
use crate::rng::GameRng;
use crate::rounds::{DIFFERENCE_GAME, GUESSING_GAME, MEMORY_GAME, RoundSummary};
use crate::sound::{Silent, SoundCue, SoundSink, TerminalBell};

pub struct GameDescriptor
{
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub fn registry() -> Vec<GameDescriptor>
{
    vec![
        GameDescriptor {
            name: "difference",
            title: DIFFERENCE_GAME,
            description: "Find the five painted differences",
        },
        GameDescriptor {
            name: "guessing",
            title: GUESSING_GAME,
            description: "Name what the picture shows before time runs out",
        },
        GameDescriptor {
            name: "memory",
            title: MEMORY_GAME,
            description: "Flip cards and match the pairs",
        },
    ]
}

/// Maps a command name ("memory") or a full title to the ledger title.
pub fn title_for(name: &str) -> Option<&'static str>
{
    registry()
        .into_iter()
        .find(|game| game.name.eq_ignore_ascii_case(name) || game.title.eq_ignore_ascii_case(name))
        .map(|game| game.title)
}

/// What a game screen needs from the outside world.
pub struct Session
{
    pub rng: GameRng,
    pub images: Box<dyn ImageSource>,
    pub sound: Box<dyn SoundSink>,
    pub ledger: ScoreLedger<JsonFileStore>,
}

impl Session
{
    pub fn new(options: &CommonOptions, paths: &AppPaths) -> Self
    {
        let rng = options.seed.map(GameRng::new).unwrap_or_else(GameRng::from_entropy);
        tracing::debug!(seed = rng.seed(), "session rng");
        let sound: Box<dyn SoundSink> = if options.mute {
            Box::new(Silent)
        } else {
            Box::new(TerminalBell)
        };
        Self {
            rng,
            images: Box::new(PicsumSource::new()),
            sound,
            ledger: ScoreLedger::new(JsonFileStore::new(paths.scores())),
        }
    }

    pub fn play(&mut self, cue: SoundCue)
    {
        self.sound.play(cue);
    }

    /// Saves a finished round. A failed write is logged, the game goes on.
    pub fn record(&self, summary: &RoundSummary)
    {
        if let Err(err) = self.ledger.record(summary.to_entry()) {
            tracing::warn!(game = summary.game, "could not save score: {err}");
        }
    }

    pub fn best(&self, game: &str) -> Option<u32>
    {
        self.ledger.best(game).map(|entry| entry.score)
    }
}
