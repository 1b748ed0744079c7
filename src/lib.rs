//! Picture mini-games for the terminal: spot the difference, image
//! guessing and memory matching, over one shared round/clock/ledger core.

pub mod clock;
pub mod config;
pub mod error;
pub mod games;
pub mod images;
pub mod ledger;
pub mod rng;
pub mod rounds;
pub mod sound;
