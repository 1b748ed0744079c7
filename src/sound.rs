//! Symbolic sound cues. The games only say which cue; a sink decides
//! what that sounds like.

use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue
{
    Hover,
    Click,
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone
{
    pub frequency_hz: u32,
    pub duration_secs: f32,
}

impl SoundCue
{
    pub fn name(self) -> &'static str
    {
        match self {
            SoundCue::Hover => "hover",
            SoundCue::Click => "click",
            SoundCue::Success => "success",
            SoundCue::Error => "error",
        }
    }

    pub fn tone(self) -> Tone
    {
        let (frequency_hz, duration_secs) = match self {
            SoundCue::Hover => (800, 0.1),
            SoundCue::Click => (600, 0.1),
            SoundCue::Success => (880, 0.2),
            SoundCue::Error => (200, 0.3),
        };
        Tone {
            frequency_hz,
            duration_secs,
        }
    }
}

pub trait SoundSink
{
    fn play(&mut self, cue: SoundCue);
}

/// Shortest tone worth a bell. Outcome cues ring, clicks and hovers
/// stay quiet.
const BELL_MIN_SECS: f32 = 0.2;

pub struct TerminalBell;

impl TerminalBell
{
    pub fn rings(cue: SoundCue) -> bool
    {
        cue.tone().duration_secs >= BELL_MIN_SECS
    }
}

impl SoundSink for TerminalBell
{
    fn play(&mut self, cue: SoundCue)
    {
        let tone = cue.tone();
        tracing::trace!(cue = cue.name(), hz = tone.frequency_hz, secs = tone.duration_secs, "sound");
        if Self::rings(cue) {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(b"\x07");
            let _ = stdout.flush();
        }
    }
}

pub struct Silent;

impl SoundSink for Silent
{
    fn play(&mut self, cue: SoundCue)
    {
        tracing::trace!(cue = cue.name(), "sound muted");
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn names_are_symbolic()
    {
        let names: Vec<_> = [SoundCue::Hover, SoundCue::Click, SoundCue::Success, SoundCue::Error]
            .iter()
            .map(|cue| cue.name())
            .collect();
        assert_eq!(names, vec!["hover", "click", "success", "error"]);
    }

    #[test]
    fn only_outcomes_ring_the_bell()
    {
        assert!(TerminalBell::rings(SoundCue::Success));
        assert!(TerminalBell::rings(SoundCue::Error));
        assert!(!TerminalBell::rings(SoundCue::Click));
        assert!(!TerminalBell::rings(SoundCue::Hover));
    }

    #[test]
    fn error_is_low_and_long()
    {
        let tone = SoundCue::Error.tone();
        assert_eq!(tone.frequency_hz, 200);
        assert!(tone.duration_secs > SoundCue::Click.tone().duration_secs);
    }
}
