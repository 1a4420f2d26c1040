//! Quick & dirty text input to drive the widget without a real touch screen
//!
//! One step per line, times in milliseconds, pointers as `x,y` in the order they went down:
//!
//! ```text
//! # drag right and let go
//! 0 down 150,150
//! 16 move 160,150
//! 32 move 200,150
//! 40 up 200,150
//! 500 pointer-down 1 150,150 180,150
//! 600 pointer-up 0 150,150 180,150
//! 1200 frame
//! ```

use std::{str::FromStr, sync::OnceLock};

use kurbo::Point;
use regex::Regex;
use tracing::{debug, trace};

use crate::{
    error::ScriptError,
    touch::{TouchAction, TouchEvent},
    view::{Droid, Host},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Touch(TouchEvent),
    /// Force a frame at this time, seconds
    Frame(f64),
}

impl Step {
    pub fn time(&self) -> f64 {
        match self {
            Step::Touch(event) => event.time,
            Step::Frame(time) => *time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    steps: Vec<Step>,
}

/// What came of playing a [`Script`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playback {
    pub frames: usize,
    /// Touch events the widget claimed
    pub handled: usize,
    /// Time of the last frame, seconds
    pub end: f64,
}

fn parse_point(line: usize, raw: &str) -> Result<Point, ScriptError> {
    static POINT: OnceLock<Regex> = OnceLock::new();
    let point = POINT.get_or_init(|| Regex::new(r"^(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)$").unwrap());
    let captures = point
        .captures(raw)
        .ok_or_else(|| ScriptError::InvalidPoint(line, raw.to_string()))?;
    let coord = |i: usize| -> Result<f64, ScriptError> {
        captures[i]
            .parse::<f64>()
            .map_err(|e| ScriptError::InvalidF64(line, e))
    };
    Ok(Point::new(coord(1)?, coord(2)?))
}

fn pointers<'a>(
    line: usize,
    command: &'static str,
    args: impl Iterator<Item = &'a str>,
    at_least: usize,
) -> Result<Vec<Point>, ScriptError> {
    let points = args
        .map(|raw| parse_point(line, raw))
        .collect::<Result<Vec<_>, _>>()?;
    if points.len() < at_least {
        return Err(ScriptError::TooFewPointers(line, command, at_least));
    }
    Ok(points)
}

impl Step {
    /// `line` is 1-based, for error messages only
    fn parse(line: usize, text: &str) -> Result<Step, ScriptError> {
        static STEP: OnceLock<Regex> = OnceLock::new();
        let step = STEP.get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)?)\s+([a-z-]+)(.*)$").unwrap());
        let unrecognized = || ScriptError::UnrecognizedCommand(line, text.to_string());

        let captures = step.captures(text).ok_or_else(unrecognized)?;
        let time = captures[1]
            .parse::<f64>()
            .map_err(|e| ScriptError::InvalidF64(line, e))?
            / 1000.0;
        let mut args = captures[3].split_whitespace();

        let mut indexed = |command: &'static str,
                           action: fn(usize) -> TouchAction|
         -> Result<Step, ScriptError> {
            let index = args
                .next()
                .and_then(|raw| raw.parse::<usize>().ok())
                .ok_or_else(unrecognized)?;
            let points = pointers(line, command, args.by_ref(), 2)?;
            if index >= points.len() {
                return Err(ScriptError::PointerIndexOutOfRange(
                    line,
                    index,
                    points.len(),
                ));
            }
            Ok(Step::Touch(TouchEvent::new(action(index), points, time)))
        };

        match &captures[2] {
            "pointer-down" => indexed("pointer-down", TouchAction::PointerDown),
            "pointer-up" => indexed("pointer-up", TouchAction::PointerUp),
            "down" => Ok(Step::Touch(TouchEvent::new(
                TouchAction::Down,
                pointers(line, "down", args, 1)?,
                time,
            ))),
            "move" => Ok(Step::Touch(TouchEvent::moved(
                time,
                pointers(line, "move", args, 1)?,
            ))),
            "up" => Ok(Step::Touch(TouchEvent::new(
                TouchAction::Up,
                pointers(line, "up", args, 1)?,
                time,
            ))),
            "cancel" => Ok(Step::Touch(TouchEvent::cancel(time))),
            "frame" => Ok(Step::Frame(time)),
            _ => Err(unrecognized()),
        }
    }
}

fn frame(droid: &mut Droid, host: &mut dyn Host, time: f64, playback: &mut Playback) {
    droid.on_frame(time, host);
    droid.draw();
    playback.frames += 1;
    playback.end = time;
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut steps: Vec<Step> = Vec::new();
        for (i, line) in s.lines().enumerate() {
            let text = line.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            let step = Step::parse(i + 1, text)?;
            if let Some(last) = steps.last() {
                if step.time() < last.time() {
                    return Err(ScriptError::TimeWentBackwards(i + 1, step.time() * 1000.0));
                }
            }
            steps.push(step);
        }
        Ok(Script { steps })
    }
}

impl Script {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Time of the last step, seconds
    pub fn duration(&self) -> f64 {
        self.steps.last().map(Step::time).unwrap_or_default()
    }

    /// Feed every step to `droid`, with a frame every `frame_interval` seconds in between,
    /// then keep framing for `tail` seconds so animations can finish.
    ///
    /// Every frame is drawn, as a host would, so touches hit test against the latest figure.
    pub fn play(
        &self,
        droid: &mut Droid,
        host: &mut dyn Host,
        frame_interval: f64,
        tail: f64,
    ) -> Result<Playback, ScriptError> {
        if !(frame_interval > 0.0 && frame_interval.is_finite()) {
            return Err(ScriptError::InvalidFrameInterval(frame_interval));
        }
        let mut playback = Playback::default();
        let mut next_frame = 0.0;
        for step in self.steps.iter() {
            while next_frame <= step.time() {
                frame(droid, host, next_frame, &mut playback);
                next_frame += frame_interval;
            }
            match step {
                Step::Touch(event) => {
                    let handled = droid.on_touch(event, host);
                    trace!("{:?} at {}s handled {handled}", event.action, event.time);
                    if handled {
                        playback.handled += 1;
                    }
                }
                Step::Frame(time) => frame(droid, host, *time, &mut playback),
            }
        }
        let end = self.duration() + tail;
        while next_frame <= end {
            frame(droid, host, next_frame, &mut playback);
            next_frame += frame_interval;
        }
        debug!("Played {} steps over {} frames", self.steps.len(), playback.frames);
        Ok(playback)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Insets, Point, Size, Vec2};

    use crate::{
        config::DroidConfig,
        error::ScriptError,
        touch::{TouchAction, TouchEvent},
        view::{Droid, RecordingHost},
    };

    use super::{Script, Step};

    #[test]
    fn parse_steps() {
        let script: Script = r"
            # comment only
            0 down 150,150
            16 move 160.5,150   # trailing comment
            20 pointer-down 1 160.5,150 200,150
            30 pointer-up 0 160.5,150 200,150
            40 up 200,150
            50 cancel
            66.5 frame
        "
        .parse()
        .unwrap();
        assert_eq!(
            &[
                Step::Touch(TouchEvent::down(0.0, (150.0, 150.0))),
                Step::Touch(TouchEvent::moved(0.016, vec![Point::new(160.5, 150.0)])),
                Step::Touch(TouchEvent::new(
                    TouchAction::PointerDown(1),
                    vec![Point::new(160.5, 150.0), Point::new(200.0, 150.0)],
                    0.02
                )),
                Step::Touch(TouchEvent::new(
                    TouchAction::PointerUp(0),
                    vec![Point::new(160.5, 150.0), Point::new(200.0, 150.0)],
                    0.03
                )),
                Step::Touch(TouchEvent::up(0.04, (200.0, 150.0))),
                Step::Touch(TouchEvent::cancel(0.05)),
                Step::Frame(0.0665),
            ],
            script.steps()
        );
    }

    #[test]
    fn reject_unknown_command() {
        let err = "0 tickle 1,1".parse::<Script>().unwrap_err();
        assert!(matches!(err, ScriptError::UnrecognizedCommand(1, _)), "{err}");
    }

    #[test]
    fn reject_bad_point() {
        let err = "0 down 1;1".parse::<Script>().unwrap_err();
        assert!(matches!(err, ScriptError::InvalidPoint(1, _)), "{err}");
    }

    #[test]
    fn reject_lonely_pointer_down() {
        let err = "0 pointer-down 0 1,1".parse::<Script>().unwrap_err();
        assert!(
            matches!(err, ScriptError::TooFewPointers(1, "pointer-down", 2)),
            "{err}"
        );
    }

    #[test]
    fn reject_index_out_of_range() {
        let err = "0 pointer-up 2 1,1 2,2".parse::<Script>().unwrap_err();
        assert!(
            matches!(err, ScriptError::PointerIndexOutOfRange(1, 2, 2)),
            "{err}"
        );
    }

    #[test]
    fn reject_time_travel() {
        let err = "100 down 1,1\n\n50 up 1,1".parse::<Script>().unwrap_err();
        assert!(matches!(err, ScriptError::TimeWentBackwards(3, _)), "{err}");
    }

    #[test]
    fn play_drag_and_settle() {
        let script: Script = r"
            0 down 150,150
            16 move 160,150
            32 move 170,150
            48 move 180,150
            300 move 180,150
            300 up 180,150
        "
        .parse()
        .unwrap();
        let mut droid = Droid::new(DroidConfig {
            limit_to_bounds: true,
            ..Default::default()
        });
        droid.layout(Size::new(300.0, 300.0), Insets::ZERO);
        let mut host = RecordingHost::default();

        let playback = script.play(&mut droid, &mut host, 0.016, 5.0).unwrap();
        assert_eq!(6, playback.handled);
        assert!(playback.end > 5.0);
        assert!(!droid.is_settling());
        assert_eq!(Vec2::ZERO, droid.transform().translation);
        assert_eq!(0, host.clicks);
    }

    #[test]
    fn play_rejects_stalled_clock() {
        let script: Script = "0 down 150,150\n10 up 150,150".parse().unwrap();
        let mut droid = Droid::default();
        let mut host = RecordingHost::default();
        for interval in [0.0, -0.016, f64::NAN] {
            let err = script.play(&mut droid, &mut host, interval, 1.0).unwrap_err();
            assert!(matches!(err, ScriptError::InvalidFrameInterval(_)), "{err}");
        }
        assert_eq!(RecordingHost::default(), host);
    }
}
