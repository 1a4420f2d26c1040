//! Error types
use std::num::ParseFloatError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpringBuildError {
    #[error("Damping must be >= 0")]
    InvalidDamping,
    #[error("Stiffness must be > 0")]
    InvalidStiffness,
}

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("Color must look like #RRGGBB, got '{0}'")]
    InvalidFormat(String),
    #[error("Invalid hex digits in '{0}'")]
    InvalidHex(String),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Line {0}: unrecognized command '{1}'")]
    UnrecognizedCommand(usize, String),
    #[error("Line {0}: invalid point '{1}', expected x,y")]
    InvalidPoint(usize, String),
    #[error("Line {0}: invalid number: {1}")]
    InvalidF64(usize, ParseFloatError),
    #[error("Line {0}: '{1}' needs at least {2} pointer(s)")]
    TooFewPointers(usize, &'static str, usize),
    #[error("Line {0}: pointer index {1} out of range for {2} pointer(s)")]
    PointerIndexOutOfRange(usize, usize, usize),
    #[error("Line {0}: time {1}ms goes backwards")]
    TimeWentBackwards(usize, f64),
    #[error("Frame interval must be a positive number of seconds, got {0}")]
    InvalidFrameInterval(f64),
}
