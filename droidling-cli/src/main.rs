use std::{fs, num::ParseFloatError, path::Path};

use clap::Parser;
use droidling::{
    script::Script, Color, Droid, DroidConfig, MeasureSpec, RecordingHost, StartDelay,
};
use kurbo::{Insets, Size};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Play a touch script against the figure, headless, and draw where it ends up
#[derive(Parser)]
struct Args {
    /// Touch script, one step per line, e.g. "16 move 160,150"
    #[arg(long)]
    #[clap(required(true))]
    script: String,

    /// Json config, e.g. {"widthUnit": 80, "limitToBounds": true, "color": "#A4C639"}
    #[arg(long)]
    config: Option<String>,

    /// Overrides the config
    #[arg(long)]
    width_unit: Option<f64>,

    /// Overrides the config
    #[arg(long)]
    limit_to_bounds: Option<bool>,

    /// Overrides the config, e.g. #3DDC84
    #[arg(long)]
    color: Option<Color>,

    /// View width; if unset, whatever the figure wants
    #[arg(long)]
    width: Option<f64>,

    /// View height; if unset, whatever the figure wants
    #[arg(long)]
    height: Option<f64>,

    /// One value for all sides or left,top,right,bottom
    #[arg(long)]
    #[clap(default_value = "0")]
    padding: String,

    /// Delay before the arm starts waving. If unset, random as on a real device.
    #[arg(long)]
    start_delay_ms: Option<u64>,

    #[arg(long)]
    #[clap(default_value_t = 16.0)]
    frame_ms: f64,

    /// Keep animating this long after the last step
    #[arg(long)]
    #[clap(default_value_t = 1000.0)]
    tail_ms: f64,

    #[arg(long)]
    #[clap(default_value = "droid.svg")]
    out_file: String,
}

#[derive(Debug, Error)]
pub enum PaddingError {
    #[error("Padding must be one value or four, left,top,right,bottom")]
    InvalidPadding,
    #[error("Unable to parse padding: {0}")]
    InvalidValue(ParseFloatError),
}

fn parse_padding(s: &str) -> Result<Insets, PaddingError> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(PaddingError::InvalidValue)?;
    match values.as_slice() {
        [all] => Ok(Insets::uniform(*all)),
        [left, top, right, bottom] => Ok(Insets::new(*left, *top, *right, *bottom)),
        _ => Err(PaddingError::InvalidPadding),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(file) => {
            let raw = fs::read_to_string(file)
                .unwrap_or_else(|e| panic!("Unable to read --config {file}: {e}"));
            serde_json::from_str::<DroidConfig>(&raw)
                .unwrap_or_else(|e| panic!("Unable to parse --config {file}: {e}"))
        }
        None => DroidConfig::default(),
    };
    if let Some(width_unit) = args.width_unit {
        config.width_unit = width_unit;
    }
    if let Some(limit) = args.limit_to_bounds {
        config.limit_to_bounds = limit;
    }
    if let Some(color) = args.color {
        config.color = color;
    }

    let script: Script = fs::read_to_string(Path::new(&args.script))
        .unwrap_or_else(|e| panic!("Unable to read --script {}: {e}", args.script))
        .parse()
        .unwrap_or_else(|e| panic!("Unable to parse --script {}: {e}", args.script));
    let padding =
        parse_padding(&args.padding).unwrap_or_else(|e| panic!("Bad --padding: {e}"));

    let mut droid = Droid::new(config);
    let spec = |size: Option<f64>| size.map(MeasureSpec::Exactly).unwrap_or(MeasureSpec::Unspecified);
    let size: Size = droid.measure(spec(args.width), spec(args.height), padding);
    eprintln!("size {size:?}");
    droid.layout(size, padding);

    let delay = args
        .start_delay_ms
        .map(StartDelay::from_millis)
        .unwrap_or_else(StartDelay::random);
    droid.attach(delay);

    let mut host = RecordingHost::default();
    let playback = script
        .play(
            &mut droid,
            &mut host,
            args.frame_ms / 1000.0,
            args.tail_ms / 1000.0,
        )
        .unwrap_or_else(|e| panic!("Unable to play --script {}: {e}", args.script));
    eprintln!(
        "{} frames, {} touch events handled, {} clicks",
        playback.frames, playback.handled, host.clicks
    );
    eprintln!(
        "translation {:?} rotation {:.2} limb {:.2}",
        droid.transform().translation,
        droid.transform().rotation(),
        droid.limb_angle()
    );

    let figure = droid.draw();
    fs::write(&args.out_file, figure.to_svg(size)).unwrap();
    eprintln!("Wrote {}", args.out_file);

    let state_file = Path::new(&args.out_file).with_extension("state.json");
    fs::write(
        &state_file,
        serde_json::to_string_pretty(&droid.save_state(None)).unwrap(),
    )
    .unwrap();
    eprintln!("Wrote {}", state_file.display());
    droid.detach();
}
