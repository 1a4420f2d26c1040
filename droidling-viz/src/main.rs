//! Writes an svg to help visualize motion: the arm's wave cycle and translation settling home

use std::fs;

use clap::Parser;
use droidling::{
    limb::{LimbAnimator, StartDelay},
    settle::SpringSettler,
    transform::BoundsPolicy,
    Color,
};
use kurbo::{Insets, Point, Size, Vec2};
use ordered_float::OrderedFloat;

#[derive(Parser)]
struct Args {
    /// Translation, px, the settle plots start from
    #[arg(long)]
    #[clap(default_value_t = 50.0)]
    from: f64,

    #[arg(long)]
    #[clap(default_value_t = 150)]
    start_delay_ms: u64,

    /// Clamp settles to a 300x300 view, as limitToBounds would
    #[arg(long)]
    limit_to_bounds: bool,

    #[arg(long)]
    #[clap(default_value = "/tmp/motion.svg")]
    out_file: String,
}

const PALETTE: &[Color] = &[
    Color::rgb(0xEF, 0x53, 0x50),
    Color::rgb(0xAB, 0x47, 0xBC),
    Color::rgb(0x5C, 0x6B, 0xC0),
    Color::rgb(0x29, 0xB6, 0xF6),
    Color::rgb(0x26, 0xA6, 0x9A),
    Color::DEFAULT,
];

struct Series {
    name: String,
    /// (frame, value)
    points: Vec<Point>,
}

fn limb_series(delay: StartDelay, frame_rate: f64) -> Series {
    let mut animator = LimbAnimator::new(delay);
    let mut points = Vec::new();
    // Two full runs, to show the restart
    let frames = (2.0 * limb_cycle_secs(delay) * frame_rate) as usize;
    for frame in 0..=frames {
        let Some(angle) = animator.tick(frame as f64 / frame_rate) else {
            break;
        };
        points.push(Point::new(frame as f64, angle));
    }
    Series {
        name: format!("limb, {}ms delay", delay.duration().as_millis()),
        points,
    }
}

fn limb_cycle_secs(delay: StartDelay) -> f64 {
    droidling::limb::cycle_duration(delay).as_secs_f64()
}

fn settle_series(from: f64, velocity: f64, policy: &BoundsPolicy, frame_rate: f64) -> Series {
    let mut settler = SpringSettler::default();
    let mut translation = Vec2::new(from, 0.0);
    settler.start(translation, Vec2::new(velocity, 0.0), policy.bounds());

    // 60fps, run until complete or 5s
    let mut points = Vec::new();
    for frame in 0..300 {
        let tick = settler.tick(frame as f64 / frame_rate);
        if tick.is_empty() {
            break;
        }
        tick.apply(&mut translation);
        points.push(Point::new(frame as f64, translation.x));
    }
    assert!(
        points.len() < 300,
        "Should settle within 300 frames\n{points:#?}"
    );
    Series {
        name: format!("settle from {from}px at {velocity}px/s"),
        points,
    }
}

fn plot(series: &[Series]) -> String {
    let all = || series.iter().flat_map(|s| s.points.iter());
    let x_min = all().map(|p| OrderedFloat(p.x)).min().unwrap_or_default().0;
    let x_max = all().map(|p| OrderedFloat(p.x)).max().unwrap_or_default().0;
    let y_min = all().map(|p| OrderedFloat(p.y)).min().unwrap_or_default().0;
    let y_max = all().map(|p| OrderedFloat(p.y)).max().unwrap_or_default().0;

    let x_span = (x_max - x_min).max(1.0);
    let y_span = (y_max - y_min).max(1.0);
    let x_margin = 0.1 * x_span;
    let y_margin = 0.1 * y_span;

    let mut svg = String::new();
    svg.push_str(&format!("<svg viewBox=\"{:.2} {:.2} {:.2} {:.2}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\" >\n",
        x_min - x_margin,
        y_min - y_margin,
        x_span + 2.0 * x_margin,
        y_span + 2.0 * y_margin));
    svg.push_str(&format!(
        "  <line x1=\"{:.2}\" y1=\"0\" x2=\"{:.2}\" y2=\"0\" stroke=\"#999\" stroke-width=\"0.3\" />\n",
        x_min, x_max
    ));

    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        svg.push_str(&format!("\n  <!-- {} -->\n", s.name));
        let Some(first) = s.points.first() else {
            continue;
        };
        svg.push_str(&format!(
            "  <path fill=\"none\" stroke=\"{color}\" stroke-width=\"0.5\" d=\"M{:.2},{:.2}",
            first.x, first.y
        ));
        for p in s.points.iter().skip(1) {
            svg.push_str(&format!(" L{:.2},{:.2}", p.x, p.y));
        }
        svg.push_str("\" />\n");
        svg.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"4\" fill=\"{color}\">{}</text>\n",
            x_min + x_span / 2.0,
            y_min + 6.0 * (i + 1) as f64,
            s.name
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

pub fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let frame_rate = 60.0;
    let policy = BoundsPolicy {
        limit_enabled: args.limit_to_bounds,
        width_unit: 100.0,
        size: Size::new(300.0, 300.0),
        padding: Insets::ZERO,
    };

    let mut series = vec![limb_series(
        StartDelay::from_millis(args.start_delay_ms),
        frame_rate,
    )];
    for velocity in [0.0, 1000.0, -1000.0, 4000.0] {
        series.push(settle_series(args.from, velocity, &policy, frame_rate));
    }

    fs::write(&args.out_file, plot(&series)).expect("write");
    println!("Wrote {}", args.out_file);
}
