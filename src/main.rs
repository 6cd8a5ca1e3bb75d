use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use meshtracer::config::RenderConfig;
use meshtracer::export::{save_canvas, write_ppm};
use meshtracer::scenes::{cornell::Cornell, Scene};
use meshtracer::session::{RenderMode, Session};
use meshtracer::{Error, Result};

const USAGE: &str = "usage:
  meshtracer raytrace <scene-file|-> <out-image|-> [--config <toml>]
  meshtracer pathtrace <scene-file|-> <out-image|-> <passes> [--config <toml>]

`-` as scene renders the built-in Cornell box; `-` as output writes PPM to stdout.";

#[derive(Debug, PartialEq)]
struct Command {
    mode: RenderMode,
    scene: Option<PathBuf>,
    output: Option<PathBuf>,
    passes: u32,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut positional: Vec<&str> = Vec::new();
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| Error::InvalidArgument("--config needs a path".to_string()))?;
                config = Some(PathBuf::from(path));
            }
            _ => positional.push(arg),
        }
    }

    let optional_path = |arg: &str| (arg != "-").then(|| PathBuf::from(arg));
    match positional[..] {
        ["raytrace", scene, output] => Ok(Command {
            mode: RenderMode::RayTrace,
            scene: optional_path(scene),
            output: optional_path(output),
            passes: 1,
            config,
        }),
        ["pathtrace", scene, output, passes] => {
            let passes = passes
                .parse::<u32>()
                .ok()
                .filter(|&p| p > 0)
                .ok_or_else(|| Error::InvalidArgument(format!("bad pass count '{}'", passes)))?;
            Ok(Command {
                mode: RenderMode::PathTrace,
                scene: optional_path(scene),
                output: optional_path(output),
                passes,
                config,
            })
        }
        _ => Err(Error::InvalidArgument(USAGE.to_string())),
    }
}

fn build_session(scene: Option<&Path>, config: RenderConfig) -> Result<Session> {
    match scene {
        Some(path) => {
            let mut session = Session::new(config);
            session.load_scene_file(path)?;
            Ok(session)
        }
        None => {
            log::info!("Building Cornell box...");
            Ok(Session::with_scene(
                Cornell::build_model(),
                Cornell::build_light(),
                Cornell::build_camera(),
                config,
            ))
        }
    }
}

fn run(command: Command) -> Result<()> {
    let config = match &command.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };

    let now = Instant::now();
    let mut session = build_session(command.scene.as_deref(), config)?;
    log::info!("Scene ready in {:?}", now.elapsed());

    session.set_render_mode(command.mode);
    log::info!(
        "Rendering {}x{}, {} pass(es)...",
        session.canvas().width(),
        session.canvas().height(),
        command.passes
    );
    let now = Instant::now();
    let progress = ProgressBar::new(command.passes as u64);
    progress.set_style(
        ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} passes")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    for _ in 0..command.passes {
        session.render_frame();
        progress.inc(1);
    }
    progress.finish_and_clear();
    log::info!("Done. Render time: {:?}", now.elapsed());

    match &command.output {
        Some(path) => save_canvas(session.canvas(), path),
        None => write_ppm(session.canvas(), &mut io::stdout().lock()).map_err(|e| Error::io("<stdout>", e)),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = parse_args(&args).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
