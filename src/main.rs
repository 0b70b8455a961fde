//! Beamstone entry point
//!
//! Builds a board on the headless scene and drives it for a number of ticks.

use std::path::PathBuf;
use std::process::ExitCode;

use beamstone::level::{self, LevelDesc};
use beamstone::renderer::HeadlessScene;
use beamstone::settings::Settings;
use beamstone::sim::{Board, tick};

const USAGE: &str =
    "usage: beamstone [LEVEL.json] [--level N] [--ticks N] [--dt MS] [--settings FILE] [--spin]";

#[derive(Debug)]
struct Args {
    level_file: Option<PathBuf>,
    level: usize,
    ticks: u32,
    dt_ms: f32,
    settings: Option<PathBuf>,
    spin: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            level_file: None,
            level: 1,
            ticks: 60,
            dt_ms: 1000.0 / 60.0,
            settings: None,
            spin: false,
        }
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().ok_or_else(|| format!("{} needs a value", name));
        match arg.as_str() {
            "--level" => {
                args.level = value("--level")?
                    .parse()
                    .map_err(|e| format!("--level: {}", e))?;
            }
            "--ticks" => {
                args.ticks = value("--ticks")?
                    .parse()
                    .map_err(|e| format!("--ticks: {}", e))?;
            }
            "--dt" => {
                args.dt_ms = value("--dt")?
                    .parse()
                    .map_err(|e| format!("--dt: {}", e))?;
            }
            "--settings" => args.settings = Some(PathBuf::from(value("--settings")?)),
            "--spin" => args.spin = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag {}\n{}", flag, USAGE));
            }
            path => args.level_file = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

/// Level file if given and readable, otherwise the selected built-in level
fn load_level(args: &Args) -> Result<LevelDesc, String> {
    if let Some(path) = &args.level_file {
        match LevelDesc::load(path) {
            Ok(level) => return Ok(level),
            Err(e) => log::warn!(
                "Falling back to built-in level {} ({}): {}",
                args.level,
                path.display(),
                e
            ),
        }
    }
    level::builtin(args.level).ok_or_else(|| {
        format!(
            "no built-in level {} (1..={})",
            args.level,
            level::builtin_levels().len()
        )
    })
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };
    let level = match load_level(&args) {
        Ok(level) => level,
        Err(msg) => {
            log::error!("{}", msg);
            return ExitCode::FAILURE;
        }
    };
    let settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();

    let mut scene = HeadlessScene::new();
    let mut board = Board::from_level(&level, settings, &mut scene);
    log::info!(
        "Beamstone: {}x{} board, {} gems, {} mirrors, {} emitters",
        board.rows(),
        board.cols(),
        board.gem_count(),
        board.mirrors().len(),
        board.emitters().len()
    );

    if args.spin {
        for id in board.mirrors().to_vec() {
            board.toggle_mirror_rotation(id);
        }
    }

    let mut total_removed = 0;
    for frame in 0..args.ticks {
        let report = tick(&mut board, &mut scene, args.dt_ms);
        for pos in &report.removed {
            log::info!("Tick {}: gem at ({}, {}) destroyed", frame, pos.row, pos.col);
        }
        total_removed += report.removed.len();
        if board.gem_count() == 0 {
            log::info!("Board cleared after {} ticks", frame + 1);
            break;
        }
    }

    log::info!(
        "Removed {} gems, {} remaining",
        total_removed,
        board.gem_count()
    );
    ExitCode::SUCCESS
}
