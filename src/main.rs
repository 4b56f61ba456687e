// src/main.rs
//
// Command-line driver: run one relaxation and write its frames to disk.
//
// Outputs are written to `runs/` (or the directory given via `out=`):
//
//   runs/<run_id>/
//     ├── config.json
//     ├── frames.csv            (one row per frame: mean spin, energy, norm error)
//     ├── field.png             (if `png` is set)
//     ├── frames/spin_*.png     (if `png` is set)
//     └── spin_evolution.mp4    (if `movie` is set)
//
// Examples:
//
//   cargo run --release -- field=curl fc=0.5 sc=-1 png movie
//   cargo run --release -- config=params.json seed=7 frames=60 per_frame=5
//
// Logging is controlled by RUST_LOG (default: info).

use std::env;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};

use spin_lattice_sim::config::{OutputConfig, RunConfig, RunInfo};
use spin_lattice_sim::coupled::SpinLatticeWithField;
use spin_lattice_sim::diagnostics::{max_abs_torque, total_energy, FrameStats};
use spin_lattice_sim::error::Result;
use spin_lattice_sim::field::FieldType;
use spin_lattice_sim::frames::FrameSequencer;
use spin_lattice_sim::params::SimParams;
use spin_lattice_sim::quiver::Quiver;
use spin_lattice_sim::visualisation::{make_movie_with_ffmpeg, save_quiver_plot};

fn print_usage() {
    let names: Vec<&str> = FieldType::ALL.iter().map(|t| t.as_str()).collect();
    eprintln!(
        r#"Usage:
  cargo run -- [field=NAME] [fc=VAL] [sc=VAL] [increment=VAL]
             [frames=N] [per_frame=N] [n=ROWS] [m=COLS] [seed=N]
             [config=FILE.json] [out=DIR] [run=RUN_ID] [fps=N]
             [par] [png] [movie]

Field names (use '-' or '_' for spaces): {}

Notes:
  - Frame 0 is the initial random lattice; each further frame follows
    per_frame integration steps of size `increment`.
  - Without seed=, a seed is drawn and recorded in config.json.
  - 'movie' implies 'png' and needs ffmpeg on PATH.
"#,
        names.join(", ")
    );
}

fn sanitize_run_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn default_run_id(params: &SimParams) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0));
    let ts = format!("{}{:03}", now.as_secs(), now.subsec_millis());
    format!(
        "{}_{}_fc{}_sc{}",
        ts, params.field_type, params.field_coefficient, params.spin_coefficient
    )
}

fn unique_run_dir(out_root: &str, run_id: &str) -> PathBuf {
    let base = PathBuf::from(out_root);
    let mut dir = base.join(run_id);
    if !dir.exists() {
        return dir;
    }
    for k in 1..1000 {
        let cand = base.join(format!("{}_{}", run_id, k));
        if !cand.exists() {
            dir = cand;
            break;
        }
    }
    dir
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, v: &str) -> Option<T> {
    match v.trim().parse::<T>() {
        Ok(x) => Some(x),
        Err(_) => {
            warn!("could not parse {key} value '{v}', ignoring");
            None
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = env::args().collect();

    // A config file, if given, is the base that the other arguments override.
    let mut params = SimParams::default();
    if let Some(path) = argv.iter().skip(1).find_map(|a| a.strip_prefix("config=")) {
        params = SimParams::from_json_file(Path::new(path))?;
        info!("loaded parameters from {path}");
    }

    let mut png = false;
    let mut movie = false;
    let mut fps: u32 = 8;
    let mut out_root_override: Option<String> = None;
    let mut run_id_override: Option<String> = None;

    for arg in argv.iter().skip(1) {
        if arg == "-h" || arg == "--help" || arg == "help" {
            print_usage();
            return Ok(());
        }
        if arg.starts_with("config=") {
            continue;
        }

        match arg.as_str() {
            "par" => {
                params.parallel = true;
                continue;
            }
            "png" => {
                png = true;
                continue;
            }
            "movie" => {
                movie = true;
                png = true;
                continue;
            }
            _ => {}
        }

        let Some((key, v)) = arg.split_once('=') else {
            warn!("ignoring unknown argument '{arg}'");
            continue;
        };

        match key {
            // An unknown field name is an input error, not something to guess around.
            "field" => params.field_type = v.parse()?,
            "fc" => {
                if let Some(x) = parse_or_warn(key, v) {
                    params.field_coefficient = x;
                }
            }
            "sc" => {
                if let Some(x) = parse_or_warn(key, v) {
                    params.spin_coefficient = x;
                }
            }
            "increment" | "dt" => {
                if let Some(x) = parse_or_warn(key, v) {
                    params.increment = x;
                }
            }
            "frames" => {
                if let Some(x) = parse_or_warn(key, v) {
                    params.n_frames = x;
                }
            }
            "per_frame" => {
                if let Some(x) = parse_or_warn(key, v) {
                    params.n_per_frame = x;
                }
            }
            "n" => {
                if let Some(x) = parse_or_warn(key, v) {
                    params.n = x;
                }
            }
            "m" => {
                if let Some(x) = parse_or_warn(key, v) {
                    params.m = x;
                }
            }
            "seed" => params.seed = parse_or_warn(key, v).or(params.seed),
            "fps" => {
                if let Some(x) = parse_or_warn::<u32>(key, v) {
                    fps = x.max(1);
                }
            }
            "out" => out_root_override = Some(v.to_string()),
            "run" => run_id_override = Some(v.to_string()),
            _ => warn!("ignoring unknown argument '{arg}'"),
        }
    }

    params.validate()?;
    let seed = *params.seed.get_or_insert_with(rand::random::<u64>);

    // -------- output directory setup --------
    let out_root = out_root_override.unwrap_or_else(|| "runs".to_string());
    create_dir_all(&out_root)?;

    let run_id = sanitize_run_id(&run_id_override.unwrap_or_else(|| default_run_id(&params)));
    let run_dir = unique_run_dir(&out_root, &run_id);
    create_dir_all(&run_dir)?;
    let frames_dir = run_dir.join("frames");
    if png {
        create_dir_all(&frames_dir)?;
    }

    let run_config = RunConfig {
        params: params.clone(),
        outputs: OutputConfig {
            frames_csv: true,
            frame_pngs: png,
            movie,
            fps,
        },
        run: RunInfo {
            binary: "spin-lattice-sim".to_string(),
            run_id: run_id.clone(),
            seed,
            total_steps: params.n_frames * params.n_per_frame,
        },
    };
    run_config.write_to_dir(&run_dir)?;

    let mut system = SpinLatticeWithField::from_params(&params)?;

    info!("--- spin-lattice run ---");
    info!("run_dir: {}", run_dir.to_string_lossy());
    info!(
        "grid: {}x{} over x={:?} y={:?}",
        params.n, params.m, params.x_range, params.y_range
    );
    info!(
        "field: '{}'  fc={}  sc={}",
        params.field_type, params.field_coefficient, params.spin_coefficient
    );
    info!(
        "stepping: increment={} frames={} per_frame={} seed={} parallel={}",
        params.increment, params.n_frames, params.n_per_frame, seed, params.parallel
    );

    if png {
        let title = format!("field: {}", params.field_type);
        save_quiver_plot(&system.field().quiver(), &run_dir.join("field.png"), &title)?;
    }

    let file = File::create(run_dir.join("frames.csv"))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", FrameStats::CSV_HEADER)?;

    // Keep frame ordering stable under glob
    let frame_pad: usize = 6;

    let field = system.field().clone();
    let (fc, sc) = (system.field_coefficient, system.spin_coefficient);
    for frame in FrameSequencer::new(
        &mut system,
        params.increment,
        params.n_frames,
        params.n_per_frame,
    ) {
        let stats = FrameStats::of(&frame, &field, fc, sc);
        writeln!(writer, "{}", stats.csv_row())?;

        if png {
            let path = frames_dir.join(format!("spin_{:0width$}.png", frame.index, width = frame_pad));
            let title = format!("step {}", frame.step);
            save_quiver_plot(&frame.quiver(), &path, &title)?;
        }
    }
    writer.flush()?;

    info!(
        "done: {} steps, energy={:.6e}, max|torque|={:.3e}",
        system.steps_taken(),
        total_energy(&system),
        max_abs_torque(&system)
    );

    if movie {
        let pattern = frames_dir.join("spin_*.png").to_string_lossy().to_string();
        make_movie_with_ffmpeg(&pattern, &run_dir.join("spin_evolution.mp4"), fps)?;
    }

    Ok(())
}
