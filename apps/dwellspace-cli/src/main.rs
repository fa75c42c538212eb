mod demo;
mod script;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dwellspace_render::{DebugTextRenderer, RenderView, Renderer};
use dwellspace_runtime::{Runtime, RuntimeConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dwellspace-cli", about = "Headless gaze dwell-to-select host")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective configuration as YAML
    Config,
    /// Run the demo room with a scripted gaze
    Run {
        /// Gaze script: comma-separated panel:frames, "none" looks away
        #[arg(short, long, default_value = "red:150,none:10,blue:150")]
        script: String,
        /// Display refresh rate
        #[arg(long, default_value = "60")]
        fps: u32,
        /// End the VR session at this frame
        #[arg(long)]
        end_session_at: Option<u64>,
        /// Print the final scene
        #[arg(long)]
        dump: bool,
        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct Completion {
    frame: u64,
    panel: String,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    frames: u64,
    seconds: f64,
    dwell_ticks: usize,
    dropped_ticks: u64,
    physics_steps: u64,
    completions: Vec<Completion>,
    session_active: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("dwellspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", dwellspace_scene::crate_info());
            println!("physics: {}", dwellspace_physics::crate_info());
            println!("interaction: {}", dwellspace_interaction::crate_info());
            println!("runtime: {}", dwellspace_runtime::crate_info());
            println!("render: {}", dwellspace_render::crate_info());
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Run {
            script,
            fps,
            end_session_at,
            dump,
            json,
        } => {
            if fps == 0 {
                anyhow::bail!("--fps must be at least 1");
            }
            let segments = script::parse(&script)?;
            let summary = run(config, &segments, fps, end_session_at, dump && !json)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Ran {} frames ({:.2}s): {} dwell ticks, {} physics steps",
                    summary.frames, summary.seconds, summary.dwell_ticks, summary.physics_steps
                );
                if summary.completions.is_empty() {
                    println!("No selections");
                }
                for c in &summary.completions {
                    println!("  frame {:>5}: selected {}", c.frame, c.panel);
                }
            }
        }
    }

    Ok(())
}

fn run(
    config: RuntimeConfig,
    segments: &[script::GazeSegment],
    fps: u32,
    end_session_at: Option<u64>,
    dump: bool,
) -> anyhow::Result<RunSummary> {
    let frame_dt = Duration::from_secs_f64(1.0 / fps as f64);
    let mut runtime = Runtime::new(config)?;
    let demo = demo::build(&mut runtime)?;
    runtime.session_started();
    runtime.mount();

    let mut summary = RunSummary {
        frames: 0,
        seconds: 0.0,
        dwell_ticks: 0,
        dropped_ticks: 0,
        physics_steps: 0,
        completions: Vec::new(),
        session_active: true,
    };

    for target in script::frames(segments) {
        if end_session_at == Some(summary.frames) {
            runtime.session_ended();
        }
        demo.aim(&mut runtime, target)?;
        let report = runtime.pump(frame_dt)?;
        summary.frames = report.frame;
        summary.dwell_ticks += report.dwell.len();
        summary.physics_steps += u64::from(report.physics.steps);
        for target in report.completions() {
            let panel = demo.panel_name(target).unwrap_or("?").to_string();
            summary.completions.push(Completion {
                frame: report.frame,
                panel,
            });
        }
    }
    runtime.teardown();

    summary.seconds = runtime.clock().now().as_secs_f64();
    summary.dropped_ticks = runtime.clock().dropped_ticks();
    summary.session_active = runtime.session_state().is_active();
    tracing::debug!(selections = ?demo.selections.borrow(), "run finished");

    if dump {
        let view = RenderView::from_camera(runtime.camera());
        print!("{}", DebugTextRenderer::new().render(runtime.scene(), &view));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(summary: &RunSummary) -> Vec<&str> {
        summary.completions.iter().map(|c| c.panel.as_str()).collect()
    }

    #[test]
    fn default_script_selects_red_then_blue() {
        let segments = script::parse("red:150,none:10,blue:150").unwrap();
        let summary = run(RuntimeConfig::default(), &segments, 60, None, false).unwrap();
        assert_eq!(summary.frames, 310);
        assert_eq!(names(&summary), vec!["red", "blue"]);
        assert!(summary.physics_steps > 0);
        assert!(summary.session_active);
    }

    #[test]
    fn short_glances_select_nothing() {
        let segments = script::parse("red:60,green:60,blue:60").unwrap();
        let summary = run(RuntimeConfig::default(), &segments, 60, None, false).unwrap();
        assert!(summary.completions.is_empty());
    }

    #[test]
    fn ended_session_selects_nothing() {
        let segments = script::parse("red:300").unwrap();
        let summary = run(RuntimeConfig::default(), &segments, 60, Some(0), false).unwrap();
        assert!(summary.completions.is_empty());
        assert!(!summary.session_active);
        assert!(summary.dwell_ticks > 0);
    }

    #[test]
    fn summary_serializes_to_json() {
        let segments = script::parse("green:130").unwrap();
        let summary = run(RuntimeConfig::default(), &segments, 60, None, false).unwrap();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["completions"][0]["panel"], "green");
        assert_eq!(value["frames"], 130);
    }
}
