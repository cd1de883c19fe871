// src/main.rs
mod gui;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use eframe::egui;
use log::{info, warn};

use wpms::analysis::plot::MAX_FIGURE_SIDE;
use wpms::analysis::{render_cycle_png, AnalysisError, CycleSession, PlotStyle, SAMPLE_PERIOD_MS};
use wpms::types::OffsetConfiguration;

#[derive(Parser, Debug)]
#[command(name = "wpms", version, about = "Pressure cycle viewer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the desktop window, optionally with a recording preloaded.
    View {
        file: Option<PathBuf>,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Render one cycle to a PNG figure and print its summary.
    Render {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        cycle: usize,
        /// Output path; defaults to `cycle_<n>.png` next to the working directory.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = 1200, value_parser = figure_side())]
        width: u32,
        #[arg(long, default_value_t = 800, value_parser = figure_side())]
        height: u32,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Print the summary of one cycle, or of every cycle.
    Summary {
        file: PathBuf,
        #[arg(long)]
        cycle: Option<usize>,
        /// Emit the full render data as JSON instead of text.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct AnalysisArgs {
    #[arg(long, default_value_t = OffsetConfiguration::default().global, value_parser = degrees())]
    global: u16,
    #[arg(long, default_value_t = OffsetConfiguration::default().ch1, value_parser = degrees())]
    ch1: u16,
    #[arg(long, default_value_t = OffsetConfiguration::default().ch2, value_parser = degrees())]
    ch2: u16,
    #[arg(long, default_value_t = OffsetConfiguration::default().ch3, value_parser = degrees())]
    ch3: u16,
    #[arg(long, default_value_t = OffsetConfiguration::default().ch4, value_parser = degrees())]
    ch4: u16,
    /// Milliseconds between two samples of the recording.
    #[arg(long, default_value_t = SAMPLE_PERIOD_MS)]
    sample_period_ms: f64,
}

impl Default for AnalysisArgs {
    fn default() -> Self {
        let offsets = OffsetConfiguration::default();
        Self {
            global: offsets.global,
            ch1: offsets.ch1,
            ch2: offsets.ch2,
            ch3: offsets.ch3,
            ch4: offsets.ch4,
            sample_period_ms: SAMPLE_PERIOD_MS,
        }
    }
}

impl AnalysisArgs {
    fn offsets(&self) -> OffsetConfiguration {
        OffsetConfiguration {
            global: self.global,
            ch1: self.ch1,
            ch2: self.ch2,
            ch3: self.ch3,
            ch4: self.ch4,
        }
    }

    fn open(&self, file: &Path) -> anyhow::Result<CycleSession> {
        if self.sample_period_ms.is_nan() || self.sample_period_ms <= 0.0 {
            return Err(anyhow!("--sample-period-ms must be positive"));
        }
        let session = CycleSession::open(file)
            .with_context(|| format!("failed to analyse {}", file.display()))?;
        Ok(session.with_sample_period_ms(self.sample_period_ms))
    }
}

fn degrees() -> clap::builder::RangedI64ValueParser<u16> {
    clap::value_parser!(u16).range(0..=i64::from(OffsetConfiguration::MAX_DEGREES))
}

fn figure_side() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(MAX_FIGURE_SIDE))
}

fn run_view(file: Option<PathBuf>, analysis: AnalysisArgs) -> anyhow::Result<()> {
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 860.0])
        .with_min_inner_size([960.0, 640.0])
        .with_drag_and_drop(true)
        .with_title("WPMS");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let offsets = analysis.offsets();
    eframe::run_native(
        "WPMS",
        options,
        Box::new(move |_cc| {
            Box::new(gui::WpmsApp::new(file, analysis.sample_period_ms, offsets))
        }),
    )
    .map_err(|e| anyhow!("desktop window failed: {e}"))
}

fn run_render(
    file: PathBuf,
    cycle: usize,
    out: Option<PathBuf>,
    style: PlotStyle,
    analysis: AnalysisArgs,
) -> anyhow::Result<()> {
    let session = analysis.open(&file)?;
    let data = session
        .render(cycle, &analysis.offsets())
        .with_context(|| format!("cannot render cycle {cycle}"))?;
    let png = render_cycle_png(&data, &style)?;
    let out = out.unwrap_or_else(|| PathBuf::from(format!("cycle_{}.png", data.cycle_number + 1)));
    fs::write(&out, png).with_context(|| format!("cannot write {}", out.display()))?;
    info!("wrote {}", out.display());
    println!("{}: {}", data.title(), data.summary());
    Ok(())
}

fn run_summary(
    file: PathBuf,
    cycle: Option<usize>,
    json: bool,
    analysis: AnalysisArgs,
) -> anyhow::Result<()> {
    let session = analysis.open(&file)?;
    let offsets = analysis.offsets();
    let cycles: Vec<usize> = match cycle {
        Some(c) => vec![c],
        None => (0..session.cycle_count()).collect(),
    };
    let mut rendered = Vec::with_capacity(cycles.len());
    for c in cycles {
        match session.render(c, &offsets) {
            Ok(data) => rendered.push(data),
            // Degenerate windows are skipped when listing everything.
            Err(e @ AnalysisError::DegenerateCycle { .. }) if cycle.is_none() => {
                warn!("{e}");
            }
            Err(e) => return Err(e).with_context(|| format!("cannot render cycle {c}")),
        }
    }
    if json {
        let text = match (cycle, rendered.as_slice()) {
            (Some(_), [only]) => serde_json::to_string_pretty(only)?,
            _ => serde_json::to_string_pretty(&rendered)?,
        };
        println!("{text}");
    } else {
        for data in &rendered {
            println!("{}: {}", data.title(), data.summary());
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        None => run_view(None, AnalysisArgs::default()),
        Some(Command::View { file, analysis }) => run_view(file, analysis),
        Some(Command::Render {
            file,
            cycle,
            out,
            width,
            height,
            analysis,
        }) => {
            let style = PlotStyle {
                width,
                height,
                ..PlotStyle::default()
            };
            run_render(file, cycle, out, style, analysis)
        }
        Some(Command::Summary {
            file,
            cycle,
            json,
            analysis,
        }) => run_summary(file, cycle, json, analysis),
    }
}
