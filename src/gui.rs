// src/gui.rs
use std::path::PathBuf;

use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints};
use log::{error, warn};

use wpms::analysis::render::{FULL_CYCLE_X_LIMITS, HALF_CYCLE_X_LIMITS};
use wpms::analysis::{AnalysisError, CycleRenderData, CycleSession, PlotSeries};
use wpms::types::{OffsetConfiguration, TRACKED_CHANNELS};

const LOG_LINES: usize = 8;
const FLAT_RANGE_PADDING: f64 = 1.0;

/// Cached result of the last recompute, keyed by what produced it.
struct RenderedCycle {
    cycle: usize,
    offsets: OffsetConfiguration,
    result: Result<CycleRenderData, String>,
}

pub struct WpmsApp {
    session: Option<CycleSession>,
    path_input: String,
    sample_period_ms: f64,
    offsets: OffsetConfiguration,
    cycle: usize,
    rendered: Option<RenderedCycle>,
    log_messages: Vec<String>,
}

impl WpmsApp {
    pub fn new(initial: Option<PathBuf>, sample_period_ms: f64, offsets: OffsetConfiguration) -> Self {
        let mut app = Self {
            session: None,
            path_input: String::new(),
            sample_period_ms,
            offsets,
            cycle: 0,
            rendered: None,
            log_messages: vec!["WPMS ready. Load or drop a CSV recording.".to_owned()],
        };
        if let Some(path) = initial {
            app.path_input = path.display().to_string();
            app.load(path);
        }
        app
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    /// The current session survives a failed load.
    fn load(&mut self, path: PathBuf) {
        match CycleSession::open(&path) {
            Ok(session) => {
                let session = session.with_sample_period_ms(self.sample_period_ms);
                self.log(&format!(
                    "Loaded {} ({} cycles)",
                    session.source(),
                    session.cycle_count()
                ));
                self.session = Some(session);
                self.cycle = 0;
                self.rendered = None;
            }
            Err(AnalysisError::InsufficientCycles { .. }) => {
                warn!("no cycles in {}", path.display());
                self.log("No cycle detected in this file.");
            }
            Err(e) => {
                error!("load failed: {e}");
                self.log(&format!("Load error: {e}"));
            }
        }
    }

    fn current_render(&mut self) -> Option<&RenderedCycle> {
        let session = self.session.as_ref()?;
        let stale = match &self.rendered {
            Some(r) => r.cycle != self.cycle || r.offsets != self.offsets,
            None => true,
        };
        if stale {
            let result = session.render(self.cycle, &self.offsets);
            if let Err(AnalysisError::DegenerateCycle { .. }) = &result {
                warn!("skipping degenerate cycle {}", self.cycle);
            }
            self.rendered = Some(RenderedCycle {
                cycle: self.cycle,
                offsets: self.offsets,
                result: result.map_err(|e| e.to_string()),
            });
        }
        self.rendered.as_ref()
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.heading("WPMS");
        ui.label("Pressure cycle viewer");
        ui.separator();

        ui.label("RECORDING");
        ui.text_edit_singleline(&mut self.path_input);
        if ui.button("📂 LOAD").clicked() && !self.path_input.trim().is_empty() {
            let path = PathBuf::from(self.path_input.trim());
            self.load(path);
        }

        ui.add_space(15.0);
        ui.label("OFFSETS");
        ui.add(
            egui::Slider::new(&mut self.offsets.global, 0..=OffsetConfiguration::MAX_DEGREES)
                .text("Global")
                .suffix("°"),
        );
        for channel in TRACKED_CHANNELS {
            if let Some(degrees) = self.offsets.channel_mut(channel) {
                ui.add(
                    egui::Slider::new(degrees, 0..=OffsetConfiguration::MAX_DEGREES)
                        .text(channel.label())
                        .suffix("°"),
                );
            }
        }
        if ui.button("↺ RESET OFFSETS").clicked() {
            self.offsets = OffsetConfiguration::default();
        }

        ui.add_space(15.0);
        ui.label("NAVIGATION");
        if let Some(session) = &self.session {
            let last = session.last_cycle();
            ui.horizontal(|ui| {
                ui.label("Cycle number");
                ui.add(egui::DragValue::new(&mut self.cycle).clamp_range(0..=last));
                if ui.small_button("◀").clicked() {
                    self.cycle = self.cycle.saturating_sub(1);
                }
                if ui.small_button("▶").clicked() && self.cycle < last {
                    self.cycle += 1;
                }
            });
            self.cycle = self.cycle.min(last);
        } else {
            ui.label(RichText::new("No recording loaded").color(Color32::YELLOW).small());
        }

        ui.add_space(10.0);
        ui.separator();
        egui::ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
            for m in &self.log_messages {
                ui.monospace(m);
            }
        });
    }
}

fn to_color(series: &PlotSeries) -> Color32 {
    let [r, g, b] = series.color;
    Color32::from_rgb(r, g, b)
}

fn series_line(series: &PlotSeries) -> Line {
    Line::new(PlotPoints::new(series.points.clone()))
        .name(&series.label)
        .color(to_color(series))
}

fn draw_cycle(ui: &mut egui::Ui, data: &CycleRenderData) {
    let (y_min, y_max) = data.value_range.plot_bounds(FLAT_RANGE_PADDING);
    let plot_height = (ui.available_height() - 40.0).max(200.0) / 2.0;

    ui.heading(data.title());
    Plot::new("full_cycle")
        .height(plot_height)
        .legend(Legend::default())
        .include_x(FULL_CYCLE_X_LIMITS.0)
        .include_x(FULL_CYCLE_X_LIMITS.1)
        .include_y(y_min)
        .include_y(y_max)
        .y_axis_label("Pressure")
        .show(ui, |plot_ui| {
            for series in &data.full_cycle {
                plot_ui.line(series_line(series));
            }
        });

    Plot::new("half_cycle")
        .height(plot_height)
        .include_x(HALF_CYCLE_X_LIMITS.0)
        .include_x(HALF_CYCLE_X_LIMITS.1)
        .include_y(y_min)
        .include_y(y_max)
        .x_axis_label("Angle 0°→180°")
        .y_axis_label("Pressure")
        .show(ui, |plot_ui| {
            for half in &data.half_cycle {
                plot_ui.line(series_line(&half.compression));
                plot_ui.line(series_line(&half.decompression).style(LineStyle::dashed_loose()));
            }
        });

    ui.label(RichText::new(data.summary()).strong());
}

impl eframe::App for WpmsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().next() {
            self.path_input = path.display().to_string();
            self.load(path);
        }

        egui::SidePanel::left("controls").min_width(280.0).show(ctx, |ui| {
            self.side_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            match self.current_render() {
                None => {
                    ui.label("👉 Load a CSV recording to begin.");
                }
                Some(RenderedCycle { result: Ok(data), .. }) => draw_cycle(ui, data),
                Some(RenderedCycle { cycle, result: Err(msg), .. }) => {
                    ui.heading(format!("Cycle {}", cycle + 1));
                    ui.label(RichText::new(msg).color(Color32::YELLOW));
                }
            }
        });
    }
}
