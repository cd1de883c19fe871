use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::error::AnalysisError;
use crate::analysis::render::{
    CycleRenderData, PlotSeries, FULL_CYCLE_X_LIMITS, HALF_CYCLE_X_LIMITS,
};

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    /// Half-height added around a flat value range.
    pub flat_range_padding: f64,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            background: WHITE,
            foreground: BLACK,
            flat_range_padding: 1.0,
        }
    }
}

fn series_color(series: &PlotSeries) -> RGBColor {
    let [r, g, b] = series.color;
    RGBColor(r, g, b)
}

/// Full cycle, half-cycle overlay and summary line, stacked 1 : 1 : 0.3.
pub fn render_cycle_png(data: &CycleRenderData, style: &PlotStyle) -> Result<Vec<u8>, AnalysisError> {
    if data.full_cycle.is_empty() {
        return Err(AnalysisError::Plot("cycle has no channel series".into()));
    }
    let mut buffer = vec![0u8; rgb_buffer_len(style)?];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panel = (style.height as f64 / 2.3) as u32;
        let (full_area, rest) = root.split_vertically(panel);
        let (half_area, text_area) = rest.split_vertically(panel);
        draw_full_cycle(&full_area, data, style)?;
        draw_half_cycle(&half_area, data, style)?;
        draw_summary(&text_area, data, style)?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn draw_full_cycle(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    data: &CycleRenderData,
    style: &PlotStyle,
) -> Result<(), AnalysisError> {
    let (y_min, y_max) = data.value_range.plot_bounds(style.flat_range_padding);
    let (x_min, x_max) = FULL_CYCLE_X_LIMITS;
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(data.title(), ("sans-serif", 20).into_font().color(&style.foreground))
        .set_label_area_size(LabelAreaPosition::Left, 55)
        .set_label_area_size(LabelAreaPosition::Bottom, 30)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .y_desc("Pressure")
        .light_line_style(&style.foreground.mix(0.05))
        .draw()?;
    for series in &data.full_cycle {
        let color = series_color(series);
        let points = series.points.iter().map(|p| (p[0], p[1]));
        chart
            .draw_series(LineSeries::new(points, &color))?
            .label(series.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    chart
        .configure_series_labels()
        .border_style(&style.foreground.mix(0.3))
        .background_style(&style.background.mix(0.8))
        .draw()?;
    Ok(())
}

fn draw_half_cycle(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    data: &CycleRenderData,
    style: &PlotStyle,
) -> Result<(), AnalysisError> {
    let (y_min, y_max) = data.value_range.plot_bounds(style.flat_range_padding);
    let (x_min, x_max) = HALF_CYCLE_X_LIMITS;
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 55)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Angle 0°→180°")
        .y_desc("Pressure")
        .light_line_style(&style.foreground.mix(0.05))
        .draw()?;
    for half in &data.half_cycle {
        let color = series_color(&half.compression);
        let compression = half.compression.points.iter().map(|p| (p[0], p[1]));
        chart.draw_series(LineSeries::new(compression, &color))?;
        let decompression = half.decompression.points.iter().map(|p| (p[0], p[1]));
        chart.draw_series(DashedLineSeries::new(
            decompression,
            6,
            4,
            color.stroke_width(1),
        ))?;
    }
    Ok(())
}

fn draw_summary(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    data: &CycleRenderData,
    style: &PlotStyle,
) -> Result<(), AnalysisError> {
    let (w, h) = area.dim_in_pixel();
    let text_style = ("sans-serif", 18)
        .into_font()
        .color(&style.foreground)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw_text(&data.summary(), &text_style, (w as i32 / 2, h as i32 / 2))?;
    Ok(())
}

/// Largest figure side accepted, in pixels.
pub const MAX_FIGURE_SIDE: u32 = 16_384;

fn rgb_buffer_len(style: &PlotStyle) -> Result<usize, AnalysisError> {
    let too_large = || {
        AnalysisError::Plot(format!(
            "figure {}x{} outside 1..={MAX_FIGURE_SIDE} pixels per side",
            style.width, style.height
        ))
    };
    let sides = 1..=MAX_FIGURE_SIDE;
    if !sides.contains(&style.width) || !sides.contains(&style.height) {
        return Err(too_large());
    }
    (style.width as usize)
        .checked_mul(style.height as usize)
        .and_then(|px| px.checked_mul(3))
        .ok_or_else(too_large)
}

fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, AnalysisError> {
    let mut png = Vec::with_capacity(rgb.len() / 4);
    PngEncoder::new(&mut png)
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| AnalysisError::Plot(format!("png encoding: {e}")))?;
    Ok(png)
}
