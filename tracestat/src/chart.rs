//! Chart descriptions and their rendering to image files.
//!
//! A [`Figure`] is plain data: one or more side-by-side [`Panel`]s, each
//! holding [`Series`] and horizontal reference lines, plus an optional
//! text box. Turning a figure into pixels is the job of a [`Render`]
//! implementation; [`BitmapRenderer`] draws PNGs with the [`plotters`]
//! bitmap backend.

use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),
}

type Result<T> = core::result::Result<T, PlotError>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const PURPLE: Rgb = Rgb(128, 0, 128);

    fn to_plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scale {
    Linear,
    Log,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Series {
    /// Connected points, optionally marked with dots.
    Line {
        points: Vec<(f64, f64)>,
        color: Rgb,
        alpha: f64,
        markers: bool,
        label: Option<String>,
    },
    Scatter {
        points: Vec<(f64, f64)>,
        color: Rgb,
        alpha: f64,
        label: Option<String>,
    },
    /// `(left, right, height)` bars rising from zero, outlined in black.
    Bars {
        bars: Vec<(f64, f64, f64)>,
        fill: Rgb,
        alpha: f64,
    },
}

/// A dashed horizontal line across the whole panel.
#[derive(Clone, Debug, PartialEq)]
pub struct HLine {
    pub y: f64,
    pub color: Rgb,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: Scale,
    pub grid: bool,
    pub series: Vec<Series>,
    pub hlines: Vec<HLine>,
}

impl Panel {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            x_scale: Scale::Linear,
            grid: false,
            series: Vec::new(),
            hlines: Vec::new(),
        }
    }

    /// Axis ranges fitting every drawable point and reference line.
    ///
    /// Linear axes get 5% padding on both sides. A log axis only considers
    /// positive x and spans at least one decade.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for series in &self.series {
            match series {
                Series::Line { points, .. } | Series::Scatter { points, .. } => {
                    for &(x, y) in drawable(points, self.x_scale).iter() {
                        xs.push(x);
                        ys.push(y);
                    }
                }
                Series::Bars { bars, .. } => {
                    for &(l, r, h) in bars {
                        xs.push(l);
                        xs.push(r);
                        ys.push(0.0);
                        ys.push(h);
                    }
                }
            }
        }
        ys.extend(self.hlines.iter().map(|h| h.y));

        let x = match self.x_scale {
            Scale::Linear => pad(extent(&xs)),
            Scale::Log => {
                let (lo, hi) = extent(&xs).unwrap_or((1.0, 10.0));
                let lo = lo.max(f64::MIN_POSITIVE);
                if hi <= lo * 10.0 {
                    (lo, lo * 10.0)
                } else {
                    (lo, hi)
                }
            }
        };
        (x, pad(extent(&ys)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub size: (u32, u32),
    pub panels: Vec<Panel>,
    /// Lines of a boxed note in the bottom-left corner.
    pub annotation: Vec<String>,
}

/// The capability to render a figure to an image file.
pub trait Render {
    fn render(&self, figure: &Figure, path: &Path) -> Result<()>;
}

/// Draws PNG (or any format the bitmap encoder infers from the extension)
/// files with the system's sans-serif font.
pub struct BitmapRenderer;

/// Approximate glyph width of the 16px annotation font.
const ANNOTATION_GLYPH: i32 = 10;
const ANNOTATION_LINE: i32 = 20;
const ANNOTATION_PAD: i32 = 8;

impl Render for BitmapRenderer {
    fn render(&self, figure: &Figure, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, figure.size).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        let footer = if figure.annotation.is_empty() {
            0
        } else {
            ANNOTATION_LINE * figure.annotation.len() as i32 + 3 * ANNOTATION_PAD
        };
        let body = root.margin(0, footer, 0, 0);
        let areas = body.split_evenly((1, figure.panels.len().max(1)));
        for (area, panel) in areas.iter().zip(figure.panels.iter()) {
            draw_panel(area, panel)?;
        }
        if !figure.annotation.is_empty() {
            draw_annotation(&root, &figure.annotation, figure.size.1 as i32)?;
        }

        root.present()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        Ok(())
    }
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<()> {
    let ((x0, x1), (y0, y1)) = panel.bounds();
    let mut builder = ChartBuilder::on(area);
    builder
        .caption(&panel.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70);

    match panel.x_scale {
        Scale::Linear => {
            let chart = builder
                .build_cartesian_2d(x0..x1, y0..y1)
                .map_err(|e| PlotError::ChartConfig(e.to_string()))?;
            draw_chart(chart, panel, (x0, x1))
        }
        Scale::Log => {
            let chart = builder
                .build_cartesian_2d((x0..x1).log_scale(), y0..y1)
                .map_err(|e| PlotError::ChartConfig(e.to_string()))?;
            draw_chart(chart, panel, (x0, x1))
        }
    }
}

fn draw_chart<'a, DB, X>(
    mut chart: ChartContext<'a, DB, Cartesian2d<X, RangedCoordf64>>,
    panel: &Panel,
    (x0, x1): (f64, f64),
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    X: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .label_style(("sans-serif", 14));
        if !panel.grid {
            mesh.disable_mesh();
        }
        mesh.draw().map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    let mut labelled = false;
    for series in &panel.series {
        match series {
            Series::Line {
                points,
                color,
                alpha,
                markers,
                label,
            } => {
                let style = color.to_plotters().mix(*alpha);
                let points = drawable(points, panel.x_scale);
                let anno = chart
                    .draw_series(LineSeries::new(points.iter().copied(), style.stroke_width(2)))
                    .map_err(|e| PlotError::Drawing(e.to_string()))?;
                if let Some(label) = label {
                    labelled = true;
                    anno.label(label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], style.stroke_width(2))
                    });
                }
                if *markers {
                    chart
                        .draw_series(points.iter().map(|&p| Circle::new(p, 3, style.filled())))
                        .map_err(|e| PlotError::Drawing(e.to_string()))?;
                }
            }
            Series::Scatter {
                points,
                color,
                alpha,
                label,
            } => {
                let style = color.to_plotters().mix(*alpha);
                let points = drawable(points, panel.x_scale);
                let anno = chart
                    .draw_series(points.iter().map(|&p| Circle::new(p, 3, style.filled())))
                    .map_err(|e| PlotError::Drawing(e.to_string()))?;
                if let Some(label) = label {
                    labelled = true;
                    anno.label(label.as_str())
                        .legend(move |(x, y)| Circle::new((x + 10, y), 3, style.filled()));
                }
            }
            Series::Bars { bars, fill, alpha } => {
                let style = fill.to_plotters().mix(*alpha);
                let corners = |&(l, r, h): &(f64, f64, f64)| [(l, 0.0), (r, h)];
                chart
                    .draw_series(bars.iter().map(|b| Rectangle::new(corners(b), style.filled())))
                    .map_err(|e| PlotError::Drawing(e.to_string()))?;
                chart
                    .draw_series(
                        bars.iter()
                            .map(|b| Rectangle::new(corners(b), BLACK.stroke_width(1))),
                    )
                    .map_err(|e| PlotError::Drawing(e.to_string()))?;
            }
        }
    }

    for hline in &panel.hlines {
        let color = hline.color.to_plotters();
        let y = hline.y;
        let anno = chart
            .draw_series(
                dashes(x0, x1, panel.x_scale)
                    .into_iter()
                    .map(|(a, b)| PathElement::new(vec![(a, y), (b, y)], color.stroke_width(2))),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        if let Some(label) = &hline.label {
            labelled = true;
            anno.label(label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
    }

    if labelled {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }
    Ok(())
}

fn draw_annotation<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    lines: &[String],
    height: i32,
) -> Result<()> {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
    let width = longest * ANNOTATION_GLYPH + 2 * ANNOTATION_PAD;
    let top = height - ANNOTATION_PAD - ANNOTATION_LINE * lines.len() as i32 - 2 * ANNOTATION_PAD;
    let corners = [
        (ANNOTATION_PAD, top),
        (ANNOTATION_PAD + width, height - ANNOTATION_PAD),
    ];
    root.draw(&Rectangle::new(corners, WHITE.mix(0.8).filled()))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    root.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    for (i, line) in lines.iter().enumerate() {
        let pos = (
            2 * ANNOTATION_PAD,
            top + ANNOTATION_PAD + ANNOTATION_LINE * i as i32,
        );
        root.draw(&Text::new(line.as_str(), pos, ("sans-serif", 16).into_font()))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }
    Ok(())
}

/// Points that can be placed on the given x scale.
fn drawable(points: &[(f64, f64)], x_scale: Scale) -> Vec<(f64, f64)> {
    points
        .iter()
        .copied()
        .filter(|&(x, y)| x.is_finite() && y.is_finite())
        .filter(|&(x, _)| x_scale == Scale::Linear || x > 0.0)
        .collect()
}

/// Every other of 40 equal segments across `[x0, x1]`, equal in log
/// space on a log axis.
fn dashes(x0: f64, x1: f64, x_scale: Scale) -> Vec<(f64, f64)> {
    const NSEGMENTS: usize = 40;
    let (to, from): (fn(f64) -> f64, fn(f64) -> f64) = match x_scale {
        Scale::Linear => (|x| x, |x| x),
        Scale::Log => (f64::ln, f64::exp),
    };
    let (lo, hi) = (to(x0), to(x1));
    let step = (hi - lo) / NSEGMENTS as f64;
    (0..NSEGMENTS)
        .step_by(2)
        .map(|i| (from(lo + step * i as f64), from(lo + step * (i + 1) as f64)))
        .collect()
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    crate::density::range(values)
}

fn pad(extent: Option<(f64, f64)>) -> (f64, f64) {
    match extent {
        None => (0.0, 1.0),
        Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
        Some((lo, hi)) => {
            let margin = (hi - lo) * 0.05;
            (lo - margin, hi + margin)
        }
    }
}
