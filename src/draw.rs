//! Draws a [`Figure`] onto any plotters backend.

use std::error::Error;
use std::f64::consts::{PI, TAU};

use plotters::chart::SeriesLabelPosition;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::element::ErrorBar;
use plotters::prelude::*;
use plotters::style::FontTransform;

use crate::figure::{
    spoke_angle, BoxGlyph, CartesianPanel, Figure, HeatmapPanel, Layer, Panel, PolarPanel,
    RingPanel, Scatter3dPanel, ViolinGlyph, ViolinSide,
};

type DrawResult = Result<(), Box<dyn Error>>;
type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const GRID_GREY: RGBColor = RGBColor(200, 200, 200);

pub(crate) fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let body = root.titled(&figure.title, ("sans-serif", 28))?;
    let areas = body.split_evenly(figure.grid);

    for (area, panel) in areas.iter().zip(figure.panels.iter()) {
        match panel {
            Panel::Cartesian(p) => draw_cartesian(area, p)?,
            Panel::Heatmap(p) => draw_heatmap(area, p)?,
            Panel::Polar(p) => draw_polar(area, p)?,
            Panel::Rings(p) => draw_rings(area, p)?,
            Panel::Scatter3d(p) => draw_scatter3d(area, p)?,
        }
    }

    root.present()?;
    Ok(())
}

fn category_at(categories: &[String], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    categories.get(nearest as usize).cloned().unwrap_or_default()
}

fn draw_cartesian<DB>(area: &DrawingArea<DB, Shift>, panel: &CartesianPanel) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x0, x1) = panel.x_range;
    let (y0, y1) = panel.y_range;
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    let categories = panel.x_categories.as_deref();
    let category_label = |x: &f64| category_at(categories.unwrap_or(&[]), *x);
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .label_style(("sans-serif", 14))
            .axis_desc_style(("sans-serif", 16));
        if let Some(categories) = categories {
            mesh.disable_x_mesh()
                .x_labels(categories.len() * 2 + 1)
                .x_label_formatter(&category_label);
        }
        mesh.draw()?;
    }

    let mut legend = false;
    for layer in &panel.layers {
        match layer {
            Layer::Bars { bars, color, label } => {
                let color = *color;
                let series = chart.draw_series(bars.iter().map(|bar| {
                    Rectangle::new(
                        [(bar.left, 0.0), (bar.right, bar.height)],
                        color.mix(0.85).filled(),
                    )
                }))?;
                if let Some(label) = label {
                    series.label(label.as_str()).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
                    legend = true;
                }
                chart.draw_series(bars.iter().filter_map(|bar| {
                    bar.error.map(|(low, high)| {
                        let center = (bar.left + bar.right) / 2.0;
                        ErrorBar::new_vertical(center, low, bar.height, high, BLACK.filled(), 10)
                    })
                }))?;
            }
            Layer::Line {
                points,
                color,
                width,
                label,
            } => {
                let color = *color;
                let series = chart.draw_series(LineSeries::new(
                    points.iter().copied(),
                    color.stroke_width(*width),
                ))?;
                if let Some(label) = label {
                    series.label(label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                    legend = true;
                }
            }
            Layer::Points {
                markers,
                color,
                opacity,
                label,
            } => {
                let color = *color;
                let style = color.mix(*opacity).filled();
                let series = chart.draw_series(
                    markers
                        .iter()
                        .map(|m| Circle::new((m.x, m.y), m.radius, style)),
                )?;
                if let Some(label) = label {
                    series
                        .label(label.as_str())
                        .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
                    legend = true;
                }
            }
            Layer::Boxes(boxes) => {
                for glyph in boxes {
                    draw_box(&mut chart, glyph)?;
                }
            }
            Layer::Violins(violins) => {
                for glyph in violins {
                    legend |= draw_violin(&mut chart, glyph)?;
                }
            }
        }
    }

    if legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 14))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_box<DB>(chart: &mut Chart2d<'_, DB>, glyph: &BoxGlyph) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let half = glyph.width / 2.0;
    let (left, right) = (glyph.center - half, glyph.center + half);
    let (cap_left, cap_right) = (glyph.center - half / 2.0, glyph.center + half / 2.0);

    chart.draw_series(std::iter::once(Rectangle::new(
        [(left, glyph.q1), (right, glyph.q3)],
        glyph.color.filled(),
    )))?;
    chart.draw_series(std::iter::once(Rectangle::new(
        [(left, glyph.q1), (right, glyph.q3)],
        BLACK.stroke_width(1),
    )))?;

    let lines = vec![
        vec![(left, glyph.median), (right, glyph.median)],
        vec![(glyph.center, glyph.q3), (glyph.center, glyph.upper_whisker)],
        vec![(glyph.center, glyph.q1), (glyph.center, glyph.lower_whisker)],
        vec![(cap_left, glyph.upper_whisker), (cap_right, glyph.upper_whisker)],
        vec![(cap_left, glyph.lower_whisker), (cap_right, glyph.lower_whisker)],
    ];
    chart.draw_series(
        lines
            .into_iter()
            .map(|line| PathElement::new(line, BLACK.stroke_width(2))),
    )?;
    chart.draw_series(
        glyph
            .outliers
            .iter()
            .map(|&v| Circle::new((glyph.center, v), 3, BLACK.stroke_width(1))),
    )?;
    Ok(())
}

fn violin_outline(glyph: &ViolinGlyph) -> Vec<(f64, f64)> {
    let c = glyph.center;
    let (right_edge, left_edge): (Vec<(f64, f64)>, Vec<(f64, f64)>) = match glyph.side {
        ViolinSide::Both => (
            glyph.outline.iter().map(|&(w, y)| (c + w, y)).collect(),
            glyph.outline.iter().map(|&(w, y)| (c - w, y)).collect(),
        ),
        ViolinSide::Left => (
            glyph.outline.iter().map(|&(_, y)| (c, y)).collect(),
            glyph.outline.iter().map(|&(w, y)| (c - w, y)).collect(),
        ),
        ViolinSide::Right => (
            glyph.outline.iter().map(|&(w, y)| (c + w, y)).collect(),
            glyph.outline.iter().map(|&(_, y)| (c, y)).collect(),
        ),
    };
    right_edge
        .into_iter()
        .chain(left_edge.into_iter().rev())
        .collect()
}

// Returns whether a legend entry was added.
fn draw_violin<DB>(chart: &mut Chart2d<'_, DB>, glyph: &ViolinGlyph) -> Result<bool, Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let outline = violin_outline(glyph);
    if outline.is_empty() {
        return Ok(false);
    }
    let color = glyph.color;
    let series = chart.draw_series(std::iter::once(Polygon::new(
        outline.clone(),
        color.mix(0.6).filled(),
    )))?;
    let labelled = match &glyph.label {
        Some(label) => {
            series.label(label.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
            true
        }
        None => false,
    };

    let mut closed = outline;
    closed.push(closed[0]);
    chart.draw_series(std::iter::once(PathElement::new(closed, BLACK.stroke_width(1))))?;
    Ok(labelled)
}

/// Diverging blue-white-red scale for values in [-1, 1].
fn coolwarm(value: f64) -> RGBColor {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let v = if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 };
    let (from, to, t) = if v < 0.0 {
        (COOL, MID, v + 1.0)
    } else {
        (MID, WARM, v)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

fn draw_heatmap<DB>(area: &DrawingArea<DB, Shift>, panel: &HeatmapPanel) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = panel.labels.len() as u32;
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(120)
        .y_label_area_size(160)
        .build_cartesian_2d(0..n, 0..n)?;

    // row i is drawn at y = n - 1 - i so the first label sits on top
    let labels = &panel.labels;
    let x_label = |x: &u32| labels.get(*x as usize).cloned().unwrap_or_default();
    let y_label = |y: &u32| {
        n.checked_sub(*y + 1)
            .and_then(|i| labels.get(i as usize))
            .cloned()
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n as usize)
        .y_labels(n as usize)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .x_label_style(
            ("sans-serif", 13)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style(("sans-serif", 13))
        .draw()?;

    for ((i, j), &value) in panel.values.indexed_iter() {
        let masked = panel
            .mask
            .as_ref()
            .and_then(|mask| mask.get((i, j)).copied())
            .unwrap_or(false);
        if masked {
            continue;
        }
        let (col, top) = (j as u32, n - i as u32);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(col, top - 1), (col + 1, top)],
            coolwarm(value).filled(),
        )))?;
        if panel.annotate {
            chart.draw_series(std::iter::once(
                EmptyElement::at((col, top))
                    + Text::new(
                        format!("{:.2}", value),
                        (6, 8),
                        ("sans-serif", 12).into_font(),
                    ),
            ))?;
        }
    }
    Ok(())
}

// Margins that leave a roughly square plotting region.
fn square_margins<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> (u32, u32) {
    let (w, h) = area.dim_in_pixel();
    if w > h {
        ((w - h) / 2, 0)
    } else {
        (0, (h - w) / 2)
    }
}

fn to_xy(angle: f64, radius: f64) -> (f64, f64) {
    (radius * angle.cos(), radius * angle.sin())
}

fn draw_polar<DB>(area: &DrawingArea<DB, Shift>, panel: &PolarPanel) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (side, vertical) = square_margins(area);
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(15)
        .margin_left(15 + side)
        .margin_right(15 + side)
        .margin_top(15 + vertical)
        .margin_bottom(15 + vertical)
        .build_cartesian_2d(-1.35f64..1.35f64, -1.35f64..1.35f64)?;

    let spokes = panel.axes.len();
    for level in 1..=4 {
        let radius = level as f64 / 4.0;
        let circle: Vec<(f64, f64)> = (0..=72)
            .map(|k| to_xy(TAU * k as f64 / 72.0, radius))
            .collect();
        chart.draw_series(std::iter::once(PathElement::new(circle, &GRID_GREY)))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.1}", panel.radial_max * radius),
            (0.02, radius),
            ("sans-serif", 11).into_font().color(&RGBColor(120, 120, 120)),
        )))?;
    }
    for (k, axis) in panel.axes.iter().enumerate() {
        let angle = spoke_angle(k, spokes);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), to_xy(angle, 1.0)],
            &GRID_GREY,
        )))?;
        let (x, y) = to_xy(angle, 1.12);
        chart.draw_series(std::iter::once(Text::new(
            axis.clone(),
            (x - 0.1, y),
            ("sans-serif", 14).into_font(),
        )))?;
    }

    let scale = if panel.radial_max > 0.0 {
        panel.radial_max
    } else {
        1.0
    };
    for series in &panel.series {
        let color = series.color;
        let path: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|&(angle, r)| to_xy(angle, r / scale))
            .collect();
        chart.draw_series(std::iter::once(Polygon::new(
            path.clone(),
            color.mix(0.25).filled(),
        )))?;
        chart
            .draw_series(std::iter::once(PathElement::new(path, color.stroke_width(2))))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !panel.series.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

fn annular_sector(inner: f64, outer: f64, start: f64, end: f64) -> Vec<(f64, f64)> {
    let steps = ((end - start).abs() / (PI / 90.0)).ceil().max(1.0) as usize;
    let arc = |radius: f64| -> Vec<(f64, f64)> {
        (0..=steps)
            .map(|k| to_xy(start + (end - start) * k as f64 / steps as f64, radius))
            .collect()
    };
    let mut points = arc(outer);
    if inner > 0.0 {
        points.extend(arc(inner).into_iter().rev());
    } else {
        points.push((0.0, 0.0));
    }
    points
}

fn draw_rings<DB>(area: &DrawingArea<DB, Shift>, panel: &RingPanel) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (side, vertical) = square_margins(area);
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(15)
        .margin_left(15 + side)
        .margin_right(15 + side)
        .margin_top(15 + vertical)
        .margin_bottom(15 + vertical)
        .build_cartesian_2d(-1.25f64..1.25f64, -1.25f64..1.25f64)?;

    for ring in &panel.rings {
        let total = ring.total() as f64;
        if total == 0.0 {
            continue;
        }
        // counterclockwise from twelve o'clock
        let mut start = PI / 2.0;
        for slice in &ring.slices {
            let sweep = TAU * slice.count as f64 / total;
            let end = start + sweep;
            let wedge = annular_sector(ring.inner_radius, ring.outer_radius, start, end);
            chart.draw_series(std::iter::once(Polygon::new(
                wedge.clone(),
                slice.color.filled(),
            )))?;
            let mut outline = wedge;
            outline.push(outline[0]);
            chart.draw_series(std::iter::once(PathElement::new(
                outline,
                WHITE.stroke_width(2),
            )))?;
            if sweep > 0.2 {
                let (x, y) = to_xy(
                    start + sweep / 2.0,
                    (ring.inner_radius + ring.outer_radius) / 2.0,
                );
                chart.draw_series(std::iter::once(Text::new(
                    format!("{} ({})", slice.label, slice.count),
                    (x - 0.08, y),
                    ("sans-serif", 12).into_font(),
                )))?;
            }
            start = end;
        }
    }
    Ok(())
}

fn draw_scatter3d<DB>(area: &DrawingArea<DB, Shift>, panel: &Scatter3dPanel) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let [(x0, x1), (y0, y1), (z0, z1)] = panel.ranges;
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(20)
        .build_cartesian_3d(x0..x1, y0..y1, z0..z1)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.3;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()?;

    for group in &panel.groups {
        let color = group.color;
        chart
            .draw_series(
                group
                    .points
                    .iter()
                    .map(|&p| Circle::new(p, 3, color.mix(0.8).filled())),
            )?
            .label(group.label.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    let [x_label, y_label, z_label] = &panel.axis_labels;
    area.draw(&Text::new(
        format!("x: {}   y: {}   z: {}", x_label, y_label, z_label),
        (10, 10),
        ("sans-serif", 14).into_font(),
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(f64::NAN), RGBColor(221, 221, 221));
    }

    #[test]
    fn test_category_at_integer_ticks_only() {
        let cats = vec!["No".to_string(), "Yes".to_string()];
        assert_eq!(category_at(&cats, 1.0), "Yes");
        assert_eq!(category_at(&cats, 0.5), "");
        assert_eq!(category_at(&cats, 2.0), "");
        assert_eq!(category_at(&cats, -1.0), "");
    }

    #[test]
    fn test_split_violin_outline_touches_center() {
        let glyph = ViolinGlyph {
            center: 1.0,
            side: ViolinSide::Left,
            outline: vec![(0.1, 0.0), (0.3, 1.0), (0.1, 2.0)],
            color: BLUE,
            label: None,
        };
        let outline = violin_outline(&glyph);
        assert_eq!(outline.len(), 6);
        assert!(outline.iter().all(|&(x, _)| x <= 1.0));
        assert_eq!(outline[0], (1.0, 0.0));
    }

    #[test]
    fn test_annular_sector_closes_on_inner_arc() {
        let wedge = annular_sector(0.5, 1.0, 0.0, PI / 2.0);
        let first = wedge[0];
        let last = *wedge.last().unwrap();
        assert!((first.0 - 1.0).abs() < 1e-9 && first.1.abs() < 1e-9);
        assert!((last.0 - 0.5).abs() < 1e-9 && last.1.abs() < 1e-9);
    }
}
