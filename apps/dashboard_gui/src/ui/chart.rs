//! Enrolment trend chart: two series over the records of the current page.

use client_core::DashboardView;
use eframe::egui;

const SERIES_0_5: egui::Color32 = egui::Color32::from_rgb(79, 70, 229);
const SERIES_5_17: egui::Color32 = egui::Color32::from_rgb(16, 185, 129);
const CHART_HEIGHT: f32 = 220.0;

/// Maps `values` onto `rect`, spread evenly left to right with zero at the bottom.
///
/// `ceiling` is the value drawn at the top edge; a zero ceiling puts every
/// point on the baseline.
pub fn scale_series(values: &[u64], ceiling: u64, rect: egui::Rect) -> Vec<egui::Pos2> {
    let step = if values.len() > 1 {
        rect.width() / (values.len() - 1) as f32
    } else {
        0.0
    };
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let ratio = if ceiling == 0 {
                0.0
            } else {
                (*value as f32 / ceiling as f32).clamp(0.0, 1.0)
            };
            let x = if values.len() > 1 {
                rect.left() + step * index as f32
            } else {
                rect.center().x
            };
            egui::pos2(x, rect.bottom() - ratio * rect.height())
        })
        .collect()
}

pub fn show_trend_chart(ui: &mut egui::Ui, view: &DashboardView) {
    ui.label(egui::RichText::new("Enrolment trends").strong());
    ui.horizontal(|ui| {
        legend_entry(ui, SERIES_0_5, "Age 0-5");
        legend_entry(ui, SERIES_5_17, "Age 5-17");
    });

    let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let frame = response.rect;
    painter.rect_filled(frame, 6.0, ui.visuals().extreme_bg_color);

    if let Some(message) = view.chart_empty_message() {
        painter.text(
            frame.center(),
            egui::Align2::CENTER_CENTER,
            message,
            egui::FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
        return;
    }

    let points = view.trend_series();
    let plot = frame.shrink2(egui::vec2(16.0, 18.0));
    let under_five = points.iter().map(|p| p.age_0_5).collect::<Vec<_>>();
    let school_age = points.iter().map(|p| p.age_5_17).collect::<Vec<_>>();
    let ceiling = under_five
        .iter()
        .chain(school_age.iter())
        .copied()
        .max()
        .unwrap_or(0);

    let grid = egui::Stroke::new(1.0, ui.visuals().faint_bg_color);
    painter.line_segment([plot.left_bottom(), plot.right_bottom()], grid);
    painter.line_segment([plot.left_top(), plot.right_top()], grid);
    painter.text(
        plot.left_top(),
        egui::Align2::LEFT_BOTTOM,
        ceiling.to_string(),
        egui::FontId::proportional(11.0),
        ui.visuals().weak_text_color(),
    );

    for (values, color) in [(&under_five, SERIES_0_5), (&school_age, SERIES_5_17)] {
        let line = scale_series(values, ceiling, plot);
        for point in &line {
            painter.circle_filled(*point, 3.0, color);
        }
        painter.add(egui::Shape::line(line, egui::Stroke::new(2.0, color)));
    }

    if let Some(hover) = response.hover_pos() {
        let nearest = nearest_index(points.len(), plot, hover.x);
        if let Some(point) = nearest.and_then(|index| points.get(index)) {
            response.on_hover_text(format!(
                "{}\nAge 0-5: {}\nAge 5-17: {}",
                point.date, point.age_0_5, point.age_5_17
            ));
        }
    }
}

fn nearest_index(len: usize, plot: egui::Rect, x: f32) -> Option<usize> {
    match len {
        0 => None,
        1 => Some(0),
        _ => {
            let step = plot.width() / (len - 1) as f32;
            let index = ((x - plot.left()) / step).round().max(0.0) as usize;
            Some(index.min(len - 1))
        }
    }
}

fn legend_entry(ui: &mut egui::Ui, color: egui::Color32, label: &str) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, color);
    ui.small(label);
}
