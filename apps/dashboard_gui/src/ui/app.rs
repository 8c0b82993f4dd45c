use client_core::{DashboardView, FetchStatus};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::ui::chart;

const ALL_STATES: &str = "All States";
const ALL_DISTRICTS: &str = "All Districts";
const ACTIVE_COLOR: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const UPDATING_COLOR: egui::Color32 = egui::Color32::from_rgb(245, 158, 11);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

pub struct DashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: DashboardView,
    status: String,
    banner: Option<UiError>,
}

impl DashboardApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: DashboardView::default(),
            status: String::new(),
            banner: None,
        };
        app.dispatch(BackendCommand::Startup);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Dashboard(event) => {
                self.view.apply(event);
                if self.view.status == FetchStatus::Success {
                    self.banner = None;
                }
            }
            UiEvent::Error(err) => {
                tracing::warn!(category = ?err.category(), context = ?err.context(), "{}", err.message());
                self.banner = Some(err);
            }
        }
    }

    fn select_state(&mut self, state: &str) {
        // Mirror locally so the district list updates in the same frame.
        self.view.query.set_state(state);
        self.dispatch(BackendCommand::SelectState {
            state: state.to_string(),
        });
    }

    fn select_district(&mut self, district: &str) {
        match self.view.query.set_district(district) {
            Ok(()) => self.dispatch(BackendCommand::SelectDistrict {
                district: district.to_string(),
            }),
            Err(err) => self.banner = Some(UiError::from_query(&err)),
        }
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Aadhaar Enrolment Analytics");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (label, color) = if self.view.is_loading() {
                    ("Updating...", UPDATING_COLOR)
                } else {
                    ("System Active", ACTIVE_COLOR)
                };
                ui.label(egui::RichText::new(label).color(color));
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 4.0, color);
            });
        });
        if !self.status.is_empty() {
            ui.small(egui::RichText::new(&self.status).weak());
        }
    }

    fn show_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = &self.banner else {
            return;
        };
        let text = banner.banner_text();
        let mut dismissed = false;
        egui::Frame::new()
            .fill(ERROR_COLOR)
            .inner_margin(egui::Margin::same(8))
            .corner_radius(6.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
                    if ui.small_button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            self.banner = None;
        }
    }

    fn show_filters(&mut self, ui: &mut egui::Ui) {
        let states = self
            .view
            .state_options()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let districts = self
            .view
            .district_options()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let selected_state = self.view.query.selected_state().map(str::to_string);
        let selected_district = self.view.query.selected_district().map(str::to_string);

        let mut state_choice: Option<String> = None;
        let mut district_choice: Option<String> = None;
        let mut apply = false;
        let mut reload = false;

        ui.horizontal_wrapped(|ui| {
            ui.label("State");
            egui::ComboBox::from_id_salt("state_filter")
                .selected_text(selected_state.as_deref().unwrap_or(ALL_STATES))
                .width(180.0)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(selected_state.is_none(), ALL_STATES)
                        .clicked()
                    {
                        state_choice = Some(String::new());
                    }
                    for state in &states {
                        let selected = selected_state.as_deref() == Some(state.as_str());
                        if ui.selectable_label(selected, state).clicked() {
                            state_choice = Some(state.clone());
                        }
                    }
                });

            ui.label("District");
            ui.add_enabled_ui(selected_state.is_some(), |ui| {
                egui::ComboBox::from_id_salt("district_filter")
                    .selected_text(selected_district.as_deref().unwrap_or(ALL_DISTRICTS))
                    .width(180.0)
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(selected_district.is_none(), ALL_DISTRICTS)
                            .clicked()
                        {
                            district_choice = Some(String::new());
                        }
                        for district in &districts {
                            let selected = selected_district.as_deref() == Some(district.as_str());
                            if ui.selectable_label(selected, district).clicked() {
                                district_choice = Some(district.clone());
                            }
                        }
                    });
            });

            let apply_label = if self.view.is_loading() {
                "Searching..."
            } else {
                "Apply Filters"
            };
            if ui
                .add_enabled(self.view.can_apply(), egui::Button::new(apply_label))
                .clicked()
            {
                apply = true;
            }
            if ui.button("Reload filters").clicked() {
                reload = true;
            }
        });

        if let Some(state) = state_choice {
            self.select_state(&state);
        }
        if let Some(district) = district_choice {
            self.select_district(&district);
        }
        if apply {
            self.dispatch(BackendCommand::ApplyFilters);
        }
        if reload {
            self.dispatch(BackendCommand::ReloadFilters);
        }
    }

    fn show_table(&self, ui: &mut egui::Ui) {
        if let Some(message) = self.view.error_message() {
            ui.colored_label(ERROR_COLOR, message);
        }

        let rows = self.view.table_rows();
        egui::ScrollArea::vertical()
            .max_height(320.0)
            .show(ui, |ui| {
                egui::Grid::new("records_table")
                    .num_columns(5)
                    .striped(true)
                    .spacing([24.0, 6.0])
                    .show(ui, |ui| {
                        for heading in [
                            "Location",
                            "Enrolment 0-5",
                            "Enrolment 5-17",
                            "Demographic 5-17",
                            "Biometric 5-17",
                        ] {
                            ui.label(egui::RichText::new(heading).strong());
                        }
                        ui.end_row();

                        for row in &rows {
                            ui.vertical(|ui| {
                                ui.label(&row.location);
                                ui.small(egui::RichText::new(&row.detail).weak());
                            });
                            ui.label(row.enrol_0_5.to_string());
                            ui.label(row.enrol_5_17.to_string());
                            ui.label(row.demo_5_17.to_string());
                            ui.label(row.bio_5_17.to_string());
                            ui.end_row();
                        }
                    });

                if rows.is_empty() {
                    if let Some(message) = self.view.empty_message() {
                        ui.add_space(12.0);
                        ui.vertical_centered(|ui| ui.label(egui::RichText::new(message).weak()));
                    } else if self.view.is_loading() {
                        ui.add_space(12.0);
                        ui.vertical_centered(|ui| ui.spinner());
                    }
                }
            });
    }

    fn show_pagination(&mut self, ui: &mut egui::Ui) {
        let mut previous = false;
        let mut next = false;
        ui.horizontal(|ui| {
            ui.label(self.view.window_label());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(self.view.can_go_next(), egui::Button::new("Next"))
                    .clicked()
                {
                    next = true;
                }
                if ui
                    .add_enabled(self.view.can_go_previous(), egui::Button::new("Previous"))
                    .clicked()
                {
                    previous = true;
                }
            });
        });
        if previous {
            self.dispatch(BackendCommand::PreviousPage);
        }
        if next {
            self.dispatch(BackendCommand::NextPage);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("dashboard_header").show(ctx, |ui| {
            ui.add_space(6.0);
            self.show_header(ui);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_banner(ui);
            self.show_filters(ui);
            ui.separator();
            chart::show_trend_chart(ui, &self.view);
            ui.separator();
            self.show_table(ui);
            ui.separator();
            self.show_pagination(ui);
        });

        if self.view.is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
