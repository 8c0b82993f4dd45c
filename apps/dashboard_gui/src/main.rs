use std::path::PathBuf;

use clap::Parser;
use client_core::{load_settings, load_settings_from, GatewaySettings};
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::DashboardApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop dashboard for Aadhaar enrolment records")]
struct Args {
    /// Settings file; defaults to dashboard.toml in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    gateway_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
}

impl Args {
    fn settings(&self) -> GatewaySettings {
        let mut settings = match &self.config {
            Some(path) => load_settings_from(path),
            None => load_settings(),
        };
        if let Some(url) = &self.gateway_url {
            settings.gateway_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            settings.api_key = key.clone();
        }
        settings
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = args.settings();
    tracing::info!(gateway = %settings.gateway_url, "starting dashboard");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Aadhaar Enrolment Dashboard")
            .with_inner_size([1200.0, 820.0])
            .with_min_inner_size([860.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Aadhaar Enrolment Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(cmd_tx, ui_rx)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_file_settings() {
        let args = Args::parse_from([
            "dashboard_gui",
            "--config",
            "/nonexistent/dashboard.toml",
            "--gateway-url",
            "http://gateway.local:9000",
            "--api-key",
            "cli-key",
        ]);
        let settings = args.settings();
        assert_eq!(settings.gateway_url, "http://gateway.local:9000");
        assert_eq!(settings.api_key, "cli-key");
    }

    #[test]
    fn config_flag_is_optional() {
        let args = Args::parse_from(["dashboard_gui"]);
        assert!(args.config.is_none());
        assert!(args.gateway_url.is_none());
    }
}
