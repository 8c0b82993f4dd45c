//! Worker thread owning the tokio runtime and the dashboard core.
//!
//! Commands arrive over a crossbeam queue. Selection changes are applied in
//! arrival order before the next command is read; fetches run as their own
//! tasks so a slow query never blocks a newer one. Dashboard events are
//! forwarded to the UI queue as they are emitted.

use std::{sync::Arc, thread};

use anyhow::Context;
use client_core::{Dashboard, GatewaySettings, HttpGateway, RefreshOutcome};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: GatewaySettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let dashboard = match build_dashboard(&settings) {
                Ok(dashboard) => dashboard,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("{err:#}"),
                    )));
                    tracing::error!("failed to configure gateway client: {err:#}");
                    return;
                }
            };

            let mut events = dashboard.subscribe_events();
            let forward_tx = ui_tx.clone();
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            if forward_tx.try_send(UiEvent::Dashboard(event)).is_err() {
                                tracing::warn!("ui event queue full or closed; dropping dashboard event");
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "dashboard event forwarder lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(&dashboard, cmd, &ui_tx).await;
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

fn build_dashboard(settings: &GatewaySettings) -> anyhow::Result<Arc<Dashboard>> {
    if settings.api_key.is_empty() {
        tracing::warn!("no API key configured; the gateway will likely reject queries");
    }
    let gateway = HttpGateway::new(settings).context("failed to configure gateway client")?;
    tracing::info!(records = %gateway.records_url(), "gateway client configured");
    Ok(Dashboard::new(Arc::new(gateway)))
}

/// Applies selection changes inline and spawns everything that hits the gateway.
async fn handle_command(dashboard: &Arc<Dashboard>, cmd: BackendCommand, ui_tx: &Sender<UiEvent>) {
    match cmd {
        BackendCommand::SelectState { state } => dashboard.select_state(&state).await,
        BackendCommand::SelectDistrict { district } => {
            if let Err(err) = dashboard.select_district(&district).await {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_query(&err)));
            }
        }
        cmd => {
            let dashboard = Arc::clone(dashboard);
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                run_fetch_command(&dashboard, cmd, &ui_tx).await;
            });
        }
    }
}

async fn run_fetch_command(dashboard: &Dashboard, cmd: BackendCommand, ui_tx: &Sender<UiEvent>) {
    let outcome = match cmd {
        BackendCommand::Startup => dashboard.startup().await,
        BackendCommand::ApplyFilters => dashboard.apply_filters().await,
        BackendCommand::NextPage => dashboard.next_page().await,
        BackendCommand::PreviousPage => dashboard.previous_page().await,
        BackendCommand::ReloadFilters => {
            match dashboard.reload_filters().await {
                Ok(vocabulary) => {
                    let count = vocabulary.states().count();
                    let _ = ui_tx.try_send(UiEvent::Info(format!("Loaded filters for {count} states")));
                }
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::Filters,
                        err.to_string(),
                    )));
                }
            }
            return;
        }
        BackendCommand::SelectState { .. } | BackendCommand::SelectDistrict { .. } => {
            tracing::warn!(command = cmd.name(), "selection command routed to fetch task");
            return;
        }
    };

    match outcome {
        RefreshOutcome::Rejected(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_query(&err)));
        }
        RefreshOutcome::Failed(message) => {
            tracing::debug!("query failed: {message}");
        }
        RefreshOutcome::Committed | RefreshOutcome::Superseded | RefreshOutcome::Ignored => {}
    }
}
