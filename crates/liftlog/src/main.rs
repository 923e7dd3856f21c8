mod bootstrap;
mod summary;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use liftlog_core::settings::{DashboardConfig, Settings, UserSettings};
use liftlog_core::time_utils::{today_in, MonthKey};
use liftlog_data::analysis::ReportRequest;
use liftlog_runtime::data_manager::DataManager;
use liftlog_runtime::orchestrator::RefreshOrchestrator;
use liftlog_runtime::server::{self, AppContext, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("liftlog v{} starting", env!("CARGO_PKG_VERSION"));

    let source = data_source(&settings);
    let settings_path = settings.user_settings_path();
    tracing::info!(
        "View: {}, source: {}, settings: {}",
        settings.view,
        source.display(),
        settings_path.display()
    );

    match settings.view.as_str() {
        "summary" | "json" => {
            let config = load_config(&settings)?;
            let today = today_in(&settings.timezone);
            let month = MonthKey::resolve(settings.year, settings.month, today)?;
            let request = ReportRequest {
                month,
                today,
                config,
            };

            let report =
                tokio::task::spawn_blocking(move || DataManager::new(source).report(&request))
                    .await
                    .context("report task failed")??;

            if settings.view == "json" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", summary::render(&report, month));
            }
        }

        "watch" => {
            let config = load_config(&settings)?;
            let fixed_month = match (settings.year, settings.month) {
                (None, None) => None,
                (year, month) => {
                    let today = today_in(&settings.timezone);
                    Some(MonthKey::resolve(year, month, today)?)
                }
            };

            let orchestrator = RefreshOrchestrator::new(
                u64::from(settings.refresh_rate),
                source,
                config,
                settings.timezone.clone(),
                fixed_month,
            );
            let (mut rx, handle) = orchestrator.start();

            loop {
                tokio::select! {
                    snapshot = rx.recv() => {
                        let Some(snapshot) = snapshot else { break };
                        match snapshot.outcome {
                            Ok(report) => {
                                let at = snapshot.generated_at.with_timezone(&chrono::Local);
                                println!("── {} ──", at.format("%Y-%m-%d %H:%M:%S"));
                                print!("{}", summary::render(&report, snapshot.month));
                            }
                            Err(e) => eprintln!("Refresh failed: {}", e),
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Ctrl+C received; stopping refresh loop");
                        break;
                    }
                }
            }
            handle.abort();
        }

        "serve" => {
            let addr: SocketAddr = settings
                .bind
                .parse()
                .with_context(|| format!("invalid bind address: {}", settings.bind))?;
            let state = AppState::new(AppContext {
                source,
                settings_path,
                settings: settings.clone(),
            });

            server::serve(addr, state, async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Ctrl+C received; shutting down server");
                }
            })
            .await?;
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// Configured CSV path, else the first existing default location, else the
/// working-directory default (which then reports as not found).
fn data_source(settings: &Settings) -> PathBuf {
    settings
        .csv_file_path
        .clone()
        .or_else(bootstrap::discover_data_path)
        .unwrap_or_else(|| PathBuf::from("data").join(bootstrap::DEFAULT_CSV_NAME))
}

fn load_config(settings: &Settings) -> Result<DashboardConfig> {
    let user = UserSettings::load_from(&settings.user_settings_path());
    Ok(settings.dashboard_config(&user)?)
}
