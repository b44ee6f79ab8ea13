use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use ghscout_app::Browser;
use ghscout_core::doctor::DoctorReport;
use ghscout_tui::UiExit;
use tracing::info;

use crate::cli::{Cli, Command};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Doctor) => run_doctor_command(),
        None => run_root_command(),
    }
}

fn run_root_command() -> Result<()> {
    let settings = ghscout_core::config::load_settings()?;
    info!(
        api_base = %settings.api_base,
        authenticated = settings.credential.is_some(),
        "starting browser"
    );

    let mut browser = Browser::from_settings(settings)?;
    let exit = ghscout_tui::run_browser(&mut browser)?;
    if exit == UiExit::Canceled {
        info!("browser closed with ctrl-c");
    }

    Ok(())
}

fn run_doctor_command() -> Result<()> {
    let report = ghscout_core::doctor::run_doctor();
    info!(summary = %report.summary(), "doctor finished");
    print_doctor_report(&report);
    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(check.state.to_string()),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}
