use chrono::{DateTime, Local};
use concat_bench::{Report, ReportStore, Result, Strategy};

/// Lists the strategies with a short description of each
pub fn handle_list_strategies() {
    println!("{:<10} {}", "Strategy", "How the line is built");
    println!("{:-<72}", "");
    for strategy in Strategy::ALL {
        println!("{:<10} {}", strategy.name(), strategy.description());
    }
}

/// Lists saved reports, newest first
pub fn handle_list_reports(limit: usize) -> Result<()> {
    let store = ReportStore::open_default()?;
    let reports = store.list(Some(limit))?;

    if reports.is_empty() {
        println!("No saved reports found.");
        return Ok(());
    }

    println!("Saved reports (showing {} entries)", reports.len());
    println!("{:-<80}", "");
    println!(
        "{:<10} {:<20} {:<12} {:<10} {:<20}",
        "Run", "Time", "Strategies", "Fastest", "Address"
    );
    println!("{:-<80}", "");

    for report in &reports {
        let local_time: DateTime<Local> = report.created_at.into();
        let fastest = report
            .fastest()
            .map(|m| m.strategy.name().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<20} {:<12} {:<10} {:<20}",
            report.run_id,
            local_time.format("%Y-%m-%d %H:%M:%S"),
            report.measurements.len(),
            fastest,
            report.address
        );
    }
    Ok(())
}

/// Shows a saved report by run id (prefix matching allowed)
pub fn handle_show_report(run_id: &str, json: bool) -> Result<()> {
    let store = ReportStore::open_default()?;
    let report: Report = match store.load(run_id) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("No report found matching run ID: {}", run_id);
            return Err(e);
        }
    };

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.table());
        println!();
        print!("{}", report.comparison());
    }
    Ok(())
}
