use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use concat_bench::config::{parse_benchtime, parse_bind_addr};
use concat_bench::{setup, BenchError, Harness, HarnessConfig, ReportStore, Request, Result, Strategy};

use crate::{RunArgs, SampleArgs};

/// Measures the selected strategies and prints the report
pub fn handle_run(args: RunArgs) -> Result<()> {
    let strategies = Strategy::parse_list(args.strategies.as_slice())?;

    let mut config = HarnessConfig::default()
        .with_request_id(args.id)
        .with_bind_addr(parse_bind_addr(&args.bind)?)
        .with_capacity_hint(args.capacity)
        .with_max_iterations(args.max_iterations);
    config = match args.iterations {
        Some(n) => config.with_iterations(n),
        None => config.with_benchtime(parse_benchtime(&args.benchtime)?),
    };
    if args.no_allocs {
        config = config.without_allocs();
    }

    let harness = Harness::new(config)?;
    let report = harness.run_all(&strategies)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.table());
        println!();
        print!("{}", report.comparison());
    }

    if args.save {
        let store = ReportStore::open_default()?;
        let path = store.save(&report)?;
        if args.json {
            eprintln!("Saved report {} to {}", report.run_id, path.display());
        } else {
            println!("\nSaved report {} to {}", report.run_id, path.display());
        }
    }

    Ok(())
}

/// Prints one line per strategy, built from the same inputs
pub fn handle_sample(args: SampleArgs) -> Result<()> {
    let strategies = Strategy::parse_list(args.strategies.as_slice())?;
    let now = match args.at {
        Some(ref at) => parse_instant(at)?,
        None => Utc::now(),
    };

    // Applies to both a pinned --addr and a bound listener.
    let config = HarnessConfig::default()
        .with_request_id(args.id.clone())
        .with_bind_addr(parse_bind_addr(&args.bind)?);
    config.validate()?;

    // The listener only has to outlive the sampling loop.
    let (request, _listener, addr) = match args.addr {
        Some(ref text) => {
            let addr: SocketAddr = text.parse().map_err(|e| {
                BenchError::InvalidConfig(format!("invalid address '{}': {}", text, e))
            })?;
            (Request::new(config.request_id.clone()), None, addr)
        }
        None => {
            let (request, listener) = setup(&config)?;
            let addr = *listener.addr();
            (request, Some(listener), addr)
        }
    };

    for strategy in strategies {
        println!(
            "{:<8} {}",
            strategy.name(),
            strategy.build(&request, &addr, &now, args.capacity)
        );
    }
    Ok(())
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| BenchError::InvalidConfig(format!("invalid timestamp '{}': {}", s, e)))
}
