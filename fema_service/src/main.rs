use std::error::Error;
use std::process::ExitCode;

use chrono::Utc;

use fema_service::analysis::classify::ClassifyOptions;
use fema_service::cli::{self, USAGE};
use fema_service::config::DashboardConfig;
use fema_service::ingest::fema;
use fema_service::logging::{self, Component};
use fema_service::report;
use fema_service::session::DashboardSession;
use fema_service::verify;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fema_dashboard: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let args = cli::parse_args(std::env::args().skip(1))?;
    if args.help {
        print!("{}", USAGE);
        return Ok(());
    }

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    args.apply_to(&mut config)?;

    logging::init_logger(
        config.logging.min_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    if args.verify {
        let client = fema::build_client(config.source.timeout())?;
        let result = verify::verify_endpoint(&client, &config.source.url);
        verify::print_verification(&result);
        return Ok(());
    }

    let options = ClassifyOptions {
        window_days: config.classify.window_days,
        reference_instant: args.as_of,
    };
    let reference = options.resolve_reference();
    let now = Utc::now();

    let mut session = DashboardSession::new(config)?;
    logging::info(
        Component::System,
        None,
        &format!(
            "Building report from {} as of {} ({}-day window)",
            session.source_label(),
            reference.format("%Y-%m-%d %H:%M"),
            options.window_days
        ),
    );

    // One load per run: the report and the optional snapshot share it.
    let raw = session.load_raw_at(now)?;
    if let Some(path) = &args.save_snapshot {
        session.save_snapshot(&raw, path)?;
    }

    let report = session.build_report_from(&raw, reference);
    if args.json {
        println!("{}", report::render_json(&report)?);
    } else {
        print!("{}", report::render_text(&report));
    }

    Ok(())
}
