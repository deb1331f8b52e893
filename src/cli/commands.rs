use crate::analyzers::StoreAnalyzer;
use crate::cli::args::{AggregationArgs, Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::models::{AggLoc, QueryOptions, WeatherRecord};
use crate::store::WeatherExtractor;
use crate::utils::coordinates::{parse_bounding_box, parse_point};
use crate::utils::filename::generate_default_export_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::TsvWriter;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let silent = cli.quiet || !settings.show_progress;

    match &cli.command {
        Commands::Actual {
            input,
            from,
            to,
            aggregation,
        } => {
            let options = query_options(aggregation, &settings)?;
            let extractor = load_extractor(input, &cli, &settings, silent)?;

            println!(
                "Actual weather {} to {} ({} / {})",
                from, to, options.aggtime, options.aggloc.name()
            );
            let records = extractor.get_actual(*from, *to, &options)?;
            report_records(&records, aggregation, "actual")?;
        }

        Commands::Forecast {
            input,
            base,
            from,
            to,
            aggregation,
        } => {
            let options = query_options(aggregation, &settings)?;
            let extractor = load_extractor(input, &cli, &settings, silent)?;

            println!(
                "Forecast from {} for {} to {} ({} / {})",
                base,
                from,
                to,
                options.aggtime,
                options.aggloc.name()
            );
            let records = extractor.get_forecast(*base, *from, *to, &options)?;
            report_records(&records, aggregation, "forecast")?;
        }

        Commands::Info { input } => {
            let extractor = load_extractor(input, &cli, &settings, silent)?;
            let summary = StoreAnalyzer::new().summarize(extractor.messages())?;
            println!("\n{}", summary.summary());
        }

        Commands::Convert { input, output } => {
            let extractor = load_extractor(input, &cli, &settings, silent)?;
            ensure_parent(output)?;
            let path = extractor.store(output)?;
            println!("Stored {} messages in {}", extractor.len(), path.display());
        }
    }

    Ok(())
}

fn load_extractor(
    input: &[PathBuf],
    cli: &Cli,
    settings: &Settings,
    silent: bool,
) -> Result<WeatherExtractor> {
    let progress = ProgressReporter::for_files(input.len(), silent);
    let mut extractor = WeatherExtractor::new().with_country(settings.country);
    extractor.load(input, cli.format, Some(&progress))?;
    progress.finish_with_message(&format!("Loaded {} messages", extractor.len()));
    Ok(extractor)
}

fn query_options(args: &AggregationArgs, settings: &Settings) -> Result<QueryOptions> {
    let aggtime = match &args.aggtime {
        Some(aggtime) => aggtime.parse()?,
        None => settings.default_aggtime,
    };

    let points = if args.points.is_empty() {
        None
    } else {
        Some(
            args.points
                .iter()
                .map(|p| parse_point(p))
                .collect::<Result<Vec<_>>>()?,
        )
    };
    let bbox = args.bbox.as_deref().map(parse_bounding_box).transpose()?;

    let mut options = QueryOptions::new(aggtime, AggLoc::from_args(&args.aggloc, points, bbox)?);
    if let Some(policy) = &args.policy {
        options = options.with_policy(policy.parse()?);
    }
    Ok(options)
}

fn report_records(records: &[WeatherRecord], args: &AggregationArgs, kind: &str) -> Result<()> {
    if records.is_empty() {
        println!("No messages in the requested window");
        return Ok(());
    }

    println!("{} records", records.len());
    for record in records.iter().take(args.sample) {
        let preview: Vec<String> = record.values.iter().take(4).map(|v| format!("{:.2}", v)).collect();
        println!(
            "  {:<5} {} -> {} (+{}d) [{}{}]",
            record.short_name,
            record.valid_date_time,
            record.validity_date_time,
            record.day_offset(),
            preview.join(", "),
            if record.values.len() > 4 { ", ..." } else { "" }
        );
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| generate_default_export_filename(kind));
    ensure_parent(&output)?;

    let skipped: Vec<&str> = args.skip_params.iter().map(String::as_str).collect();
    let rows = TsvWriter::new()
        .with_layout(args.layout)
        .with_skipped_params(&skipped)
        .write_records(records, &output)?;
    info!("Wrote {} rows to {}", rows, output.display());
    println!("Wrote {} rows to {}", rows, output.display());

    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
