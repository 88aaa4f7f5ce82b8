//! Flagday - country of the day flag client
//!
//! Commands:
//! - `today`: flag of the day with country facts and map position
//! - `search`: ranked autocomplete with replayable key presses
//! - `browse`: full-text picker listing
//! - `locate`: map pixel position of a country
//! - `set`: change the flag of the day

mod cli;

use crate::cli::{CliArgs, Commands, Key};
use anyhow::{bail, Context};
use clap::Parser;
use flagday::config::Settings;
use flagday::matcher::sorted_by_name;
use flagday::source::AnySource;
use flagday::{
    full_text_matches, rank_matches, CommitPolicy, DataGateway, FactSheet, MapFrame, MatchResult,
    SelectionController,
};
use std::process::ExitCode;
use tracing::{debug, info, warn};

type Gateway = DataGateway<AnySource>;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let gateway = settings
        .gateway()
        .context("Failed to set up the flag data source")?;
    debug!("Using source {:?}", settings.source);

    match args.command {
        Commands::Today => run_today(&gateway, settings.map).await,
        Commands::Search {
            query,
            limit,
            keys,
            apply,
        } => {
            let limit = limit.unwrap_or(settings.suggestion_limit);
            run_search(&gateway, &query, limit, &keys, apply).await
        }
        Commands::Browse { query } => run_browse(&gateway, query.as_deref().unwrap_or("")).await,
        Commands::Locate {
            country,
            width,
            height,
        } => {
            let frame = MapFrame::new(
                width.unwrap_or(settings.map.width),
                height.unwrap_or(settings.map.height),
            );
            run_locate(&gateway, &country, frame).await
        }
        Commands::Set { country } => run_set(&gateway, &country).await,
    }
}

async fn run_today(gateway: &Gateway, frame: MapFrame) -> anyhow::Result<()> {
    let today = gateway
        .load_today()
        .await
        .context("Failed to load the flag of the day")?;

    println!("{}", FactSheet::new(&today.snapshot, today.facts.as_ref()));

    // A bad coordinate only drops the map line
    match gateway.locate(&today.snapshot.country, frame).await {
        Ok(Some(marker)) => println!(
            "  Map:        x={:.1}, y={:.1}",
            marker.position.x, marker.position.y
        ),
        Ok(None) => {}
        Err(e) => warn!("Cannot place {} on the map: {}", today.snapshot.country, e),
    }
    Ok(())
}

async fn run_search(
    gateway: &Gateway,
    query: &str,
    limit: usize,
    keys: &[Key],
    apply: bool,
) -> anyhow::Result<()> {
    let directory = gateway.load_country_directory().await;
    let matches = rank_matches(query, directory.records(), limit);

    if matches.is_empty() {
        println!("No matches for \"{}\"", query.trim());
        return Ok(());
    }
    for result in &matches {
        println!("{} {}", result.record.emoji, render_highlight(result, query));
    }

    let mut list = SelectionController::new().with_observer(
        |prev: Option<usize>, next: Option<usize>| {
            debug!("Focus moved from {:?} to {:?}", prev, next);
        },
    );
    list.replace(matches);

    let mut committed = None;
    for key in keys {
        match key {
            Key::Down => list.move_next(),
            Key::Up => list.move_previous(),
            Key::Enter => committed = list.commit(),
            Key::Tab => committed = list.commit_with(CommitPolicy::FirstCandidate),
        }
        if committed.is_some() {
            break;
        }
    }

    let Some(choice) = committed else {
        if let Some(focused) = list.focused_item() {
            println!();
            println!("Focused: {} {}", focused.record.emoji, focused.record.name);
        }
        if apply {
            bail!("Nothing was selected, so there is no flag to apply");
        }
        return Ok(());
    };

    let record = choice.record;
    println!();
    match gateway.load_selected_facts(&record.name).await {
        Some(facts) => println!("{}", FactSheet::for_country(&record, facts.as_ref())),
        None => debug!("Facts for {} superseded by a newer selection", record.name),
    }

    if apply {
        let reply = gateway
            .change_flag(&record.name)
            .await
            .with_context(|| format!("Failed to change the flag to {}", record.name))?;
        println!();
        println!("Success! {}", reply);
    }
    Ok(())
}

/// Query match shown in brackets, standing in for bold text
fn render_highlight(result: &MatchResult, query: &str) -> String {
    match result.highlight(query) {
        Some((before, matched, after)) => format!("{}[{}]{}", before, matched, after),
        None => result.record.name.clone(),
    }
}

async fn run_browse(gateway: &Gateway, query: &str) -> anyhow::Result<()> {
    let directory = gateway.load_country_directory().await;
    if directory.is_empty() {
        bail!("The country directory is unavailable");
    }

    let sorted = sorted_by_name(directory.records());
    let shown = full_text_matches(query, &sorted);
    for record in &shown {
        println!(
            "{} {}  {}",
            record.emoji,
            record.name,
            record.region.as_deref().unwrap_or("")
        );
    }
    info!("{} of {} countries shown", shown.len(), sorted.len());
    Ok(())
}

async fn run_locate(gateway: &Gateway, country: &str, frame: MapFrame) -> anyhow::Result<()> {
    let marker = gateway
        .locate(country, frame)
        .await
        .with_context(|| format!("Cannot place {} on the map", country))?;
    let Some(marker) = marker else {
        bail!("No coordinates found for country: {}", country);
    };

    println!(
        "{}: x={:.1}, y={:.1} (label at y={:.1}) on a {}x{} map",
        marker.label,
        marker.position.x,
        marker.position.y,
        marker.label_position.y,
        frame.width,
        frame.height
    );
    Ok(())
}

async fn run_set(gateway: &Gateway, country: &str) -> anyhow::Result<()> {
    let reply = gateway
        .change_flag(country)
        .await
        .with_context(|| format!("Failed to change the flag to {}", country.trim()))?;
    println!("Success! {}", reply);
    Ok(())
}
