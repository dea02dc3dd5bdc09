use anyhow::Result;
use clap::Parser;
use cli_table::{print_stdout, Cell, CellStruct, Style, Table, WithTitle};
use serde::Serialize;

use strava_cli::api::{Activity, ActivityList, Config};
use strava_cli::app::{self, App};
use strava_cli::auth::storage::JsonTokenStorage;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = app::Cli::parse();

    let mut logger = simple_logger::SimpleLogger::new().with_utc_timestamps();

    logger = match cli.verbose {
        0 => logger.with_level(log::LevelFilter::Error),
        1 => logger.with_level(log::LevelFilter::Info),
        2 => logger.with_level(log::LevelFilter::Debug),
        _ => logger.with_level(log::LevelFilter::Trace),
    };

    logger.init()?;

    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("loaded environment from {:?}", path);
    }

    let config = Config::from_env();

    let storage = JsonTokenStorage::new(cli.token_file.clone());
    log::debug!("token storage path: {:?}", storage.path());

    let app_instance = App::new(&config, &storage)?;

    match &cli.command {
        app::Commands::List {
            limit,
            after,
            before,
            json,
        } => {
            let activities = app_instance.list(*limit, *after, *before).await?;

            if *json {
                print_json(&ActivityList::new(&activities))?;
            } else if activities.is_empty() {
                println!("No activities found.");
            } else {
                println!("Your Strava Activities (showing {})", activities.len());
                print_stdout(activities.with_title())?;
            }
        }
        app::Commands::Get { id, json } => {
            let activity = app_instance.get(*id).await?;

            if *json {
                print_json(&activity)?;
            } else {
                print_details(&activity)?;
            }
        }
        app::Commands::Update(args) => {
            let update = args.to_update();

            if update.is_empty() {
                println!("No updates specified. Use --help to see available options.");
                return Ok(());
            }

            let activity = app_instance.update(args.id, update).await?;

            if args.json {
                print_json(&activity)?;
            } else {
                println!("Activity {} updated successfully!", args.id);
                println!("\n{}", activity.name);
                if let Some(description) = activity.description.as_deref().filter(|d| !d.is_empty())
                {
                    println!("{}", description);
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_details(activity: &Activity) -> Result<()> {
    println!("\nActivity: {}", activity.name);
    println!("ID: {}\n", activity.id);

    let rows: Vec<Vec<CellStruct>> = activity
        .detail_rows()
        .into_iter()
        .map(|(field, value)| vec![field.cell().bold(true), value.cell()])
        .collect();

    print_stdout(rows.table())?;

    Ok(())
}
