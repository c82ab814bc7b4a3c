use anyhow::Context;
use chrono::Local;
use inquire::{Confirm, CustomType, DateSelect, InquireError, Select, Text};

use climascope_core::{Config, GeoCoordinate};

use crate::cli::App;

const SMART_SEARCH: &str = "Smart search";
const MANUAL_SEARCH: &str = "Manual search";
const USE_MY_LOCATION: &str = "Use my location";
const QUIT: &str = "Quit";

/// Map Esc/Ctrl-C to `None` so the session loop can continue or exit
/// gracefully instead of erroring.
fn or_cancel<T>(res: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Prompt failed"),
    }
}

/// Interactive search session: pick a modality, fill its fields, submit.
pub async fn session(app: &mut App) -> anyhow::Result<()> {
    println!("ClimaScope: historical rain likelihood for a place and date");

    loop {
        let choice = or_cancel(
            Select::new(
                "Search by:",
                vec![SMART_SEARCH, MANUAL_SEARCH, USE_MY_LOCATION, QUIT],
            )
            .prompt(),
        )?;

        let outcome = match choice {
            Some(SMART_SEARCH) => {
                let text = or_cancel(
                    Text::new("Your question:")
                        .with_initial_value(app.form().prompt_text())
                        .with_placeholder("Will it rain in Neeloor on September 2nd?")
                        .prompt(),
                )?;
                match text {
                    Some(text) => Some(app.ask(text).await),
                    None => None,
                }
            }
            Some(MANUAL_SEARCH) => {
                let location = or_cancel(
                    Text::new("Location:")
                        .with_initial_value(app.form().location_text())
                        .with_placeholder("e.g., Paris, France")
                        .prompt(),
                )?;
                let Some(location) = location else { continue };

                let date = or_cancel(
                    DateSelect::new("Date:")
                        .with_default(Local::now().date_naive())
                        .prompt(),
                )?;
                let Some(date) = date else { continue };

                Some(app.show(location, date.format("%Y-%m-%d").to_string()).await)
            }
            Some(USE_MY_LOCATION) => {
                let date = or_cancel(
                    DateSelect::new("Date:")
                        .with_default(Local::now().date_naive())
                        .prompt(),
                )?;
                let Some(date) = date else { continue };

                Some(app.here(date.format("%Y-%m-%d").to_string()).await)
            }
            Some(QUIT) | None => break,
            Some(_) => continue,
        };

        if let Some(Err(err)) = outcome {
            eprintln!("Error: {err}");
        }
        println!();
    }

    Ok(())
}

/// Interactive configuration of the service endpoint and the pinned home
/// coordinate used by the current-location action.
pub fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let base_url = Text::new("Service base URL:")
        .with_initial_value(config.base_url())
        .prompt()
        .context("Failed to read base URL")?;
    config.set_base_url(base_url.trim().trim_end_matches('/'));

    let pin = Confirm::new("Pin a home coordinate for 'Use my location'?")
        .with_default(config.home_coordinate().is_some())
        .prompt()
        .context("Failed to read confirmation")?;

    if pin {
        let lat = CustomType::<f64>::new("Home latitude:")
            .with_help_message("-90 to 90")
            .prompt()
            .context("Failed to read latitude")?;
        let lon = CustomType::<f64>::new("Home longitude:")
            .with_help_message("-180 to 180")
            .prompt()
            .context("Failed to read longitude")?;
        config.set_home(GeoCoordinate::new(lat, lon));
    } else {
        config.clear_home();
    }

    config.save()?;
    println!("Saved to {}", Config::config_file_path()?.display());

    Ok(())
}
