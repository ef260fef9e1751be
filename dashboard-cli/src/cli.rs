use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dashboard_core::{
    Choice, ConditionCategory, Config, Dashboard, EntryFilterCriteria, FilterCriteria,
    ImageAttachment, NewEntry, TemperatureBand,
};
use inquire::{Confirm, CustomType, Select, Text};
use tracing::{debug, info};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "City weather dashboard")]
pub struct Cli {
    /// Weather service URL for this run, instead of the configured one.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log requests and roster changes to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit the service URL, page size and notification duration.
    Configure,

    /// Check that the weather service answers.
    Health,

    /// Add cities and print their weather cards.
    Show {
        /// One or more city names.
        #[arg(required = true)]
        cities: Vec<String>,

        /// Only cities whose name contains this text.
        #[arg(long, default_value = "")]
        search: String,

        /// all, hot, warm or cold.
        #[arg(long, default_value = "all")]
        band: TemperatureBand,

        /// all, clear, clouds, rain or snow.
        #[arg(long, default_value = "all")]
        condition: ConditionCategory,

        /// Refresh every city once after adding them.
        #[arg(long)]
        refresh: bool,
    },

    /// Browse submitted entries.
    Entries {
        /// Only entries whose city contains this text.
        #[arg(long, default_value = "")]
        city: String,

        /// Exact condition (case-insensitive), or "all".
        #[arg(long, default_value = "all")]
        condition: String,

        /// Exact origin, or "all".
        #[arg(long, default_value = "all")]
        origin: String,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Submit a new entry.
    Submit {
        #[arg(long)]
        name: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        condition: String,

        #[arg(long)]
        description: String,

        /// Image file to attach.
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Keep one roster in memory and manage it from a menu.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        debug!(command = ?self.command, base_url = ?self.base_url, "running command");
        let mut dashboard = match self.command {
            Command::Configure => return configure(),
            _ => open_dashboard(self.base_url.as_deref())?,
        };

        match self.command {
            Command::Configure => {}
            Command::Health => {
                dashboard.check_service().await;
            }
            Command::Show { cities, search, band, condition, refresh } => {
                for city in &cities {
                    // failures are reported as notifications
                    let _ = dashboard.add_city(city).await;
                }
                if refresh {
                    let _ = dashboard.refresh_all().await;
                }
                dashboard.set_filter(
                    FilterCriteria::default()
                        .with_search(search)
                        .with_band(band)
                        .with_condition(condition),
                );
                println!("{}", render::city_list(&dashboard.visible_cities()));
            }
            Command::Entries { city, condition, origin, page } => {
                dashboard.entries().set_criteria(EntryFilterCriteria {
                    city_text: city,
                    condition: Choice::parse(&condition),
                    origin: Choice::parse(&origin),
                });
                dashboard.entries().go_to(page);
                let view = dashboard.load_entries().await;
                println!("{}", render::entry_view(&view));
            }
            Command::Submit { name, city, condition, description, image } => {
                let image = image.as_deref().map(read_image).transpose()?;
                if let Some(image) = &image {
                    debug!(file = %image.file_name, bytes = image.bytes.len(), "attaching image");
                }
                let new = NewEntry { submitter_name: name, city, condition, description, image };
                if let Ok(created) = dashboard.submit_entry(&new).await {
                    println!("Created entry #{} for {}", created.id, created.city);
                }
            }
            Command::Interactive => return interactive(&mut dashboard).await,
        }

        render::print_notifications(&dashboard.notifications().drain());
        Ok(())
    }
}

fn open_dashboard(base_url: Option<&str>) -> anyhow::Result<Dashboard> {
    let mut config = Config::load()?;
    if let Some(url) = base_url {
        config.set_api_base_url(url);
        debug!(api_base_url = %config.api_base_url, "base url overridden from the command line");
    }
    Dashboard::from_config(&config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_default();

    let url = Text::new("Weather service URL:")
        .with_default(&config.api_base_url)
        .prompt()?;
    config.set_api_base_url(&url);

    config.entries_page_size = CustomType::<usize>::new("Entries per page:")
        .with_default(config.entries_page_size)
        .with_error_message("Please type a whole number")
        .prompt()?;

    config.notification_display_ms = CustomType::<u64>::new("Notification duration (ms):")
        .with_default(config.notification_display_ms)
        .with_error_message("Please type a whole number")
        .prompt()?;

    config.validate()?;
    config.save()?;
    info!(api_base_url = %config.api_base_url, "configuration saved");
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn read_image(path: &Path) -> anyhow::Result<ImageAttachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let content_type = content_type_for(path).to_string();
    Ok(ImageAttachment { file_name, content_type, bytes })
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

const ADD: &str = "Add a city";
const REFRESH: &str = "Refresh all";
const FILTER: &str = "Change filters";
const CLEAR: &str = "Remove all cities";
const QUIT: &str = "Quit";

async fn interactive(dashboard: &mut Dashboard) -> anyhow::Result<()> {
    dashboard.check_service().await;

    loop {
        render::print_notifications(&dashboard.notifications().active());

        let choice = Select::new("What next?", vec![ADD, REFRESH, FILTER, CLEAR, QUIT]).prompt()?;
        match choice {
            ADD => {
                let name = Text::new("City:").prompt()?;
                let _ = dashboard.add_city(&name).await;
            }
            REFRESH => {
                let _ = dashboard.refresh_all().await;
            }
            FILTER => {
                let search = Text::new("Name contains:")
                    .with_default(&dashboard.filter().search_term)
                    .prompt()?;
                let band = Select::new("Temperature:", TemperatureBand::all().to_vec()).prompt()?;
                let condition =
                    Select::new("Condition:", ConditionCategory::all().to_vec()).prompt()?;
                dashboard.set_filter(
                    FilterCriteria::default()
                        .with_search(search)
                        .with_band(band)
                        .with_condition(condition),
                );
            }
            CLEAR => {
                let confirmed = Confirm::new("Remove every city from the list?")
                    .with_default(false)
                    .prompt()?;
                if confirmed {
                    dashboard.clear_cities();
                }
            }
            _ => break,
        }

        println!("{}\n", render::city_list(&dashboard.visible_cities()));
    }

    Ok(())
}
