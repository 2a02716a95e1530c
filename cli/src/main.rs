// leadflow-cli: operator CLI for the lead list and campaign stores
//
// Cross-platform (macOS, Linux, Windows) command-line interface over the
// sled-backed leadflow stores.

mod config;
mod import;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

use leadflow_core::{
    sequence_ready, ActionKind, CampaignStatus, CampaignStore, HandleKind, LeadList, LeadListStore,
    Lz4Compression, Platform, SledMedium, MAX_LEAD_LISTS,
};

#[derive(Parser)]
#[command(name = "leadflow")]
#[command(about = "Leadflow: lead list and campaign store maintenance", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a lead list from a JSON table file
    Import {
        /// Name for the imported list
        name: String,
        /// Path to the table file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// List stored lead lists, newest first
    Lists,
    /// Show one lead list in full
    Show { id: String },
    /// Resolve the contact handle for one lead on one platform
    Value {
        list_id: String,
        row_index: usize,
        platform: Platform,
    },
    /// Delete a lead list
    Delete { id: String },
    /// Drop everything but the 10 most recently updated lists
    Prune,
    /// List stored campaigns
    Campaigns,
    /// Show one campaign and its sequence
    Campaign { id: String },
    /// Show store counts and paths
    Status,
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { name, file } => cmd_import(name, file),
        Commands::Lists => cmd_lists(),
        Commands::Show { id } => cmd_show(&id),
        Commands::Value {
            list_id,
            row_index,
            platform,
        } => cmd_value(&list_id, row_index, platform),
        Commands::Delete { id } => cmd_delete(&id),
        Commands::Prune => cmd_prune(),
        Commands::Campaigns => cmd_campaigns(),
        Commands::Campaign { id } => cmd_campaign(&id),
        Commands::Status => cmd_status(),
        Commands::Config { action } => cmd_config(action),
    }
}

/// One sled handle per invocation, shared by every store that needs it
fn open_medium(config: &config::Config) -> Result<Arc<SledMedium>> {
    let store_path = config.storage_dir()?.join("store");
    tracing::debug!("Opening store at {}", store_path.display());
    let medium = SledMedium::open(&store_path)
        .with_context(|| format!("Failed to open store at {}", store_path.display()))?;
    Ok(Arc::new(medium))
}

fn open_lead_store(medium: Arc<SledMedium>) -> LeadListStore {
    LeadListStore::open(medium, Arc::new(Lz4Compression))
}

fn cmd_import(name: String, file: PathBuf) -> Result<()> {
    let config = config::Config::load()?;
    let table = import::load(&file)?;
    let medium = open_medium(&config)?;
    let mut store = open_lead_store(medium);

    let rows = table.rows.len();
    let at_capacity = store.len() == MAX_LEAD_LISTS;
    let list = store.add_list(name, table.columns, table.rows, table.mappings)?;

    println!(
        "{} Imported {} ({} leads)",
        "✓".green(),
        list.name.bright_cyan(),
        rows
    );
    println!("  {}", list.id.dimmed());
    if at_capacity {
        println!(
            "  {}",
            "List slots were full; the least recently updated list was dropped.".yellow()
        );
    }
    Ok(())
}

fn cmd_lists() -> Result<()> {
    let config = config::Config::load()?;
    let medium = open_medium(&config)?;
    let store = open_lead_store(medium);

    if store.is_empty() {
        println!("{}", "No lead lists yet.".dimmed());
        return Ok(());
    }

    println!(
        "{} ({} of {} slots)",
        "Lead Lists".bold(),
        store.len(),
        MAX_LEAD_LISTS
    );
    println!();

    let mut lists: Vec<&LeadList> = store.lists().iter().collect();
    lists.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    for list in lists {
        println!(
            "  {} {} ({} leads, updated {})",
            "•".bright_green(),
            list.name.bright_cyan(),
            list.leads.len(),
            format_timestamp(list.updated_at)
        );
        println!("    {}", list.id.dimmed());
    }
    Ok(())
}

fn cmd_show(id: &str) -> Result<()> {
    let config = config::Config::load()?;
    let medium = open_medium(&config)?;
    let store = open_lead_store(medium);

    let list = match store.get_list(id) {
        Some(list) => list,
        None => anyhow::bail!("No lead list with id {}", id),
    };

    println!("{}", list.name.bold());
    println!();
    println!("  id:      {}", list.id);
    println!("  columns: {}", list.columns.join(", "));
    println!("  leads:   {}", list.leads.len());
    println!("  created: {}", format_timestamp(list.created_at));
    println!("  updated: {}", format_timestamp(list.updated_at));

    if list.platform_mappings.is_empty() {
        println!("  mappings: {}", "(none)".dimmed());
    } else {
        println!("  mappings:");
        for (platform, mapping) in &list.platform_mappings {
            println!(
                "    {} reads column {} as {}",
                platform.to_string().bright_cyan(),
                mapping.column,
                kind_label(mapping.kind)
            );
        }
    }

    if !list.leads.is_empty() && config.preview_rows > 0 {
        println!();
        println!("{}", "Preview".bold());
        for row in list.leads.iter().take(config.preview_rows) {
            let cells: Vec<&str> = list
                .columns
                .iter()
                .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
                .collect();
            println!("  {}", cells.join(" | "));
        }
        if list.leads.len() > config.preview_rows {
            let more = list.leads.len() - config.preview_rows;
            println!("  {}", format!("... {} more rows", more).dimmed());
        }
    }
    Ok(())
}

fn cmd_value(list_id: &str, row_index: usize, platform: Platform) -> Result<()> {
    let config = config::Config::load()?;
    let medium = open_medium(&config)?;
    let store = open_lead_store(medium);

    match store.get_lead_value(list_id, row_index, platform) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => anyhow::bail!(
            "No {} handle for row {} of list {}",
            platform,
            row_index,
            list_id
        ),
    }
}

fn cmd_delete(id: &str) -> Result<()> {
    let config = config::Config::load()?;
    let medium = open_medium(&config)?;
    let mut store = open_lead_store(medium);

    let name = match store.get_list(id) {
        Some(list) => list.name.clone(),
        None => anyhow::bail!("No lead list with id {}", id),
    };

    store.delete_list(id)?;
    println!("{} Deleted {}", "✓".green(), name.bright_cyan());
    Ok(())
}

fn cmd_prune() -> Result<()> {
    let config = config::Config::load()?;
    let medium = open_medium(&config)?;
    let mut store = open_lead_store(medium);

    let before = store.len();
    store.clear_old_lists()?;
    let dropped = before - store.len();

    if dropped == 0 {
        println!("Nothing to prune ({} lists stored).", before);
    } else {
        println!("{} Pruned {} of {} lists.", "✓".green(), dropped, before);
    }
    Ok(())
}

fn cmd_campaigns() -> Result<()> {
    let config = config::Config::load()?;
    let medium = open_medium(&config)?;
    let store = CampaignStore::open(medium);

    if store.is_empty() {
        println!("{}", "No campaigns yet.".dimmed());
        return Ok(());
    }

    println!("{}", "Campaigns".bold());
    println!();

    for campaign in store.campaigns() {
        println!(
            "  {} {} [{}] ({} steps, updated {})",
            "•".bright_green(),
            campaign.name.bright_cyan(),
            status_colored(campaign.status),
            campaign.sequence.len(),
            format_timestamp(campaign.updated_at)
        );
        println!("    {}", campaign.id.dimmed());
    }
    Ok(())
}

fn cmd_campaign(id: &str) -> Result<()> {
    let config = config::Config::load()?;
    let medium = open_medium(&config)?;
    let store = CampaignStore::open(medium);

    let campaign = match store.get_campaign(id) {
        Some(campaign) => campaign,
        None => anyhow::bail!("No campaign with id {}", id),
    };

    println!(
        "{} [{}]",
        campaign.name.bold(),
        status_colored(campaign.status)
    );
    if !campaign.description.is_empty() {
        println!("{}", campaign.description.dimmed());
    }
    println!();
    println!("  id:        {}", campaign.id);
    println!("  platforms: {}", join_platforms(&campaign.platforms));
    println!("  lists:     {}", join_or_none(&campaign.lead_list_ids));
    println!("  accounts:  {}", join_or_none(&campaign.accounts));
    println!(
        "  window:    {} to {} ({})",
        campaign.schedule.start_time, campaign.schedule.end_time, campaign.schedule.timezone
    );
    println!("  created:   {}", format_timestamp(campaign.created_at));
    println!("  updated:   {}", format_timestamp(campaign.updated_at));
    println!();

    if campaign.sequence.is_empty() {
        println!("{}", "Empty sequence.".dimmed());
        return Ok(());
    }

    if sequence_ready(&campaign.sequence) {
        println!("{} ({})", "Sequence".bold(), "ready".green());
    } else {
        println!(
            "{} ({})",
            "Sequence".bold(),
            "variant weights off 100".red()
        );
    }
    for (i, step) in campaign.sequence.iter().enumerate() {
        match step.action {
            ActionKind::Wait => {
                println!("  {}. wait {}h", i + 1, step.delay_hours);
            }
            action => {
                let platform = step
                    .platform
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "any platform".to_string());
                let weights: Vec<String> =
                    step.variants.iter().map(|v| v.weight.to_string()).collect();
                println!(
                    "  {}. {} on {} ({} variants, weights {})",
                    i + 1,
                    action_label(action),
                    platform,
                    step.variants.len(),
                    weights.join("/")
                );
            }
        }
    }
    Ok(())
}

fn cmd_status() -> Result<()> {
    let config = config::Config::load()?;
    let data_dir = config.storage_dir()?;
    let medium = open_medium(&config)?;
    let leads = open_lead_store(medium.clone());
    let campaigns = CampaignStore::open(medium);

    println!("{}", "Leadflow Status".bold());
    println!();

    println!("Lead lists: {} of {}", leads.len(), MAX_LEAD_LISTS);
    let active = campaigns
        .campaigns()
        .iter()
        .filter(|c| c.status == CampaignStatus::Active)
        .count();
    println!("Campaigns:  {} ({} active)", campaigns.len(), active);
    println!();

    println!("Data directory: {}", data_dir.display());
    println!("Config file:    {}", config::Config::config_file()?.display());
    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = config::Config::load()?;

    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{} Set {} = {}", "✓".green(), key.bright_cyan(), value);
        }

        ConfigAction::Get { key } => {
            if let Some(value) = config.get(&key) {
                println!("{} = {}", key.bright_cyan(), value);
            } else {
                anyhow::bail!("Unknown config key: {}", key);
            }
        }

        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            println!();

            for (key, value) in config.list() {
                println!("  {:<20} {}", key.bright_cyan(), value);
            }

            println!();
            println!("Config file: {}", config::Config::config_file()?.display());
        }
    }

    Ok(())
}

fn join_platforms(platforms: &[Platform]) -> String {
    if platforms.is_empty() {
        return "(none)".to_string();
    }
    platforms
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn kind_label(kind: HandleKind) -> &'static str {
    match kind {
        HandleKind::Username => "username",
        HandleKind::ProfileUrl => "profile url",
    }
}

fn action_label(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Message => "message",
        ActionKind::Wait => "wait",
        ActionKind::FollowUp => "follow-up",
        ActionKind::End => "end",
    }
}

fn status_colored(status: CampaignStatus) -> ColoredString {
    match status {
        CampaignStatus::Draft => status.as_str().yellow(),
        CampaignStatus::Active => status.as_str().green(),
        CampaignStatus::Paused => status.as_str().cyan(),
        CampaignStatus::Completed => status.as_str().dimmed(),
    }
}

fn format_timestamp(timestamp_ms: u64) -> String {
    use chrono::{DateTime, Local, Utc};

    let dt = DateTime::from_timestamp_millis(timestamp_ms as i64).unwrap_or_else(|| Utc::now());
    let local: DateTime<Local> = dt.into();

    local.format("%Y-%m-%d %H:%M:%S").to_string()
}
