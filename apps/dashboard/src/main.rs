use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use campaign_wizard::{MediaCandidate, WizardController, WizardPorts};
use clap::{Parser, Subcommand};
use client_core::DashboardClient;
use shared::{
    domain::{CampaignId, CampaignStatus},
    money::format_brl,
    protocol::{CompanyRegistration, CreateTotemRequest},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod campaign_flow;
mod config;
mod preview;
mod reauth;
mod token_store;

use campaign_flow::{resolve_placements, stage_campaign, CampaignManifest, StagedCampaign};
use config::{load_settings, Settings};
use preview::TempFilePreviews;
use reauth::clears_session;
use token_store::TokenStore;

#[derive(Parser, Debug)]
#[command(name = "totem-dashboard", about = "Manage LED totem advertising campaigns")]
struct Cli {
    /// Overrides the backend base URL from settings.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    /// Registers a company from a TOML file.
    Signup {
        #[arg(long)]
        file: PathBuf,
    },
    Campaigns {
        #[command(subcommand)]
        action: CampaignCommand,
    },
    Totems {
        #[command(subcommand)]
        action: TotemCommand,
    },
    Payments {
        #[command(subcommand)]
        action: PaymentCommand,
    },
    Balance,
    TopUp {
        amount: f64,
    },
    /// Sends an action to a totem listening on the backend's event stream.
    Push {
        client_id: String,
        action: String,
    },
}

#[derive(Subcommand, Debug)]
enum CampaignCommand {
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        status: Option<String>,
    },
    Show {
        id: i64,
        /// Downloads the campaign's media to this path.
        #[arg(long)]
        save_media: Option<PathBuf>,
    },
    Approve {
        id: i64,
    },
    Deny {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    Deactivate {
        id: i64,
    },
    Create {
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long)]
        media: Option<PathBuf>,
        /// Clip length in seconds, as reported by the player.
        #[arg(long)]
        duration: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum TotemCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
    },
}

#[derive(Subcommand, Debug)]
enum PaymentCommand {
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    let store = TokenStore::new(settings.token_path.clone());

    let result = run(cli.command, &settings, &store).await;
    if let Err(err) = &result {
        if clears_session(err) {
            warn!("backend rejected the session; run `login` again");
            store.clear()?;
        }
    }
    result
}

fn connect(settings: &Settings, store: &TokenStore) -> Result<DashboardClient> {
    let client = DashboardClient::new(&settings.api_base_url)
        .with_context(|| format!("invalid api base url '{}'", settings.api_base_url))?;
    match store.load()? {
        Some(token) => Ok(client.with_token(&token)?),
        None => Ok(client),
    }
}

async fn run(command: Command, settings: &Settings, store: &TokenStore) -> Result<()> {
    match command {
        Command::Login { user, password } => {
            let client = connect(settings, store)?;
            let claims = client.login(&user, &password).await?;
            if let Some(token) = client.token().await {
                store.save(&token)?;
            }
            println!(
                "Signed in as user {} (roles: {})",
                claims.id,
                claims.role.join(", ")
            );
        }
        Command::Logout => {
            store.clear()?;
            println!("Signed out.");
        }
        Command::Whoami => {
            let client = connect(settings, store)?;
            let Some(claims) = client.claims().await else {
                println!("Not signed in.");
                return Ok(());
            };
            let valid = client.check_token().await?;
            println!("user id:    {}", claims.id);
            println!("company id: {}", claims.company_id.map(|c| c.to_string()).unwrap_or_else(|| "-".into()));
            println!("admin:      {}", claims.is_admin());
            println!("token:      {}", if valid { "valid" } else { "expired" });
        }
        Command::Signup { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let registration: CompanyRegistration = toml::from_str(&raw)
                .with_context(|| format!("invalid company file '{}'", file.display()))?;
            connect(settings, store)?
                .register_company(&registration)
                .await?;
            println!("Company '{}' registered.", registration.fantasy_name);
        }
        Command::Campaigns { action } => run_campaigns(action, settings, store).await?,
        Command::Totems { action } => {
            let client = connect(settings, store)?;
            match action {
                TotemCommand::List => {
                    for totem in client.list_totems().await? {
                        println!(
                            "{:>5}  {:<30} {:>10.5} {:>10.5}  {}",
                            totem.id,
                            totem.name,
                            totem.latitude,
                            totem.longitude,
                            if totem.enabled { "enabled" } else { "disabled" }
                        );
                    }
                }
                TotemCommand::Create {
                    name,
                    latitude,
                    longitude,
                } => {
                    client
                        .create_totem(&CreateTotemRequest {
                            name: name.clone(),
                            latitude,
                            longitude,
                        })
                        .await?;
                    println!("Totem '{name}' created.");
                }
            }
        }
        Command::Payments {
            action: PaymentCommand::List,
        } => {
            let client = connect(settings, store)?;
            for payment in client.list_payments().await? {
                println!(
                    "{:>5}  {:<25} {:>15}  {}",
                    payment.id,
                    payment.created_at,
                    format_brl(payment.amount),
                    payment.status
                );
            }
        }
        Command::Balance => {
            let balance = connect(settings, store)?.bank_balance().await?;
            println!("Balance: {}", format_brl(balance.balance));
        }
        Command::TopUp { amount } => {
            let secret = connect(settings, store)?
                .create_payment_intent(amount)
                .await?;
            println!("Payment of {} started.", format_brl(amount));
            println!("Client secret: {secret}");
        }
        Command::Push { client_id, action } => {
            connect(settings, store)?
                .send_action(&client_id, &action)
                .await?;
            println!("Action '{action}' sent to {client_id}.");
        }
    }
    Ok(())
}

async fn run_campaigns(action: CampaignCommand, settings: &Settings, store: &TokenStore) -> Result<()> {
    let client = connect(settings, store)?;
    match action {
        CampaignCommand::List { page, size, status } => {
            let size = size.unwrap_or(settings.page_size);
            let listing = client.list_campaigns(page, size).await?;
            let rows: Vec<_> = match status {
                Some(status) => listing.filter_by_status(&CampaignStatus::from(status)),
                None => listing.content.iter().collect(),
            };
            for campaign in rows {
                println!(
                    "{:>5}  {:<10} {:<30} {} -> {}  {}",
                    campaign.id, campaign.status, campaign.name, campaign.from, campaign.to, campaign.goal
                );
            }
            println!("page {} (size {})", listing.page, listing.size);
        }
        CampaignCommand::Show { id, save_media } => {
            let detail = client.campaign(CampaignId(id)).await?;
            println!("Ad name:      {}", detail.ad_name);
            println!("Status:       {}", detail.status);
            println!("Objective:    {}", detail.objective);
            println!("Budget:       {} ({})", format_brl(detail.budget_value), detail.budget_type);
            println!("Schedule:     {} -> {}", detail.start_date, detail.end_date);
            if let Some(company) = &detail.company {
                println!("Company:      {} ({})", company.fantasy_name, company.cnpj);
            }
            for totem in &detail.totems {
                println!("  * {} ({:.5}, {:.5})", totem.name, totem.latitude, totem.longitude);
            }
            if let Some(path) = save_media {
                let file_id = detail
                    .file_id
                    .with_context(|| format!("campaign {id} has no media"))?;
                let bytes = client.campaign_media(file_id).await?;
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("failed to write '{}'", path.display()))?;
                println!("Media saved to {} ({} bytes)", path.display(), bytes.len());
            }
        }
        CampaignCommand::Approve { id } => {
            client
                .configure_status(CampaignId(id), CampaignStatus::Approved, None)
                .await?;
            println!("Campaign {id} approved.");
        }
        CampaignCommand::Deny { id, reason } => {
            client
                .configure_status(CampaignId(id), CampaignStatus::Denied, reason)
                .await?;
            println!("Campaign {id} denied.");
        }
        CampaignCommand::Deactivate { id } => {
            client
                .configure_status(CampaignId(id), CampaignStatus::Inactive, None)
                .await?;
            println!("Campaign {id} deactivated.");
        }
        CampaignCommand::Create {
            manifest,
            media,
            duration,
        } => create_campaign(Arc::new(client), manifest, media, duration).await?,
    }
    Ok(())
}

async fn create_campaign(
    client: Arc<DashboardClient>,
    manifest_path: PathBuf,
    media_path: Option<PathBuf>,
    duration_secs: Option<f64>,
) -> Result<()> {
    let manifest = CampaignManifest::load(&manifest_path)?;
    let totems = client.list_totems().await?;

    let media = match media_path {
        Some(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read media '{}'", path.display()))?;
            let mime_type = mime_guess::from_path(&path)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string();
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("media.bin")
                .to_string();
            Some(MediaCandidate {
                file_name,
                mime_type,
                duration_secs,
                bytes,
            })
        }
        None => None,
    };

    let staged = StagedCampaign {
        objective: manifest.objective()?,
        budget: manifest.budget()?,
        media,
        placements: resolve_placements(&manifest.totems, &totems)?,
    };

    let ports = WizardPorts::new(client.clone(), client.cache().clone())
        .with_previews(Arc::new(TempFilePreviews::new()));
    let mut wizard = WizardController::campaign(ports);
    for screen in stage_campaign(&mut wizard, staged)? {
        println!("{screen}");
    }
    if let Some(url) = wizard.preview_url() {
        println!("Preview: {}", url.0);
    }

    wizard.submit().await?;
    info!(manifest = %manifest_path.display(), "campaign submitted");
    println!("Campaign created successfully.");
    Ok(())
}
