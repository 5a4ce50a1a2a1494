use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use wcrm_bridge::core::json_param;
use wcrm_bridge::{
    AppConfig, MessageContent, OutboundMessage, TemplateMessage, WcrmApi, WcrmClient, normalize,
};

#[derive(Parser)]
#[command(name = "wcrm-tool")]
#[command(about = "Developer tooling for the wCRM WhatsApp bridge")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a webhook body stored in a JSON file
    Normalize {
        #[arg(long)]
        file: PathBuf,
    },
    /// Send a text message
    SendText {
        #[arg(long)]
        to: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        preview_url: bool,
    },
    /// Send a pre-approved template message
    SendTemplate {
        #[arg(long)]
        to: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "[]")]
        variables: String,
        #[arg(long)]
        media_uri: Option<String>,
    },
    /// Check that the configured API key is accepted
    VerifyCredentials,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize { file } => normalize_file(&file),
        Command::SendText {
            to,
            body,
            preview_url,
        } => {
            let message = OutboundMessage::new(
                to,
                MessageContent::Text {
                    body,
                    preview_url,
                },
            );
            let response = client()?.send_message(&message).await?;
            print_json(&response)
        }
        Command::SendTemplate {
            to,
            name,
            variables,
            media_uri,
        } => {
            let template = TemplateMessage {
                send_to: to,
                template_name: name,
                variables: json_param(
                    &Value::String(variables),
                    "Invalid JSON in Template Variables field",
                )?,
                media_uri: media_uri.filter(|uri| !uri.is_empty()),
            };
            let response = client()?.send_template(&template).await?;
            print_json(&response)
        }
        Command::VerifyCredentials => {
            client()?.verify_credentials().await?;
            println!("Credentials accepted");
            Ok(())
        }
    }
}

fn client() -> Result<WcrmClient> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow!("WCRM_API_KEY must be set for outbound commands"))?;
    Ok(WcrmClient::new(
        &config.api_base_url,
        api_key,
        config.http_timeout,
    )?)
}

fn normalize_file(path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let body: Value = serde_json::from_str(&raw)
        .with_context(|| format!("'{}' does not contain valid JSON", path.display()))?;

    let event = normalize(&body, &json!({}))?;
    print_json(&serde_json::to_value(event)?)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
