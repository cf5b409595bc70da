use std::time::Duration;

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct HealthArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
    pub url: String,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url::Url::parse(&args.url).with_context(|| format!("invalid server URL: {}", args.url))?;
    let endpoint = base.join("health")?;

    let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
    let response = client
        .get(endpoint.clone())
        .send()
        .await
        .with_context(|| format!("failed to reach {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        output_success(&output_format, &format!("{} is healthy", base), Some(body))
    } else {
        output_error(
            &output_format,
            &format!("{} reported {}", base, status),
            body.get("code").and_then(Value::as_str),
        )?;
        anyhow::bail!("health check failed with {}", status)
    }
}
