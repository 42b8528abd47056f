//! Organization commands.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use zbooks_client::{ApiClient, NewOrganization};

use super::{operation_error, OrgCommand};

/// Arguments for `zbooks org create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Organization name
    #[arg(long)]
    pub name: String,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Web site
    #[arg(long)]
    pub website: Option<String>,

    /// GST registration number
    #[arg(long)]
    pub gst_number: Option<String>,

    /// PAN number
    #[arg(long)]
    pub pan_number: Option<String>,

    /// Accounting currency code, e.g. INR
    #[arg(long)]
    pub currency: Option<String>,
}

/// Execute an `org` subcommand.
pub async fn execute(client: &Arc<ApiClient>, command: OrgCommand) -> anyhow::Result<()> {
    match command {
        OrgCommand::List => list(client).await,
        OrgCommand::Switch { id } => switch(client, id).await,
        OrgCommand::Create(args) => create(client, args).await,
    }
}

async fn list(client: &Arc<ApiClient>) -> anyhow::Result<()> {
    let memberships = client
        .list_organizations()
        .await
        .map_err(|e| operation_error(&e, "Failed to fetch organizations"))?;

    if memberships.is_empty() {
        println!("No organizations yet. Create one with `zbooks org create --name <name>`.");
        return Ok(());
    }

    for membership in memberships {
        let marker = if membership.is_default { " (default)".green() } else { "".normal() };
        println!(
            "{:>6}  {} [{}]{}",
            membership.organization.id,
            membership.organization.name.bold(),
            membership.role.as_deref().unwrap_or("member"),
            marker
        );
    }
    Ok(())
}

async fn switch(client: &Arc<ApiClient>, id: i64) -> anyhow::Result<()> {
    let user = client
        .switch_organization(id)
        .await
        .map_err(|e| operation_error(&e, "Failed to switch organization"))?;

    match user.current_organization {
        Some(org) => println!("{} {}", "Switched to".green(), org.name.bold()),
        None => println!("{}", "Switched organization".green()),
    }
    Ok(())
}

async fn create(client: &Arc<ApiClient>, args: CreateArgs) -> anyhow::Result<()> {
    let organization = client
        .create_organization(&NewOrganization {
            name: args.name,
            address: args.address,
            phone: args.phone,
            email: args.email,
            website: args.website,
            gst_number: args.gst_number,
            pan_number: args.pan_number,
            currency: args.currency,
        })
        .await
        .map_err(|e| operation_error(&e, "Failed to create organization"))?;

    println!(
        "{} {} (id {})",
        "Created organization".green(),
        organization.name.bold(),
        organization.id
    );
    Ok(())
}
