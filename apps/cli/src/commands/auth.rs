//! Auth commands: login, register, logout, whoami, OTP.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use zbooks_client::{ApiClient, AuthenticatedUser, RegisterForm};

use super::{operation_error, OtpCommand};

/// Arguments for `zbooks register`.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Login email
    #[arg(long)]
    pub email: String,

    /// Full name
    #[arg(long)]
    pub full_name: Option<String>,

    /// Company name
    #[arg(long)]
    pub company_name: Option<String>,

    /// Phone country code, e.g. +91
    #[arg(long)]
    pub phone_cc: Option<String>,

    /// National phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Country
    #[arg(long)]
    pub country: Option<String>,

    /// State
    #[arg(long)]
    pub state: Option<String>,
}

fn prompt_line(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_user(user: &AuthenticatedUser) {
    let name = user.full_name.as_deref().unwrap_or(user.email.as_str());
    println!("{} {}", "Logged in as".green(), name.bold());
    if let Some(org) = &user.current_organization {
        println!("  Organization: {} (id {})", org.name, org.id);
    } else if let Some(membership) = user.default_membership() {
        println!(
            "  Organization: {} (id {})",
            membership.organization.name, membership.organization.id
        );
    }
}

/// `zbooks login`
pub async fn login(client: &Arc<ApiClient>, email: Option<String>) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_line("Email")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let outcome = client
        .login(&email, &password)
        .await
        .map_err(|e| operation_error(&e, "Login failed"))?;

    print_user(&outcome.user);
    Ok(())
}

/// `zbooks register`
pub async fn register(client: &Arc<ApiClient>, args: RegisterArgs) -> anyhow::Result<()> {
    let password = rpassword::prompt_password("Password: ")?;

    let form = RegisterForm {
        email: args.email,
        password,
        full_name: args.full_name,
        company_name: args.company_name,
        phone_cc: args.phone_cc,
        phone: args.phone,
        country: args.country,
        state: args.state,
        ..RegisterForm::default()
    };

    let outcome = client
        .register(&form)
        .await
        .map_err(|e| operation_error(&e, "Registration failed"))?;

    println!("{}", "Account created".green());
    print_user(&outcome.user);
    Ok(())
}

/// `zbooks logout`
pub async fn logout(client: &Arc<ApiClient>) -> anyhow::Result<()> {
    client.logout().await;
    println!("{}", "Logged out".green());
    Ok(())
}

/// `zbooks whoami`
pub async fn whoami(client: &Arc<ApiClient>, json: bool) -> anyhow::Result<()> {
    if !client.is_authenticated().await {
        anyhow::bail!("not logged in, run `zbooks login`");
    }

    let user = client
        .me()
        .await
        .map_err(|e| operation_error(&e, "Failed to fetch profile"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    print_user(&user);
    if !user.organizations.is_empty() {
        println!("  Memberships:");
        for membership in &user.organizations {
            let marker = if membership.is_default { " (default)" } else { "" };
            println!(
                "    - {} [{}]{}",
                membership.organization.name,
                membership.role.as_deref().unwrap_or("member"),
                marker
            );
        }
    }
    Ok(())
}

/// `zbooks otp ...`
pub async fn otp(client: &Arc<ApiClient>, command: OtpCommand) -> anyhow::Result<()> {
    match command {
        OtpCommand::Request { destination } => {
            client
                .request_otp(&destination)
                .await
                .map_err(|e| operation_error(&e, "Failed to request passcode"))?;
            println!("{} {}", "Passcode sent to".green(), destination);
        }
        OtpCommand::Verify { destination, code } => {
            let outcome = client
                .verify_otp(&destination, &code)
                .await
                .map_err(|e| operation_error(&e, "Passcode verification failed"))?;
            print_user(&outcome.user);
        }
    }
    Ok(())
}
