use crate::bootstrap::open_registry;
use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Subcommand;
use homedns_application::services::TokenSigner;
use homedns_application::use_cases::{
    AddCredentialUseCase, ListCredentialsUseCase, RemoveCredentialUseCase,
};
use homedns_domain::{Config, InvocationContext, IssuedCredential, JwtSubject, SigningAlgorithm};
use serde_json::json;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum JwtCommand {
    /// Register a new subject and print its private key (shown only once)
    Add {
        /// Key algorithm: ES256 or EdDSA
        #[arg(long, default_value = "ES256")]
        algorithm: SigningAlgorithm,

        #[arg(long)]
        json: bool,
    },

    /// List registered subjects
    List {
        #[arg(long)]
        json: bool,
    },

    /// Remove a subject; tokens it signed stop working immediately
    Remove {
        subject_id: Uuid,
    },

    /// Sign a token with a subject's private key
    Token {
        #[arg(long)]
        subject: Uuid,

        /// PEM file holding the PKCS#8 private key printed by `jwt add`
        #[arg(long)]
        key: PathBuf,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = 3600)]
        expires_in: u32,
    },
}

pub async fn run(command: JwtCommand, config: &Config) -> anyhow::Result<()> {
    match command {
        JwtCommand::Add { algorithm, json } => add(config, algorithm, json).await,
        JwtCommand::List { json } => list(config, json).await,
        JwtCommand::Remove { subject_id } => remove(config, subject_id).await,
        JwtCommand::Token {
            subject,
            key,
            expires_in,
        } => token(config, subject, &key, expires_in).await,
    }
}

async fn add(config: &Config, algorithm: SigningAlgorithm, as_json: bool) -> anyhow::Result<()> {
    let registry = open_registry(&config.jwt).await?;
    let issued = AddCredentialUseCase::new(registry)
        .execute(InvocationContext::Local, algorithm)
        .await?;

    println!("{}", render_issued(&issued, as_json));
    Ok(())
}

async fn list(config: &Config, as_json: bool) -> anyhow::Result<()> {
    let registry = open_registry(&config.jwt).await?;
    let subjects = ListCredentialsUseCase::new(registry).execute().await?;

    println!("{}", render_subjects(&subjects, as_json));
    Ok(())
}

async fn remove(config: &Config, subject_id: Uuid) -> anyhow::Result<()> {
    let registry = open_registry(&config.jwt).await?;
    let removed = RemoveCredentialUseCase::new(registry)
        .execute(&subject_id)
        .await?;

    if removed {
        println!("Removed subject {}", subject_id);
    } else {
        println!("Subject {} is not registered", subject_id);
    }
    Ok(())
}

async fn token(
    config: &Config,
    subject: Uuid,
    key_path: &Path,
    expires_in: u32,
) -> anyhow::Result<()> {
    let pem = tokio::fs::read_to_string(key_path)
        .await
        .with_context(|| format!("cannot read private key {}", key_path.display()))?;
    let signer = TokenSigner::from_pem(&pem)?;
    let token = signer.issue(
        subject,
        &config.jwt.issuer,
        &config.jwt.audience,
        Utc::now(),
        Duration::seconds(i64::from(expires_in)),
    )?;

    println!("{}", token);
    Ok(())
}

fn render_issued(issued: &IssuedCredential, as_json: bool) -> String {
    if as_json {
        return json!({
            "subject_id": issued.subject_id,
            "algorithm": issued.algorithm,
            "created_at": issued.created_at.to_rfc3339(),
            "private_key": issued.private_key_pem,
        })
        .to_string();
    }

    format!(
        "Subject ID: {}\nAlgorithm:  {}\n\n{}\nStore this private key now. It is not kept on the server and cannot be shown again.",
        issued.subject_id,
        issued.algorithm,
        issued.private_key_pem.trim_end(),
    )
}

fn render_subjects(subjects: &[JwtSubject], as_json: bool) -> String {
    if as_json {
        let entries: Vec<_> = subjects
            .iter()
            .map(|s| {
                json!({
                    "subject_id": s.subject_id,
                    "algorithm": s.algorithm,
                    "created_at": s.created_at.to_rfc3339(),
                })
            })
            .collect();
        return serde_json::Value::Array(entries).to_string();
    }

    if subjects.is_empty() {
        return "No subjects registered".to_string();
    }

    let mut out = format!("{:<38} {:<9} {}", "SUBJECT ID", "ALGORITHM", "CREATED");
    for s in subjects {
        out.push_str(&format!(
            "\n{:<38} {:<9} {}",
            s.subject_id,
            s.algorithm.as_str(),
            s.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    out
}
