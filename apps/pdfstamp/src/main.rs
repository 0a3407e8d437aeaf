//! pdfstamp - stamp a signature image onto a batch of PDFs
//!
//! ```text
//! pdfstamp sign contract.pdf lease.pdf -s signature.png --position 400,700,-1
//! pdfstamp sign *.pdf -s sig.png --at lease.pdf=72,650,2 --out-dir signed/
//! pdfstamp info contract.pdf --json
//! ```
//!
//! Positions are in PDF points measured from the top-left corner of the
//! page. A page number past the end of a document stamps its last page.

mod config;
mod notify;
mod persistence;
mod sources;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use stamp_core::workflow::GENERIC_FAILURE_MESSAGE;
use stamp_core::{
    inspect_pdf, sign_and_export, CapabilityProvider, Notifier, Severity, SigningSession,
    ValidationError,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Cli, Command, InfoArgs, SignArgs};
use notify::ConsoleNotifier;
use persistence::{DownloadSink, ExportTarget, OutputDirProbe};
use sources::{load_pdfs, load_signature};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let notifier = ConsoleNotifier::stderr();

    let result = match cli.command {
        Command::Sign(args) => run_sign(args, &notifier).await,
        Command::Info(args) => run_info(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            notifier
                .notify(Severity::Error, "Error", GENERIC_FAILURE_MESSAGE)
                .await;
            ExitCode::FAILURE
        }
    }
}

async fn warn_user(notifier: &ConsoleNotifier, e: &ValidationError) -> ExitCode {
    notifier
        .notify(Severity::Warning, "Attention", &e.to_string())
        .await;
    ExitCode::FAILURE
}

async fn run_sign(args: SignArgs, notifier: &ConsoleNotifier) -> Result<ExitCode> {
    let (files, skipped) = load_pdfs(&args.files).await;
    for message in &skipped {
        notifier
            .notify(Severity::Warning, "Attention", message)
            .await;
    }

    let mut session = SigningSession::new();
    let mut loaded: Vec<(String, String)> = Vec::with_capacity(files.len());
    for file in files {
        let id = session.add_document(file.name.clone(), file.bytes);
        loaded.push((file.name, id));
    }

    if args.only.is_empty() {
        session.select_all(true);
    } else {
        for name in &args.only {
            if !loaded.iter().any(|(n, _)| n == name) {
                warn!(file = %name, "--only names a file that was not loaded");
            }
        }
        for (name, id) in &loaded {
            if args.only.contains(name) {
                session.set_selected(id, true)?;
            }
        }
    }

    for placement in &args.at {
        let mut matched = false;
        for (name, id) in &loaded {
            if *name == placement.name {
                session.set_position(id, placement.position)?;
                matched = true;
            }
        }
        if !matched {
            warn!(file = %placement.name, "--at names a file that was not loaded");
        }
    }

    let image = match (&args.signature, &args.signature_uri) {
        (Some(path), _) => Some(
            load_signature(path)
                .await
                .with_context(|| format!("Failed to read signature image {}", path.display()))?,
        ),
        (None, Some(uri)) => Some(uri.clone()),
        (None, None) => None,
    };
    if let Some(image) = image {
        session.set_signature_image(image);
    }
    if let Err(e) = session.set_stamp_size(args.size) {
        return Ok(warn_user(notifier, &e).await);
    }
    if let Err(e) = session.set_opacity(args.opacity) {
        return Ok(warn_user(notifier, &e).await);
    }

    let capabilities = OutputDirProbe::new(args.out_dir.clone()).capabilities();
    let target = ExportTarget::select(
        capabilities,
        args.out_dir.clone(),
        DownloadSink::default_location(),
    );
    debug!(destination = %target.describe(), "Selected export target");

    let default_position = args.position.map(|p| p.0);
    let report = match sign_and_export(&session, default_position, &target, notifier).await {
        Ok(report) => report,
        // Already shown to the user
        Err(_) => return Ok(ExitCode::FAILURE),
    };

    for saved in &report.saved {
        match &saved.path {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", saved.file_name),
        }
    }
    info!(
        signed = report.signed,
        skipped = report.skipped,
        failed_saves = report.failed_saves,
        "Done"
    );

    if report.signed == 0 || report.saved.is_empty() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn run_info(args: InfoArgs) -> Result<ExitCode> {
    let mut entries = Vec::with_capacity(args.files.len());
    let mut failed = false;

    for path in &args.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match inspect_pdf(&bytes) {
            Ok(info) => entries.push((path, info)),
            Err(e) => {
                error!(file = %path.display(), error = %e, "Could not inspect PDF");
                failed = true;
            }
        }
    }

    if args.json {
        let mut values = Vec::with_capacity(entries.len());
        for (path, info) in &entries {
            values.push(serde_json::json!({
                "file": path.display().to_string(),
                "info": serde_json::to_value(info)?,
            }));
        }
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for (path, info) in &entries {
            println!(
                "{}: {} page(s), PDF {}{}",
                path.display(),
                info.page_count,
                info.version,
                if info.encrypted { ", encrypted" } else { "" }
            );
            for page in &info.pages {
                println!("  page {}: {} x {} pt", page.number, page.width, page.height);
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
