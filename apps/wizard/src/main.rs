use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_wizard::config::Config;
use resume_wizard::generation::templates::TemplateCatalog;
use resume_wizard::service_client::ServiceClient;
use resume_wizard::wizard::upload::UploadedFile;
use resume_wizard::{Channel, GenerationOrchestrator, ResultPresenter, WizardError, WizardState};

#[derive(Parser)]
#[command(name = "resume-wizard", version, about = "Generate a tailored resume")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a resume from a job description, a job-posting link or a template
    #[command(group(
        ArgGroup::new("channel")
            .required(true)
            .args(["description", "url", "template"])
    ))]
    Generate {
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        template: Option<String>,
        /// Resume to attach (pdf, doc, docx or txt; at most 10 MiB)
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Upload a resume on its own and print the server-side file name
    Upload {
        #[arg(long)]
        resume: PathBuf,
    },
    /// List available templates
    Templates,
    /// Show previous generations
    History,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_wizard={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Resume wizard v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", config.api_base_url);

    let client = ServiceClient::new(config.api_base_url.clone())?;

    match cli.command {
        Command::Upload { resume } => {
            let mut wizard = WizardState::new();
            if let Err(e) = UploadedFile::from_path(&resume).and_then(|f| wizard.select_file(f)) {
                return Ok(report(&e));
            }
            if let Some(file) = wizard.uploaded_file() {
                let receipt = client.upload_resume(file).await?;
                println!("{}", receipt.filename.as_deref().unwrap_or("-"));
            }
        }
        Command::Templates => {
            for name in client.list_templates().await? {
                println!("{name}");
            }
        }
        Command::History => {
            for entry in client.list_history().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.timestamp.as_deref().unwrap_or("-"),
                    entry.kind.as_deref().unwrap_or("-"),
                    entry
                        .match_score
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    entry.input.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Generate {
            description,
            url,
            template,
            resume,
        } => {
            let channel = match (description, url, template) {
                (Some(d), _, _) => Channel::Description(d),
                (_, Some(u), _) => Channel::Link(u),
                (_, _, Some(t)) => Channel::Template(t),
                // clap's required group guarantees one of the three
                (None, None, None) => unreachable!("channel group is required"),
            };
            if let Err(e) = generate(&config, &client, channel, resume).await {
                return Ok(report(&e));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report(error: &WizardError) -> ExitCode {
    let notification = error.to_notification();
    eprintln!("[{}] {}", notification.code, notification.message);
    ExitCode::FAILURE
}

async fn generate(
    config: &Config,
    client: &ServiceClient,
    channel: Channel,
    resume: Option<PathBuf>,
) -> Result<(), WizardError> {
    let mut wizard = WizardState::new();
    if let Some(path) = resume {
        wizard.select_file(UploadedFile::from_path(&path)?)?;
    }

    let mut orchestrator =
        GenerationOrchestrator::from_config(Arc::new(client.clone()), config);
    if matches!(channel, Channel::Template(_)) {
        orchestrator.set_templates(TemplateCatalog::load(client).await?);
    }

    let result = orchestrator.submit_wizard(channel, &wizard).await?;
    let plan = ResultPresenter::present(&result);
    for line in plan.lines() {
        println!("{line}");
    }
    for (format, identifier) in plan.downloads() {
        if let Ok(url) = client.download_url(identifier) {
            println!("{}: {url}", format.label());
        }
    }
    Ok(())
}
