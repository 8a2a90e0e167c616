use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use colored::Colorize;

use blogcms_sdk::{Blog, ImportReport};
use blogcms_server::{BlogServer, ServerConfig};
use blogcms_store::SqliteBlogStore;

use crate::cli::*;

const MIN_PASSWORD_LEN: usize = 8;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::HashPassword(args) => cmd_hash_password(args),
        Command::Export(args) => cmd_export(args).await,
        Command::Import(args) => cmd_import(args, cli.format).await,
    }
}

async fn open_blog(database_url: &str) -> anyhow::Result<Blog> {
    let store = SqliteBlogStore::connect(database_url)
        .await
        .with_context(|| format!("opening database {database_url}"))?;
    Ok(Blog::with_store(store))
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    let blog = open_blog(&config.database_url).await?;
    let server = BlogServer::new(config, blog)?;
    println!(
        "{} Blog CMS on {} ({})",
        "✓".green().bold(),
        format!("http://{}", server.config().bind_addr).bold(),
        server.config().environment.to_string().cyan()
    );
    server.serve().await?;
    Ok(())
}

fn check_password(password: &str, confirmation: &str) -> anyhow::Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }
    if password != confirmation {
        bail!("passwords do not match");
    }
    Ok(())
}

fn prompt(label: &str, input: &mut impl BufRead) -> anyhow::Result<String> {
    eprint!("{label}: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn cmd_hash_password(args: HashPasswordArgs) -> anyhow::Result<()> {
    let (password, confirmation) = match args.password {
        Some(password) => (password.clone(), password),
        None => {
            let mut stdin = std::io::stdin().lock();
            let password = prompt("Admin password", &mut stdin)?;
            let confirmation = prompt("Confirm password", &mut stdin)?;
            (password, confirmation)
        }
    };
    check_password(&password, &confirmation)?;
    let hash = blogcms_server::hash_password(&password)?;
    println!("{} Password hashed. Set this in the environment:", "✓".green().bold());
    println!("ADMIN_PASSWORD_HASH={hash}");
    Ok(())
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let blog = open_blog(&args.database).await?;
    let doc = blog.export_posts().await?;
    let json = serde_json::to_string_pretty(&doc)?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "{} Exported {} posts to {}",
                "✓".green().bold(),
                doc.total_posts.to_string().bold(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn cmd_import(args: ImportArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let blog = open_blog(&args.database).await?;
    let report = blog.import_posts(&bytes).await?;
    print_report(&report, format)
}

fn print_report(report: &ImportReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Text => println!(
            "{} Imported {} posts, skipped {}",
            "✓".green().bold(),
            report.imported.to_string().bold(),
            report.skipped.to_string().yellow()
        ),
    }
    Ok(())
}
