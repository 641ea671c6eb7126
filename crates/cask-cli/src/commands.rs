use anyhow::Context;
use cask_loader::{codec, DataDocument, GameObjectData, OptionsData, ScreenData};
use cask_migrate::{MigrationError, MigrationOutcome, MigrationState};
use cask_sdk::{CachePolicy, Content, ContentConfig, DocumentKind, StartupReport};
use cask_store::PreloadReport;
use cask_types::{AssetKind, CacheKey};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Status(_) => cmd_status(config, json),
        Command::Preload(args) => cmd_preload(config, args, json),
        Command::Get(args) => cmd_get(config, args, json),
        Command::Doc(args) => cmd_doc(config, args, json),
        Command::List(args) => cmd_list(config, args, json),
        Command::Migrate(args) => cmd_migrate(config, args, json),
    }
}

/// Config file first, then command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<ContentConfig> {
    let mut config = match &cli.config {
        Some(path) => ContentConfig::load(path)?,
        None => ContentConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.layout.root = root.clone();
    }
    if cli.promote {
        config.cache = CachePolicy::promoting();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_status(config: ContentConfig, json: bool) -> anyhow::Result<()> {
    let content = Content::new(config);
    let layout = content.layout();
    let state = content.migration().check()?;

    let mut counts = Vec::new();
    for kind in AssetKind::ALL {
        counts.push((kind, content.loader().discover_assets(kind)?.len()));
    }
    let documents = content.loader().discover_documents()?.len();

    if json {
        let assets: serde_json::Map<_, _> = counts
            .iter()
            .map(|(kind, n)| (kind.name().to_string(), json!(n)))
            .collect();
        return print_json(&json!({
            "root": layout.root,
            "migration": state,
            "assets": assets,
            "documents": documents,
        }));
    }

    println!("Content root: {}", layout.root.display().to_string().bold());
    let state_text = match state {
        MigrationState::Migrated => "migrated".green(),
        MigrationState::NotMigrated => "not migrated".yellow(),
    };
    println!("Documents: {}", state_text);
    for (kind, n) in &counts {
        println!("  {:<10} {:>6}  {}", kind.to_string(), n, layout.kind_root(*kind).display().to_string().dimmed());
    }
    println!("  {:<10} {:>6}  {}", "document", documents, layout.data_root().display().to_string().dimmed());
    Ok(())
}

fn cmd_preload(config: ContentConfig, args: PreloadArgs, json: bool) -> anyhow::Result<()> {
    let content = Content::new(config);
    let report = content.startup()?;

    if json {
        return print_json(&report);
    }

    print_migration(&report);
    print_preload("assets", &report.assets, args.details);
    print_preload("documents", &report.documents, args.details);
    if report.is_clean() {
        println!("{} Content ready.", "✓".green().bold());
    }
    Ok(())
}

fn print_migration(report: &StartupReport) {
    match &report.migration {
        Some(MigrationOutcome::Migrated(moved)) => println!(
            "{} Migrated {} legacy director{}",
            "✓".green(),
            moved.moved.len(),
            if moved.moved.len() == 1 { "y" } else { "ies" }
        ),
        Some(_) => {}
        None => {
            println!("{} Migration incomplete:", "✗".red().bold());
            for failure in &report.migration_failures {
                println!("  {}", failure);
            }
        }
    }
}

fn print_preload(label: &str, report: &PreloadReport, details: bool) {
    println!(
        "{:<10} {} loaded, {} skipped, {} duplicate(s)",
        label,
        report.loaded.to_string().bold(),
        report.skipped.len(),
        report.duplicates.len()
    );
    for root in &report.unreadable_roots {
        println!("  {} {}: {}", "unreadable".red(), root.path.display(), root.reason);
    }
    if !details {
        return;
    }
    for skipped in &report.skipped {
        println!("  {} {}: {}", "skipped".yellow(), skipped.path.display(), skipped.reason);
    }
    for dup in &report.duplicates {
        println!(
            "  {} {} kept {} dropped {}",
            "duplicate".yellow(),
            dup.key,
            dup.kept.display(),
            dup.dropped.display()
        );
    }
}

fn cmd_get(config: ContentConfig, args: GetArgs, json: bool) -> anyhow::Result<()> {
    let content = Content::new(config);
    let resource = content
        .assets()
        .try_get(args.kind, &args.key)
        .with_context(|| format!("cannot load {} {:?}", args.kind, args.key))?;

    if json {
        return print_json(&json!({
            "kind": resource.kind(),
            "key": resource.key(),
            "len": resource.len(),
            "fingerprint": resource.fingerprint().map(|f| f.to_hex()),
        }));
    }

    println!("{} {}", resource.kind().to_string().cyan(), resource.key().bold());
    println!("  Size: {} bytes", resource.len());
    if let Some(fingerprint) = resource.fingerprint() {
        println!("  BLAKE3: {}", fingerprint.to_hex().yellow());
    }
    Ok(())
}

fn cmd_doc(config: ContentConfig, args: DocArgs, json: bool) -> anyhow::Result<()> {
    let content = Content::new(config);
    let kind = match args.kind {
        Some(DocKindArg::Screen) => DocumentKind::Screen,
        Some(DocKindArg::Options) => DocumentKind::Options,
        Some(DocKindArg::GameObject) => DocumentKind::GameObject,
        None => {
            let key = CacheKey::new(&args.key)?;
            content
                .loader()
                .load_any_document(&key)
                .with_context(|| format!("cannot infer the kind of {:?}; pass --kind", args.key))?
                .kind()
        }
    };

    match kind {
        DocumentKind::Screen => show_document::<ScreenData>(&content, &args, json),
        DocumentKind::Options => show_document::<OptionsData>(&content, &args, json),
        DocumentKind::GameObject => show_document::<GameObjectData>(&content, &args, json),
    }
}

fn show_document<T: DataDocument>(content: &Content, args: &DocArgs, json: bool) -> anyhow::Result<()> {
    let document: T = content.document(&args.key, args.create)?;
    if args.save {
        content.save_document(&document, &args.key)?;
    }

    if json {
        return print_json(&json!({
            "key": args.key,
            "kind": T::KIND,
            "saved": args.save,
            "document": document,
        }));
    }

    print!("{}", codec::encode(&document)?);
    if args.save {
        println!("{} Saved {}", "✓".green().bold(), args.key.bold());
    }
    Ok(())
}

fn cmd_list(config: ContentConfig, args: ListArgs, json: bool) -> anyhow::Result<()> {
    let content = Content::new(config);
    let loader = content.loader();
    let found = match args.target {
        ListTarget::Fonts => loader.discover_assets(AssetKind::Font)?,
        ListTarget::Sprites => loader.discover_assets(AssetKind::Sprite)?,
        ListTarget::Effects => loader.discover_assets(AssetKind::Effect)?,
        ListTarget::Documents => loader.discover_documents()?,
    };

    if json {
        let items: Vec<_> = found
            .iter()
            .map(|item| json!({ "key": item.key, "path": item.path }))
            .collect();
        return print_json(&items);
    }

    for item in &found {
        println!("{}  {}", item.key.as_str().bold(), item.path.display().to_string().dimmed());
    }
    println!("{} key(s)", found.len());
    Ok(())
}

fn cmd_migrate(config: ContentConfig, args: MigrateArgs, json: bool) -> anyhow::Result<()> {
    let content = Content::new(config);
    let service = content.migration();

    if args.check {
        let state = service.check()?;
        let legacy = match state {
            MigrationState::NotMigrated => service.find_legacy_dirs()?,
            MigrationState::Migrated => Vec::new(),
        };
        if json {
            return print_json(&json!({ "state": state, "legacy": legacy }));
        }
        println!("State: {:?}", state);
        for dir in &legacy {
            println!("  would move {}", dir.display().to_string().yellow());
        }
        return Ok(());
    }

    let outcome = match service.migrate() {
        Ok(outcome) => outcome,
        Err(MigrationError::Partial { failures }) => {
            if json {
                print_json(&json!({ "failures": failures }))?;
            } else {
                for failure in &failures {
                    println!("  {} {}", "failed".red(), failure);
                }
            }
            anyhow::bail!("migration incomplete, {} move(s) failed", failures.len());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        return print_json(&outcome);
    }
    match outcome {
        MigrationOutcome::Disabled => println!("Migration is disabled."),
        MigrationOutcome::AlreadyMigrated => println!("{} Already migrated.", "✓".green()),
        MigrationOutcome::NothingToMigrate => println!("No legacy document directory found."),
        MigrationOutcome::Migrated(report) => {
            for dir in &report.moved {
                println!("  {} {}", "moved".green(), dir.display());
            }
            for dir in &report.partially_moved {
                println!("  {} {} (files left behind)", "partial".yellow(), dir.display());
            }
            for path in &report.collisions {
                println!("  {} {} (kept existing)", "collision".yellow(), path.display());
            }
            println!("{} Migration complete.", "✓".green().bold());
        }
    }
    Ok(())
}
