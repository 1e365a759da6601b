//! Command handlers.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::args::{Cli, Command, IndexArgs, InitArgs, RenderArgs, SearchArgs};
use crate::check::{find_duplicate_bodies, validate_library};
use crate::config::Config;
use crate::index::{read_index, write_index, IndexBuilder, PromptIndex};
use crate::query::{filter_fragments, filter_prompts, Query};
use crate::render::render_file;

/// Run the parsed command line.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Init(args) => run_init(cli, args),
        Command::Index(args) => run_index(cli, &load_config(cli)?, args),
        Command::Search(args) => run_search(cli, &load_config(cli)?, args),
        Command::Validate => run_validate(cli, &load_config(cli)?),
        Command::Duplicates => run_duplicates(cli, &load_config(cli)?),
        Command::Render(args) => run_render(cli, &load_config(cli)?, args),
        Command::Status => run_status(cli, &load_config(cli)?),
    }
}

/// Config for the library at `--root`, with `--output` taking precedence.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config =
        Config::load(cli.config.as_deref(), &cli.root).context("Failed to load config")?;
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_init(cli: &Cli, args: &InitArgs) -> Result<ExitCode> {
    let path = cli.root.join(Config::FILE_NAME);
    if path.exists() && !args.force {
        if args.if_needed {
            println!("Already initialized: {}", path.display());
            return Ok(ExitCode::SUCCESS);
        }
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = Config::with_root(&cli.root);
    std::fs::create_dir_all(config.prompts_path()).context("Failed to create prompts directory")?;
    std::fs::create_dir_all(config.fragments_path())
        .context("Failed to create fragments directory")?;
    std::fs::write(&path, config.to_yaml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Initialized {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn run_index(cli: &Cli, config: &Config, args: &IndexArgs) -> Result<ExitCode> {
    let outcome = IndexBuilder::new(config).build();
    let report = &outcome.report;

    let output = config.output_path();
    if !args.dry_run {
        write_index(&output, &outcome.index).context("Failed to write index")?;
    }

    if cli.json {
        print_json(report)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("Found {} prompts", report.prompts_parsed);
    println!("Found {} fragments", report.fragments_parsed);
    if !report.skipped.is_empty() {
        println!("Skipped {} documents:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  - {}: {}", skipped.path, skipped.reason);
        }
    }
    for dup in &report.duplicate_ids {
        println!("Warning: duplicate id '{}' in {}", dup.id, dup.paths.join(", "));
    }
    if !args.dry_run {
        println!("Index written to {}", output.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn load_snapshot(config: &Config) -> Result<PromptIndex> {
    let path = config.output_path();
    read_index(&path).with_context(|| {
        format!(
            "No index at {} (run `promptlib index` first)",
            path.display()
        )
    })
}

fn run_search(cli: &Cli, config: &Config, args: &SearchArgs) -> Result<ExitCode> {
    let index = if args.rebuild {
        IndexBuilder::new(config).build().index
    } else {
        load_snapshot(config)?
    };

    let mut query = Query::new().with_tags(args.tags.iter().cloned());
    if let Some(term) = &args.term {
        query = query.with_term(term.as_str());
    }
    if let Some(category) = &args.category {
        query = query.with_category(category.as_str());
    }

    if args.fragments {
        let fragments = filter_fragments(&index, &query);
        if cli.json {
            print_json(&fragments)?;
        } else {
            for fragment in &fragments {
                println!("{}  {}", fragment.id, fragment.path);
            }
            println!("{} fragments", fragments.len());
        }
    } else {
        let prompts = filter_prompts(&index, &query);
        if cli.json {
            print_json(&prompts)?;
        } else {
            for prompt in &prompts {
                let description = prompt.description();
                if description.is_empty() {
                    println!("{}", prompt.id);
                } else {
                    println!("{}  {}", prompt.id, description);
                }
            }
            println!("{} prompts", prompts.len());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(cli: &Cli, config: &Config) -> Result<ExitCode> {
    let summary = validate_library(config);

    if cli.json {
        print_json(&summary)?;
    } else if summary.is_valid() {
        println!("All {} prompts validated successfully", summary.checked);
    } else {
        println!("Validation errors found:");
        for issue in &summary.issues {
            println!("  - {}: {}", issue.path, issue.message);
        }
    }

    Ok(if summary.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_duplicates(cli: &Cli, config: &Config) -> Result<ExitCode> {
    let index = IndexBuilder::new(config).build().index;
    let groups = find_duplicate_bodies(&index.prompts);

    if cli.json {
        print_json(&groups)?;
    } else if groups.is_empty() {
        println!("No duplicate prompts found");
    } else {
        println!("Duplicate prompts found:");
        for group in &groups {
            println!("  - {}", group.paths.join(", "));
        }
    }

    Ok(if groups.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_render(cli: &Cli, config: &Config, args: &RenderArgs) -> Result<ExitCode> {
    let rendered = render_file(&args.file, &config.root, &args.vars, args.use_sample)
        .with_context(|| format!("Failed to render {}", args.file.display()))?;

    if cli.json {
        print_json(&rendered)?;
    } else {
        for missing in &rendered.missing_includes {
            eprintln!("Warning: include not found: {missing}");
        }
        println!("{}", rendered.text);
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status<'a> {
    path: String,
    prompts: usize,
    fragments: usize,
    tags: &'a [String],
    categories: &'a [String],
    generated_at: String,
}

fn run_status(cli: &Cli, config: &Config) -> Result<ExitCode> {
    let index = load_snapshot(config)?;
    let status = Status {
        path: config.output_path().display().to_string(),
        prompts: index.prompts.len(),
        fragments: index.fragments.len(),
        tags: &index.tags,
        categories: &index.categories,
        generated_at: index.generated_at.to_rfc3339(),
    };

    if cli.json {
        print_json(&status)?;
    } else {
        println!("Index: {}", status.path);
        println!("  Generated: {}", status.generated_at);
        println!("  Prompts: {}", status.prompts);
        println!("  Fragments: {}", status.fragments);
        println!("  Categories: {}", status.categories.join(", "));
        println!("  Tags: {}", status.tags.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}
