mod cli;

use discforged::config::{self, Config};
use discforged_media::dvd::scan_catalog;
use discforged_media::{
    probe_score, DiscFormat, DiscLocation, DvdDisc, DvdOptions, DvdTitleStream, VideoTsFolder,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::Write;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "discforged=trace,discforged_media=trace".to_string()
        } else {
            "discforged=info,discforged_media=info".to_string()
        }
    });

    // Logs go to stderr so `dump` can write the stream to stdout
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Titles { disc, json } => list_titles(&disc, json),
        Commands::Chapters { disc, title, angle } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            print_chapters(&disc, &config, title, angle)
        }
        Commands::Dump {
            disc,
            title,
            angle,
            output,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            dump_title(&disc, &config, title, angle, output.as_deref())
        }
        Commands::Probe { location } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            probe_location(&location, &config)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("discforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn dvd_location(disc: &str) -> Result<DiscLocation> {
    let location = DiscLocation::parse(disc);
    if location.format == DiscFormat::Bluray {
        anyhow::bail!(
            "{} is a Blu-ray disc; opening it needs an external disc library",
            location.path.display()
        );
    }
    Ok(location)
}

fn open_dvd(disc: &str, options: &DvdOptions) -> Result<DvdTitleStream<VideoTsFolder>> {
    let location = dvd_location(disc)?;
    let folder = VideoTsFolder::open(&location.path)
        .with_context(|| format!("Failed to open DVD folder: {:?}", location.path))?;
    let stream = DvdTitleStream::open(folder, options)
        .with_context(|| format!("Failed to open title stream on {:?}", location.path))?;
    Ok(stream)
}

fn list_titles(disc: &str, json: bool) -> Result<()> {
    let location = dvd_location(disc)?;
    let mut folder = VideoTsFolder::open(&location.path)
        .with_context(|| format!("Failed to open DVD folder: {:?}", location.path))?;
    let catalog = scan_catalog(&mut folder)
        .with_context(|| format!("Failed to read titles on {:?}", location.path))?;
    let selected = catalog.select(None).ok().map(|t| t.index);
    let volume_id = folder.volume_id();

    if json {
        let value = serde_json::json!({
            "volume_id": volume_id,
            "selected": selected,
            "titles": catalog.enumerate(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if let Some(id) = &volume_id {
        println!("Volume: {}", id);
    }
    println!("Titles: {}", catalog.len());
    for title in catalog.enumerate() {
        let marker = if Some(title.index) == selected { "*" } else { " " };
        println!(
            "{} {} ({} angle(s), {} cell(s))",
            marker, title, title.angle_count, title.unit_count
        );
    }
    Ok(())
}

fn print_chapters(
    disc: &str,
    config: &Config,
    title: Option<u32>,
    angle: Option<u32>,
) -> Result<()> {
    let stream = open_dvd(disc, &config.dvd_options(title, angle))?;

    println!("{}", stream.title());
    println!(
        "Duration: {} (time base {})",
        stream.duration(),
        stream.time_base()
    );
    for chapter in stream.chapters() {
        println!(
            "  chapter {:>3}: {} - {}",
            chapter.index, chapter.start, chapter.end
        );
    }
    Ok(())
}

fn dump_title(
    disc: &str,
    config: &Config,
    title: Option<u32>,
    angle: Option<u32>,
    output: Option<&Path>,
) -> Result<()> {
    let mut stream = open_dvd(disc, &config.dvd_options(title, angle))?;

    let written = match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let n = std::io::copy(&mut stream, &mut file)?;
            file.flush()?;
            n
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            let n = std::io::copy(&mut stream, &mut stdout)?;
            stdout.flush()?;
            n
        }
    };

    tracing::info!(
        title = stream.title().index,
        bytes = written,
        "dumped title stream"
    );
    Ok(())
}

fn probe_location(location: &str, config: &Config) -> Result<()> {
    let parsed = DiscLocation::parse(location);
    println!("Location: {}", parsed.path.display());
    println!("Format: {}", parsed.format);
    println!("Probe score: {}", probe_score(location));

    if parsed.format == DiscFormat::Bluray {
        let options = config.bluray_options(None);
        println!("Title: {}", auto(options.title));
        println!("Min title length: {}s", options.min_title_length);
    }
    Ok(())
}

fn auto(title: Option<u32>) -> String {
    title.map_or_else(|| "auto".to_string(), |t| t.to_string())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  DVD title: {}", auto(config.dvd.title));
    println!("  DVD angle: {}", config.dvd.angle);
    println!("  Blu-ray title: {}", auto(config.bluray.title));
    println!(
        "  Blu-ray min title length: {}s",
        config.bluray.min_title_length
    );
    println!("  Time base: {}", config.output.time_base());
    println!("  Buffer: {} sector(s)", config.output.buffer_sectors);

    Ok(())
}
