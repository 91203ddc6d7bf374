pub mod assembler;
pub mod browse;
pub mod charts;
pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod insights;
pub mod io_utils;
pub mod parser;
pub mod projection;
pub mod sheet;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    assembler::{Assembler, DashboardBundle},
    cli::{Cli, Commands, OutputFormat, SourceArgs},
    config::PipelineConfig,
    projection::TableSection,
    sheet::Record,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Chart(args) => handle_chart(&args),
        Commands::Table(args) => handle_table(&args),
        Commands::Export(args) => handle_export(&args),
    }
}

/// Config file (if any) with command-line flags layered on top.
fn load_config(source: &SourceArgs) -> Result<PipelineConfig> {
    let mut config = match &source.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    if let Some(parser) = source.parser {
        config.text_parser = parser;
    }
    if let Some(delimiter) = source.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(label) = &source.input_encoding {
        config.input_encoding = Some(label.clone());
    }
    config
        .validate()
        .map_err(|message| anyhow!("Invalid pipeline options: {message}"))?;
    Ok(config)
}

fn load_bundle(source: &SourceArgs) -> Result<(DashboardBundle, PipelineConfig)> {
    let config = load_config(source)?;
    info!(
        "Reading '{}' with delimiter '{}'",
        source.input.display(),
        printable_delimiter(config.delimiter)
    );
    let selected = source.selected_columns();
    debug!("Selected columns: {:?}", selected);
    let assembler = Assembler::new(config);
    let bundle = assembler
        .assemble_path(&source.input, &selected)
        .with_context(|| format!("Building dashboard for {:?}", source.input))?;
    Ok((bundle, assembler.config().clone()))
}

fn handle_analyze(args: &cli::AnalyzeArgs) -> Result<()> {
    let (bundle, _) = load_bundle(&args.source)?;
    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&bundle).context("Serializing bundle")?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", render_bundle(&bundle)),
    }
    Ok(())
}

fn render_bundle(bundle: &DashboardBundle) -> String {
    let mut output = format!(
        "{} ({}) - {} registro(s)\n",
        bundle.metadata.file_name,
        bundle.metadata.file_type,
        data::format_locale_number(bundle.metadata.total_records as f64)
    );
    for section in &bundle.summary {
        output.push_str(&format!("\n== {} ==\n", section.title));
        output.push_str(&table::render_summary(section));
    }
    for section in bundle.charts.iter().chain(&bundle.tables) {
        let records = section.data.iter().collect::<Vec<_>>();
        output.push_str(&format!("\n== {} ==\n", section.title));
        output.push_str(&table::render_records(section.columns(), &records));
    }
    output
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let (bundle, _) = load_bundle(&args.source)?;
    for section in &bundle.tables {
        println!("{}: {}", section.title, section.columns().join(", "));
    }
    Ok(())
}

fn handle_chart(args: &cli::ChartArgs) -> Result<()> {
    let (bundle, config) = load_bundle(&args.source)?;
    let mut views = Vec::with_capacity(bundle.charts.len());
    for section in &bundle.charts {
        match charts::chart_view(section, args.kind, &config)
            .with_context(|| format!("Shaping chart '{}'", section.title))?
        {
            Some(view) => views.push(view),
            None => info!("No chart fits '{}'", section.title),
        }
    }
    if bundle.charts.is_empty() {
        info!("'{}' produced no chart series", bundle.metadata.file_name);
    }
    let json = serde_json::to_string_pretty(&views).context("Serializing chart views")?;
    println!("{json}");
    Ok(())
}

fn select_table(bundle: &DashboardBundle, sheet: usize) -> Result<&TableSection> {
    sheet
        .checked_sub(1)
        .and_then(|idx| bundle.table(idx))
        .ok_or_else(|| {
            anyhow!(
                "Table {sheet} not found; '{}' has {} table(s)",
                bundle.metadata.file_name,
                bundle.tables.len()
            )
        })
}

fn search_table<'a>(table: &'a TableSection, term: Option<&str>) -> Vec<&'a Record> {
    let hits = browse::filter_records(&table.data, table.columns(), term.unwrap_or_default());
    debug!("'{}': {} of {} row(s) match", table.title, hits.len(), table.data.len());
    hits
}

fn handle_table(args: &cli::TableArgs) -> Result<()> {
    let (bundle, config) = load_bundle(&args.source)?;
    let section = select_table(&bundle, args.sheet)?;
    let hits = search_table(section, args.search.as_deref());
    let page_size = args.page_size.unwrap_or(config.page_size);
    let page = browse::paginate(&hits, args.page, page_size);

    println!("== {} ==", section.title);
    print!("{}", table::render_records(section.columns(), page.items));
    println!(
        "Página {} de {} ({} registro(s))",
        page.number,
        page.total_pages.max(1),
        hits.len()
    );
    Ok(())
}

fn handle_export(args: &cli::ExportArgs) -> Result<()> {
    let (bundle, _) = load_bundle(&args.source)?;
    let section = select_table(&bundle, args.sheet)?;
    let hits = search_table(section, args.search.as_deref());
    let path = export::write_export(
        &args.output_dir,
        &section.title,
        Local::now().date_naive(),
        section.columns(),
        &hits,
    )?;
    println!("{}", path.display());
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_utils::Upload;

    #[test]
    fn text_rendering_lists_every_section() {
        let upload = Upload::new("fruit.csv", b"name,qty\napple,10\nbanana,0\n".to_vec());
        let bundle = Assembler::default().assemble(&upload, &[]).expect("bundle");
        let rendered = render_bundle(&bundle);
        assert!(rendered.starts_with("fruit.csv (csv) - 2 registro(s)"));
        assert!(rendered.contains("== Análise Detalhada CSV =="));
        assert!(rendered.contains("== Gráfico CSV =="));
        assert!(rendered.contains("== Dados CSV =="));
    }

    #[test]
    fn tab_delimiter_is_printable() {
        assert_eq!(printable_delimiter(b'\t'), "\\t");
        assert_eq!(printable_delimiter(b';'), ";");
    }
}
