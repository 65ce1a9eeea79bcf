use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use listings::backend::config::{embedded_configs, parse_configs};
use listings::backend::export;
use listings::backend::loader::{HttpFetcher, TextFetcher};
use listings::backend::pager::DEFAULT_PAGE_SIZE;
use listings::backend::settings::Settings;
use listings::backend::view::{ListingsView, ViewStatus};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(version, about = "Browse, filter and export listing datasets", long_about = None)]
struct Args {
    /// URL or path of a JSON configuration document; built-in lists are used
    /// when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// List id to display (defaults to the most recently used list)
    #[arg(short, long)]
    list: Option<String>,

    /// Search term to filter listings
    #[arg(short, long)]
    search: Option<String>,

    /// Restrict the search to a field (repeatable)
    #[arg(short = 'f', long = "field")]
    fields: Vec<String>,

    /// Page to display
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Listings per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Write the filtered listings instead of printing a page
    #[arg(short, long, value_enum)]
    export: Option<ExportFormat>,

    /// Output file for --export (stdout when omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let fetcher = HttpFetcher::new();
    let configs = match &args.config {
        Some(location) => {
            let text = fetcher
                .fetch_text(location)
                .with_context(|| format!("reading configuration from {location}"))?;
            parse_configs(&text)
                .with_context(|| format!("parsing configuration from {location}"))?
        }
        None => embedded_configs(),
    };

    let mut settings = Settings::load();
    let list = args
        .list
        .clone()
        .or_else(|| {
            settings
                .last_list
                .clone()
                .filter(|id| configs.contains_key(id))
        })
        .or_else(|| configs.keys().next().cloned())
        .context("configuration document names no lists")?;

    let mut view = ListingsView::new(configs).with_page_size(args.page_size);
    view.select(&list)?;
    view.reload(&fetcher);
    settings.remember_list(&list);

    if let Some(term) = &args.search {
        view.set_term(term.clone());
    }
    for field in &args.fields {
        view.toggle_field(field);
    }

    if let Some(format) = args.export {
        let records = view.filtered_records();
        let mut out: Box<dyn Write> = match &args.out {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            )),
            None => Box::new(io::stdout().lock()),
        };
        match format {
            ExportFormat::Csv => export::write_csv(&records, &mut out)?,
            ExportFormat::Json => export::write_json(&records, &mut out)?,
        }
        out.flush()?;
        return Ok(());
    }

    view.set_page(args.page);
    print_page(&view, &list);
    Ok(())
}

fn print_page(view: &ListingsView, list: &str) {
    let title = view.config().map(|c| c.title().to_string()).unwrap_or_default();
    println!("{title} ({list})");
    println!("Filters: {}", view.search_summary());

    match view.status() {
        ViewStatus::Loading => println!("Loading..."),
        ViewStatus::Error(message) => println!("Could not load listings: {message}"),
        ViewStatus::Empty => println!("No listings available."),
        ViewStatus::NoMatches => println!("No listings match the current search."),
        ViewStatus::Ready => {
            for record in view.page_slice() {
                let data = view.display_data(record);
                if let Some(primary) = &data.primary {
                    println!("- {primary}");
                }
                if let Some(secondary) = &data.secondary {
                    println!("    {secondary}");
                }
                if let Some(tertiary) = &data.tertiary {
                    println!("    {tertiary}");
                }
            }
            println!(
                "Page {} of {} ({} of {} listings)",
                view.current_page(),
                view.total_pages(),
                view.page_slice().len(),
                view.filtered_len(),
            );
        }
    }
}
