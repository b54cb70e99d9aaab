use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use po_scanner_lib::export::{self, export_file_name, save_artifact, unique_path};
use po_scanner_lib::models::{header_label, ITEM_COLUMNS};
use po_scanner_lib::{
    process_document, AppConfig, Catalog, DocumentSource, JsonFileSource, ProcessedDocument,
    ProcessorKind,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

/// Purchase Order Scanner - Document AI entities to reconciled item tables
#[derive(Parser)]
#[command(name = "po-scanner")]
#[command(version)]
#[command(about = "Flatten Document AI purchase-order entities, reconcile product codes and export CSV/Excel")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a scanned purchase order (PDF/image via Document AI, or a saved .json response)
    Process(ProcessArgs),
    /// List the products of a product master
    Catalog { path: PathBuf },
    /// Show whether Document AI credentials are configured
    Status,
}

#[derive(Args)]
struct ProcessArgs {
    file: PathBuf,
    /// Processor variant: standard or detailed
    #[arg(long, default_value = "standard")]
    kind: ProcessorKind,
    /// Product master (.json or spreadsheet); defaults to PRODUCT_MASTER_PATH
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Save the item table as CSV
    #[arg(long)]
    csv: bool,
    /// Save the item table as Excel
    #[arg(long)]
    xlsx: bool,
    /// Export folder; defaults to EXPORT_DIR, then Downloads
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(p) => Catalog::load(p).with_context(|| format!("loading product master {}", p.display())),
        None => {
            tracing::warn!("no product master given; every product code will be flagged");
            Ok(Catalog::default())
        }
    }
}

fn print_document(doc: &ProcessedDocument) {
    println!("Processor: {} ({})", doc.kind, doc.processor_id);
    for field in &doc.header {
        println!(
            "  {}: {}  [{:.0}%, p.{}]",
            header_label(&field.field_type),
            field.value,
            field.confidence * 100.0,
            field.page
        );
    }
    println!();
    println!(
        "  {}",
        ITEM_COLUMNS.iter().map(|c| c.label).collect::<Vec<_>>().join(" | ")
    );
    for row in &doc.items {
        let values: Vec<&str> = ITEM_COLUMNS.iter().map(|c| row.display_value(c.key)).collect();
        let marker = if row.has_discrepancy { "!" } else { " " };
        println!("{} {}", marker, values.join(" | "));
    }
    if doc.discrepancy_count > 0 {
        println!();
        println!(
            "{} item(s) with product codes not found in the product master (marked !)",
            doc.discrepancy_count
        );
    }
}

fn run_process(config: &AppConfig, args: ProcessArgs) -> anyhow::Result<()> {
    let profile = config.profile(args.kind);
    let catalog_path = args.catalog.or_else(|| config.product_master_path.clone());
    let catalog = load_catalog(catalog_path.as_deref())?;

    let is_saved_response = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let response = (if is_saved_response {
        JsonFileSource.fetch_document(&args.file)
    } else {
        config.docai_client(args.kind)?.fetch_document(&args.file)
    })
    .with_context(|| format!("reading {}", args.file.display()))?;

    let doc = process_document(&response, &profile, &catalog)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_document(&doc);
    }

    let out_dir = args.out_dir.or_else(|| config.export_dir.clone());
    if args.csv {
        let artifact = export::export_items_csv(&doc.items, &profile, export::today());
        let path = save_artifact(&artifact, out_dir.as_deref())?;
        println!("CSV saved: {}", path.display());
    }
    if args.xlsx {
        let dir = match out_dir {
            Some(d) => d,
            None => export::default_export_dir()?,
        };
        std::fs::create_dir_all(&dir)?;
        let path = unique_path(&dir, &export_file_name(export::today(), "xlsx"));
        export::export_items_to_xlsx(&doc.items, &profile, &path)?;
        println!("Excel saved: {}", path.display());
    }
    Ok(())
}

fn run_catalog(path: &Path) -> anyhow::Result<()> {
    let catalog = load_catalog(Some(path))?;
    for p in catalog.products() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            p.id, p.product_code, p.product_name, p.purchase_price, p.sales_price
        );
    }
    println!("{} products", catalog.len());
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();
    let result = match cli.command {
        Commands::Process(args) => run_process(&config, args),
        Commands::Catalog { path } => run_catalog(&path),
        Commands::Status => {
            println!("{}", config.status());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
