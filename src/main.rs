use clap::Parser;
use panel_cutlist::render;
use panel_cutlist::{Job, PackingConfig, PackingOrchestrator, PieceRequest};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "panel_cutlist",
    about = "Lay out a panel cut list on stock sheets"
)]
struct Cli {
    /// Stock sheet dimensions in inches (WxH, e.g. 48x96)
    #[arg(long, default_value = "48x96")]
    sheet: String,

    /// Pieces as WxH:qty[:bands] (e.g. 23.5x30:4:2 11.25x22:6)
    #[arg(long = "piece", num_args = 1..)]
    pieces: Vec<String>,

    /// Read config and pieces from a JSON job file instead
    #[arg(long, conflicts_with_all = ["pieces", "sheet"])]
    job: Option<std::path::PathBuf>,

    /// Blade kerf in inches
    #[arg(long)]
    kerf: Option<f64>,

    /// Disable piece rotation
    #[arg(long)]
    no_rotate: bool,

    /// Skip the uniform-width column pass
    #[arg(long)]
    no_strip: bool,

    /// Cap distinct piece sizes per sheet
    #[arg(long)]
    conservative: bool,

    /// Try every piece ordering and keep the best layout
    #[arg(long)]
    explore_orders: bool,

    /// One-cut dimensions, comma separated (default: the sheet sides)
    #[arg(long, value_delimiter = ',')]
    efficient: Vec<f64>,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Log progress to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_dimensions(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    if !(width > 0.0 && height > 0.0) {
        return Err(format!("dimensions must be positive in '{}'", s));
    }
    Ok((width, height))
}

fn parse_piece(s: &str) -> Result<PieceRequest, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid piece '{}', expected WxH:qty[:bands]", s));
    }
    let (width, height) = parse_dimensions(parts[0])?;
    let qty = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    let bands = match parts.get(2) {
        Some(b) => b
            .parse::<u32>()
            .map_err(|_| format!("invalid edge banding count in '{}'", s))?,
        None => 0,
    };
    let (dw, dh) = parts[0].split_once('x').unwrap_or((parts[0], ""));
    Ok(PieceRequest::new(width, height, qty)
        .with_display(dw.trim(), dh.trim())
        .with_edge_banding(bands))
}

fn load_job(cli: &Cli) -> Result<Job, String> {
    let mut job = match &cli.job {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            serde_json::from_str::<Job>(&text)
                .map_err(|e| format!("invalid job file {}: {}", path.display(), e))?
        }
        None => {
            let (width, height) = parse_dimensions(&cli.sheet)?;
            let pieces = cli
                .pieces
                .iter()
                .map(|p| parse_piece(p))
                .collect::<Result<Vec<_>, _>>()?;
            Job {
                config: PackingConfig::default()
                    .with_sheet(width, height)
                    .with_efficient_dims(vec![width, height]),
                pieces,
            }
        }
    };

    if let Some(kerf) = cli.kerf {
        job.config.kerf = kerf;
    }
    if !cli.efficient.is_empty() {
        job.config.efficient_dims = cli.efficient.clone();
    }
    if cli.no_strip {
        job.config.strip_mode = false;
    }
    if cli.conservative {
        job.config.conservative_mode = true;
    }
    if cli.explore_orders {
        job.config.explore_orders = true;
    }
    if cli.no_rotate {
        for piece in &mut job.pieces {
            piece.allow_rotate = false;
        }
    }
    Ok(job)
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let job = load_job(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let orchestrator = PackingOrchestrator::new(job.config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let result = orchestrator.solve(&job.pieces);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    for error in &result.errors {
        println!("Error: {}", error);
    }
    for warning in &result.warnings {
        println!("Warning: {}", warning);
    }

    for (i, (sheet, rects)) in result.sheets.iter().zip(&result.placements).enumerate() {
        let kind = if sheet.strip { " [columns]" } else { "" };
        println!(
            "Sheet {}{}: {} cuts, {} edge banding",
            i + 1,
            kind,
            sheet.cut_count,
            sheet.edge_banding_total
        );
        for r in rects {
            let rot = if r.rotated { " [rotated]" } else { "" };
            println!("  {} @ ({}, {}){}", r.label, r.x, r.y, rot);
        }
        if cli.layout {
            print!("{}", render::render_sheet(result.stock, rects));
        }
        println!();
    }

    let totals = &result.totals;
    println!(
        "Summary: {} sheet{} used, {:.1}% waste, {} cuts ({} one-cut pieces), {} edge banding",
        totals.sheet_count,
        if totals.sheet_count == 1 { "" } else { "s" },
        totals.waste_percent,
        totals.cut_count,
        totals.efficient_pieces,
        totals.edge_banding_total,
    );
}
