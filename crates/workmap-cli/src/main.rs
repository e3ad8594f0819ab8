use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use walkdir::WalkDir;
use workmap_core::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "workmap",
    about = "Lay out work-item boards as treemaps or block grids",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Squarified treemap: tile area proportional to worked hours
    Treemap(LayoutArgs),
    /// Block explorer: size-class squares packed into a bottom-anchored grid
    Blocks(LayoutArgs),
    /// Simple timing bench (lays every board out N times, prints time + coverage)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    // Input/Output
    /// Input file or directory (.json / .yaml / .yml boards or item arrays)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// YAML config file path (overrides layout options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Canvas
    /// Treemap canvas width
    #[arg(long, default_value_t = 400.0, help_heading = "Canvas")]
    width: f64,
    /// Treemap canvas height
    #[arg(long, default_value_t = 400.0, help_heading = "Canvas")]
    height: f64,
    /// Block container side
    #[arg(long, default_value_t = 400.0, help_heading = "Canvas")]
    container_size: f64,

    // Treemap
    /// Row aspect ratio threshold
    #[arg(long, default_value_t = 4.0, help_heading = "Treemap")]
    max_aspect_ratio: f64,
    /// Item type the treemap focuses on (falls back to all items when absent)
    #[arg(long, default_value = "Task", help_heading = "Treemap")]
    focus_type: String,
    /// Show every item in the treemap
    #[arg(long, default_value_t = false, help_heading = "Treemap")]
    no_focus: bool,

    // Blocks
    /// Fill percentage for every board (overrides board data)
    #[arg(long, help_heading = "Blocks")]
    fill: Option<f64>,
    /// Inset on every side of a block
    #[arg(long, default_value_t = 2.0, help_heading = "Blocks")]
    padding: f64,
    /// Upper bound for the grid column count
    #[arg(long, default_value_t = 32, help_heading = "Blocks")]
    max_columns: u32,

    /// Lay boards out in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Batch")]
    parallel: bool,

    // Export
    /// Metadata format: json | json-by-id | template
    #[arg(long, default_value = "json", value_parser = ["json", "json-by-id", "template"], help_heading = "Export")]
    metadata: String,
    /// External template file (handlebars), used when --metadata template (default: built-in csv)
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Export layout stats (JSON, keyed by board) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layouts and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input file or directory
    input: PathBuf,
    /// Layout: treemap | blocks
    #[arg(long, value_parser = ["treemap", "blocks"], default_value = "blocks")]
    layout: String,
    /// Number of passes over all boards
    #[arg(long, default_value_t = 100)]
    iterations: u32,
    /// Lay boards out in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Treemap(args) => run_layout(args, LayoutKind::Treemap, show_progress),
        Commands::Blocks(args) => run_layout(args, LayoutKind::Blocks, show_progress),
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_layout(cli: &LayoutArgs, kind: LayoutKind, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = LayoutConfig::builder()
        .kind(kind)
        .with_canvas(cli.width, cli.height)
        .container_size(cli.container_size)
        .max_aspect_ratio(cli.max_aspect_ratio)
        .focus_type((!cli.no_focus).then(|| cli.focus_type.clone()))
        .block_padding(cli.padding)
        .max_columns(cli.max_columns)
        .parallel(cli.parallel)
        .build();

    // Config file sets layout options en bloc; the subcommand still picks the algorithm
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_layout_config(cfg);
        cfg.kind = kind;
    }
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let mut boards = load_boards_with_progress(&paths, show_progress)?;
    if let Some(fill) = cli.fill {
        for b in &mut boards {
            b.fill_percentage = Some(fill);
        }
    }
    info!(count = boards.len(), "loaded boards");
    if boards.is_empty() {
        warn!(input = ?cli.input, "no boards found");
        return Ok(());
    }

    let template = if cli.metadata == "template" {
        Some(match &cli.template {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("read template {}", path.display()))?,
            None => include_str!("templates/csv.hbs").to_string(),
        })
    } else {
        None
    };
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    if let Some(tpl) = &template {
        reg.register_template_string("tpl", tpl)?;
    }

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    }

    let results = layout_boards(&boards, &cfg);
    let mut all_stats = serde_json::Map::new();
    for (board, result) in boards.iter().zip(results) {
        let layout = match result {
            Ok(l) => l,
            Err(e) => {
                error!(board = %board.name, error = %e, "layout failed");
                continue;
            }
        };
        let stats = layout.stats();
        info!(board = %board.name, "{}", stats.summary());
        all_stats.insert(board.name.clone(), serde_json::to_value(stats)?);

        let file_stem = sanitize_file_stem(&board.name);
        let (out_path, contents) = match cli.metadata.as_str() {
            "json" => (
                cli.out_dir.join(format!("{file_stem}.json")),
                serde_json::to_string_pretty(&to_json(&layout))?,
            ),
            "json-by-id" => (
                cli.out_dir.join(format!("{file_stem}.json")),
                serde_json::to_string_pretty(&to_json_by_id(&layout))?,
            ),
            "template" => {
                let ctx = build_template_context(board, &layout);
                (
                    cli.out_dir.join(format!("{file_stem}.txt")),
                    reg.render("tpl", &ctx)?,
                )
            }
            other => anyhow::bail!("unknown metadata format: {}", other),
        };
        if !cli.dry_run {
            fs::write(&out_path, contents)
                .with_context(|| format!("write {}", out_path.display()))?;
            info!(?out_path, "layout written");
        }
    }

    if let Some(stats_path) = &cli.export_stats {
        let value = serde_json::Value::Object(all_stats);
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let paths = gather_paths(&b.input, &[], &[])?;
    let boards = load_boards_with_progress(&paths, false)?;
    let kind: LayoutKind = b
        .layout
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown layout: {}", b.layout))?;
    let cfg = LayoutConfig::builder()
        .kind(kind)
        .parallel(b.parallel)
        .build();
    let iterations = b.iterations.max(1);

    let start = Instant::now();
    let mut coverage_sum = 0.0;
    let mut laid_out = 0usize;
    for _ in 0..iterations {
        for layout in layout_boards(&boards, &cfg).into_iter().flatten() {
            coverage_sum += layout.stats().coverage;
            laid_out += 1;
        }
    }
    let dur = start.elapsed();
    let mean_coverage = if laid_out > 0 {
        coverage_sum / laid_out as f64 * 100.0
    } else {
        0.0
    };
    println!(
        "boards={} iterations={} coverage={:.2}% time={} per_pass={}",
        boards.len(),
        iterations,
        mean_coverage,
        bench_fmt_dur(dur),
        bench_fmt_dur(dur / iterations)
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_board_file(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file()
                && !should_skip(p, inc_set.as_ref(), exc_set.as_ref())
                && is_board_file(p)
            {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn file_ext(p: &Path) -> Option<String> {
    p.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn is_board_file(p: &Path) -> bool {
    matches!(file_ext(p), Some(ext) if matches!(ext.as_str(), "json" | "yaml" | "yml"))
}

/// Shapes accepted in a board file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoardFile {
    Items(Vec<WorkItem>),
    Board(Board),
    Boards(Vec<Board>),
}

fn load_boards_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<Board>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::new();
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_board_file(p) {
            Ok(boards) => list.extend(boards),
            Err(e) => {
                error!(?p, error = %e, "skip board file");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_board_file(p: &Path) -> anyhow::Result<Vec<Board>> {
    let text = fs::read_to_string(p)?;
    let parsed: BoardFile = match file_ext(p).as_deref() {
        Some("json") => serde_json::from_str(&text)?,
        _ => serde_yaml::from_str(&text)?,
    };
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("board")
        .to_string();
    let mut boards = match parsed {
        BoardFile::Items(items) => vec![Board::new(stem.clone(), items)],
        BoardFile::Board(b) => vec![b],
        BoardFile::Boards(bs) => bs,
    };
    let many = boards.len() > 1;
    for (i, b) in boards.iter_mut().enumerate() {
        if b.name.trim().is_empty() {
            b.name = if many {
                format!("{stem}_{i}")
            } else {
                stem.clone()
            };
        }
    }
    Ok(boards)
}

fn sanitize_file_stem(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() { "board".into() } else { s }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Serialize)]
struct TemplateTile {
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    priority: String,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    weight: f64,
    order: usize,
}

#[derive(Serialize)]
struct TemplateContext {
    board: String,
    layout: &'static str,
    canvas: serde_json::Value,
    tiles: Vec<TemplateTile>,
    unplaced: Vec<u64>,
    stats: LayoutStats,
}

fn build_template_context(board: &Board, layout: &BoardLayout<'_>) -> TemplateContext {
    let canvas = layout.canvas();
    let tiles = layout
        .tiles()
        .iter()
        .enumerate()
        .map(|(order, t)| TemplateTile {
            id: t.item.id,
            kind: t.item.kind.clone(),
            priority: t
                .item
                .priority
                .map(|p| format!("{p:?}"))
                .unwrap_or_default(),
            x: t.rect.x,
            y: t.rect.y,
            w: t.rect.w,
            h: t.rect.h,
            weight: t.weight,
            order,
        })
        .collect();
    TemplateContext {
        board: board.name.clone(),
        layout: match layout {
            BoardLayout::Treemap(_) => "treemap",
            BoardLayout::Blocks(_) => "blocks",
        },
        canvas: serde_json::json!({"w": canvas.w, "h": canvas.h}),
        tiles,
        unplaced: layout.unplaced().iter().map(|it| it.id).collect(),
        stats: layout.stats(),
    }
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    width: Option<f64>,
    height: Option<f64>,
    container_size: Option<f64>,
    max_aspect_ratio: Option<f64>,
    min_weight: Option<f64>,
    focus_type: Option<String>,
    container_types: Option<Vec<String>>,
    block_padding: Option<f64>,
    min_fill_percentage: Option<f64>,
    max_fill_percentage: Option<f64>,
    max_columns: Option<u32>,
    row_headroom: Option<u32>,
    size_buckets: Option<Vec<SizeBucket>>,
    overflow_size: Option<u32>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_layout_config(self, mut cfg: LayoutConfig) -> LayoutConfig {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.container_size {
            cfg.container_size = v;
        }
        if let Some(v) = self.max_aspect_ratio {
            cfg.max_aspect_ratio = v;
        }
        if let Some(v) = self.min_weight {
            cfg.min_weight = v;
        }
        if let Some(v) = self.focus_type {
            // an empty string disables the focus filter
            cfg.focus_type = (!v.trim().is_empty()).then_some(v);
        }
        if let Some(v) = self.container_types {
            cfg.container_types = v;
        }
        if let Some(v) = self.block_padding {
            cfg.block_padding = v;
        }
        if let Some(v) = self.min_fill_percentage {
            cfg.min_fill_percentage = v;
        }
        if let Some(v) = self.max_fill_percentage {
            cfg.max_fill_percentage = v;
        }
        if let Some(v) = self.max_columns {
            cfg.max_columns = v;
        }
        if let Some(v) = self.row_headroom {
            cfg.row_headroom = v;
        }
        if let Some(v) = self.size_buckets {
            cfg.size_buckets = v;
        }
        if let Some(v) = self.overflow_size {
            cfg.overflow_size = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        cfg
    }
}
