use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use trade_trends::format::{self, Numeric};
use trade_trends::initializer::reveal_end_labels;
use trade_trends::shaper::shape;
use trade_trends::{Dashboard, FileSurface, GateOptions, ImageFormat, InitEvent, ManualClock};
use trade_trends::{PageConfig, RenderedChart, export, globals};

#[derive(Parser, Debug)]
#[command(
    name = "trade-trends",
    version,
    about = "Render, export & validate trade-trend dashboard charts"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every chart of a page through the lazy pipeline.
    Render(RenderArgs),
    /// Write one chart's data as CSV.
    ExportCsv(ExportArgs),
    /// Print the shared tooltip of one category.
    Tooltip(TooltipArgs),
    /// Print the end-point labels a chart reveals after its entrance animation.
    Labels(LabelsArgs),
    /// Round a value half away from zero and print it formatted.
    Round(RoundArgs),
    /// Check a page file and list its charts.
    Validate(ValidateArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Svg,
    Png,
}

impl From<OutFormat> for ImageFormat {
    fn from(f: OutFormat) -> Self {
        match f {
            OutFormat::Svg => ImageFormat::Svg,
            OutFormat::Png => ImageFormat::Png,
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Page file (JSON) listing the charts.
    #[arg(short, long)]
    page: PathBuf,
    /// Directory receiving one file per chart, named after its container id.
    #[arg(short, long)]
    out_dir: PathBuf,
    #[arg(long, value_enum, default_value_t = OutFormat::Svg)]
    format: OutFormat,
    /// Width of every chart (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of every chart. Defaults to each chart's configured height.
    #[arg(long)]
    height: Option<u32>,
    /// Height of the simulated viewport scrolled down the page.
    #[arg(long, default_value_t = 900.0)]
    viewport: f32,
    /// Render every chart right away instead of waiting for it to scroll into view.
    #[arg(long)]
    eager: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(short, long)]
    page: PathBuf,
    /// Chart identifier (`idx` in the page file).
    #[arg(short, long)]
    idx: String,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct TooltipArgs {
    #[arg(short, long)]
    page: PathBuf,
    #[arg(short, long)]
    idx: String,
    /// Zero-based category index.
    #[arg(short, long)]
    category: usize,
    /// Print the tooltip markup instead of plain text.
    #[arg(long)]
    html: bool,
}

#[derive(Args, Debug)]
struct LabelsArgs {
    #[arg(short, long)]
    page: PathBuf,
    #[arg(short, long)]
    idx: String,
    /// Print each label's markup instead of `series<TAB>category<TAB>value` lines.
    #[arg(long)]
    html: bool,
}

#[derive(Args, Debug)]
struct RoundArgs {
    /// Number or numeric text, e.g. 3.455 or -2.5
    #[arg(allow_hyphen_values = true)]
    value: String,
    /// Decimal places; negative values round to tens, hundreds, ...
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    places: f64,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[arg(short, long)]
    page: PathBuf,
}

fn load_page(path: &Path) -> Result<PageConfig> {
    PageConfig::load(path).with_context(|| format!("failed to load page {}", path.display()))
}

/// The chart handle a surface would receive, without drawing it.
fn build_chart(path: &Path, idx: &str) -> Result<RenderedChart> {
    let page = load_page(path)?;
    let config = page
        .chart(idx)
        .ok_or_else(|| anyhow::anyhow!("no chart with idx `{}` in {}", idx, path.display()))?;
    let shaped = shape(&config.series)?;
    Ok(RenderedChart::build(config, &shaped))
}

fn main() -> Result<()> {
    env_logger::init();
    globals::init(globals::GlobalOptions::default())?;
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::ExportCsv(args) => cmd_export(args),
        Command::Tooltip(args) => cmd_tooltip(args),
        Command::Labels(args) => cmd_labels(args),
        Command::Round(args) => cmd_round(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let page = load_page(&args.page)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let mut surface = FileSurface::new(&args.out_dir, args.format.into(), args.width);
    if let Some(h) = args.height {
        surface = surface.with_height(h);
    }
    let mut dashboard = if args.eager {
        Dashboard::without_observer(&page, args.width as f32)
    } else {
        Dashboard::new(&page, args.width as f32, GateOptions::default())
    };
    dashboard.mount_all(&mut surface);

    let clock = ManualClock::new();
    let events = dashboard.run_to_completion(&clock, &mut surface, args.viewport)?;
    for ev in &events {
        if let InitEvent::Rendered { container_id } = ev {
            eprintln!("Wrote {}", surface.path_for(container_id).display());
        }
    }
    eprintln!(
        "Rendered {} of {} charts",
        dashboard.rendered(),
        page.charts.len()
    );
    Ok(())
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let page = load_page(&args.page)?;
    let chart = page
        .chart(&args.idx)
        .ok_or_else(|| anyhow::anyhow!("no chart with idx `{}` in {}", args.idx, args.page.display()))?;
    export::save_csv(chart, &args.out)?;
    eprintln!("Saved {} to {}", chart.container_id(), args.out.display());
    Ok(())
}

fn cmd_tooltip(args: TooltipArgs) -> Result<()> {
    let chart = build_chart(&args.page, &args.idx)?;
    let tooltip = if args.html {
        chart.tooltip_html(args.category)
    } else {
        chart.tooltip_text(args.category)
    };
    let Some(tooltip) = tooltip else {
        anyhow::bail!(
            "category {} out of range, {} has {} categories",
            args.category,
            chart.container_id,
            chart.categories.len()
        );
    };
    println!("{tooltip}");
    Ok(())
}

fn cmd_labels(args: LabelsArgs) -> Result<()> {
    let mut chart = build_chart(&args.page, &args.idx)?;
    reveal_end_labels(&mut chart.series);
    let suffix = chart.config.suffix.as_str();
    for (s, i, p) in chart.visible_labels() {
        if args.html {
            println!("{}", format::data_label_html(&s.color, p.y, suffix));
        } else {
            println!(
                "{}\t{}\t{}",
                s.name,
                chart.categories.get(i).map_or(p.name.as_str(), String::as_str),
                format::format_value(p.y, suffix)
            );
        }
    }
    Ok(())
}

fn cmd_round(args: RoundArgs) -> Result<()> {
    let rounded = format::round(Numeric::from(args.value.as_str()), args.places);
    if rounded.is_nan() {
        anyhow::bail!("not a number: {}", args.value);
    }
    let decimals = args.places.trunc().max(0.0) as usize;
    println!(
        "{}\t{}",
        rounded,
        format::format_number(rounded, decimals, &globals::options())
    );
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let page = load_page(&args.page)?;
    println!("{} ({} charts)", page.title, page.charts.len());
    for c in &page.charts {
        let categories = c.series.first().map_or(0, |s| s.categories().len());
        println!(
            "{}\t{}\t{} series, {} categories",
            c.container_id(),
            c.title,
            c.series.len(),
            categories
        );
    }
    Ok(())
}
