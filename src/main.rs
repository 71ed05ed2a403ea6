use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iconpress::{
    CornerStyle, ExportFormat, HexColor, IconConfig, IconRenderer, RenderOutcome, read_directory,
};

#[derive(Parser)]
#[command(name = "iconpress")]
#[command(about = "Render a vector glyph into an app icon (PNG, JPEG or ICO)")]
struct Cli {
    /// SVG file with the glyph
    input: PathBuf,

    /// Output file path (defaults to the input name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// JSON config file in the editor's persisted format
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Icon edge length in pixels
    #[arg(short, long)]
    size: Option<u32>,

    /// Background color (e.g. "#222222")
    #[arg(long)]
    background: Option<HexColor>,

    /// Glyph color (e.g. "#eeeeee")
    #[arg(long)]
    foreground: Option<HexColor>,

    /// Background opacity, 0.0 to 1.0
    #[arg(long)]
    opacity: Option<f32>,

    /// Space between the icon edge and the glyph, in pixels
    #[arg(long)]
    padding: Option<u32>,

    /// Corner radius of the background, in pixels
    #[arg(long)]
    radius: Option<u32>,

    /// Corner construction
    #[arg(long, value_enum)]
    corner_style: Option<CornerStyle>,

    /// Re-read the written file and print what it contains
    #[arg(long)]
    verify: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iconpress=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let svg_text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let config = build_config(&cli, svg_text)?;

    let format = match (cli.format, &cli.output) {
        (Some(format), _) => format,
        (None, Some(output)) => format_from_extension(output)?,
        (None, None) => config.img_format,
    };
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension(format.extension()));

    let renderer = IconRenderer::new(config)?;
    match renderer.render().await? {
        RenderOutcome::Drawn => {}
        RenderOutcome::SkippedEmptySource => bail!("{} is empty", cli.input.display()),
        RenderOutcome::Dropped => bail!("render was dropped"),
    }

    let blob = renderer.export(format).await?;
    std::fs::write(&output, &blob.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({}, {} bytes)",
        output.display(),
        blob.mime_type,
        blob.bytes.len()
    );

    if cli.verify {
        verify(&output, format)?;
    }

    Ok(())
}

/// Starts from the config file (or defaults), then applies flag overrides.
fn build_config(cli: &Cli, svg_text: String) -> anyhow::Result<IconConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            IconConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => IconConfig::default(),
    };
    config.svg_text = svg_text;

    if let Some(size) = cli.size {
        config = config.with_size(size);
    }
    if let Some(color) = cli.background {
        config.background_color = color;
    }
    if let Some(color) = cli.foreground {
        config.stroke_color = color;
    }
    if let Some(opacity) = cli.opacity {
        config.opacity = opacity;
    }
    if let Some(padding) = cli.padding {
        config.padding = padding;
    }
    if let Some(radius) = cli.radius {
        config.radius = radius;
    }
    if let Some(style) = cli.corner_style {
        config.corner_style = style;
    }
    if let Some(format) = cli.format {
        config.img_format = format;
    }

    config.validate()?;
    Ok(config)
}

fn format_from_extension(path: &Path) -> anyhow::Result<ExportFormat> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .with_context(|| format!("cannot infer a format from {}", path.display()))?;
    Ok(ext.parse()?)
}

fn verify(path: &Path, format: ExportFormat) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)?;
    match format {
        ExportFormat::Ico => {
            let entries = read_directory(&bytes)?;
            println!("  {} images", entries.len());
            for entry in entries {
                let payload = entry
                    .payload(&bytes)
                    .context("directory entry points outside the file")?;
                let image = image::load_from_memory(payload)?;
                println!(
                    "  {:>3}x{:<3} {:>7} bytes at {:>7} (decoded {}x{})",
                    entry.width,
                    entry.height,
                    entry.size,
                    entry.offset,
                    image.width(),
                    image.height()
                );
            }
        }
        ExportFormat::Png | ExportFormat::Jpeg => {
            let image = image::load_from_memory(&bytes)?;
            println!("  {}x{}", image.width(), image.height());
        }
    }
    Ok(())
}
