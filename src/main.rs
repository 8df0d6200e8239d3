use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pagegrab::{grab, GrabConfig, ImageFormat};

#[derive(Parser, Debug)]
#[command(
    name = "pagegrab",
    about = "Grab a web page as a single self-contained HTML file",
    version,
    long_about = "Fetches a page, inlines its images, stylesheets, and scripts as embedded \
                  data, optionally captures a screenshot through headless Chrome, and packages \
                  the outputs into a zip archive."
)]
struct GrabCommand {
    /// The URL of the page to grab
    #[arg(required = true)]
    url: String,

    /// Directory the outputs are written into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip producing the embedded HTML
    #[arg(long)]
    no_html: bool,

    /// Skip capturing the screenshot
    #[arg(long)]
    no_snapshot: bool,

    /// Skip packaging the zip archive
    #[arg(long)]
    no_zip: bool,

    /// Screenshot format: png, jpg, or webp
    #[arg(long, default_value = "png")]
    format: ImageFormat,

    /// Overlay this text on the screenshot
    #[arg(long)]
    watermark: Option<String>,

    /// Per-fetch timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Run the browser with a visible window
    #[arg(long)]
    visible: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = GrabCommand::parse();

    let mut builder = GrabConfig::builder(&args.url)
        .create_html(!args.no_html)
        .create_snapshot(!args.no_snapshot)
        .create_zip(!args.no_zip)
        .image_format(args.format)
        .fetch_timeout_secs(args.timeout)
        .headless(!args.visible);
    if let Some(text) = &args.watermark {
        builder = builder.insert_watermark(true).watermark_text(text.clone());
    }

    let result = grab(builder.build()).await?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("cannot create {}", args.output_dir.display()))?;

    if let Some(html) = &result.html {
        let path = args.output_dir.join("page.html");
        std::fs::write(&path, html)
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!("Page saved to {}", path.display());
    }

    if let Some(image) = &result.image {
        let path = args
            .output_dir
            .join(format!("snap.{}", args.format.extension()));
        std::fs::write(&path, image)
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!("Snapshot saved to {}", path.display());
    }

    if let Some(zip) = &result.zip {
        let path = args.output_dir.join("page.zip");
        std::fs::write(&path, zip)
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!("Archive saved to {}", path.display());
    }

    Ok(())
}
