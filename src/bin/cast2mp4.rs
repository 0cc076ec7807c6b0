use std::path::PathBuf;

use clap::Parser;

use cast2mp4::{RawOptions, Theme, convert_cast_to_video};

#[derive(Parser, Debug)]
#[command(
    name = "cast2mp4",
    version,
    about = "Render an asciinema .cast recording to an MP4 video"
)]
struct Cli {
    /// Input .cast recording.
    input: PathBuf,

    /// Output MP4 path.
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Terminal viewport width in pixels.
    #[arg(long, default_value = "800")]
    width: String,

    /// Terminal viewport height in pixels.
    #[arg(long, default_value = "600")]
    height: String,

    /// Player color theme.
    #[arg(long, value_enum, default_value_t = Theme::Asciinema)]
    theme: Theme,

    /// Playback speed multiplier.
    #[arg(long, default_value = "1")]
    speed: String,

    /// Device scale factor (rendering density).
    #[arg(long, default_value = "2")]
    scale: String,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let raw = RawOptions {
        output: cli.output,
        width: cli.width,
        height: cli.height,
        theme: cli.theme,
        speed: cli.speed,
        scale: cli.scale,
    };

    if let Err(err) = convert_cast_to_video(&cli.input, &raw) {
        tracing::error!("conversion failed: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
