use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod glyph;
mod icon_gen;
mod manifest;

#[derive(Debug, Parser)]
#[clap(
    name = "favicon-gen",
    about = "Generate favicon and app icon files with a gradient letter-glyph design"
)]
struct Args {
    /// Output directory the relative icon paths are resolved against.
    #[clap(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Text drawn in the center of each icon.
    #[clap(long, value_name = "TEXT", default_value = "F")]
    letter: String,

    /// Path to a TTF/OTF font file. Well-known system fonts are probed when
    /// omitted; the built-in bitmap face is used when nothing loads.
    #[clap(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Gradient color at the top row (CSS color format).
    #[clap(long, value_name = "COLOR", default_value = "#1a237e")]
    start_color: String,

    /// Gradient color at the bottom row (CSS color format).
    #[clap(long, value_name = "COLOR", default_value = "#4a148c")]
    end_color: String,

    /// Custom PNG icon sizes to generate. When set, only these sizes are generated.
    #[clap(short, long, value_delimiter = ',', value_name = "SIZES")]
    png: Option<Vec<u32>>,

    /// Also write a manifest.json listing the generated PNG icons.
    #[clap(long)]
    manifest: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let options = icon_gen::Options {
        output: args.output,
        letter: args.letter,
        font: args.font,
        start_color: args.start_color,
        end_color: args.end_color,
        png: args.png,
        manifest: args.manifest,
    };

    icon_gen::generate_icons(&options)
}
