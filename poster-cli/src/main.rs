use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use poster_core::Poster;
use tracing_subscriber::EnvFilter;

mod description;

use description::PosterDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Eps,
    Both,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build a two-column poster from a TOML description",
    long_about = None
)]
struct Args {
    /// Poster description (TOML with [poster], [typeset] and [[box]] tables)
    description: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Override the output file stem from the description
    #[arg(short, long)]
    output: Option<String>,

    /// Draw a dashed 5 cm grid over the poster
    #[arg(long)]
    grid: bool,

    /// Stroke the bounding box of every content block
    #[arg(long)]
    bbox: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    run(Args::parse())
}

/// Load the description and lay out the poster, applying the
/// command-line overrides.
fn build_poster(args: &Args) -> Result<Poster> {
    let mut description = PosterDescription::load(&args.description)?;
    tracing::debug!(
        path = %args.description.display(),
        boxes = description.boxes.len(),
        "loaded description"
    );
    if let Some(stem) = &args.output {
        description.poster.output_stem = stem.clone();
    }
    let mut poster = description.build(args.bbox)?;
    if args.grid {
        poster.print_grid();
    }
    Ok(poster)
}

fn run(args: Args) -> Result<()> {
    let poster = build_poster(&args)?;

    if matches!(args.format, Format::Pdf | Format::Both) {
        let path = poster.export_as_pdf().context("failed to write PDF")?;
        println!("wrote {}", path.display());
    }
    if matches!(args.format, Format::Eps | Format::Both) {
        let path = poster.export_as_eps().context("failed to write EPS")?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use poster_core::surface::DrawOp;

    use super::*;

    #[test]
    fn parses_flags() {
        let args =
            Args::try_parse_from(["poster", "p.toml", "--format", "both", "--grid"]).unwrap();
        assert_eq!(args.format, Format::Both);
        assert!(args.grid);
        assert!(!args.bbox);
        assert_eq!(args.description, PathBuf::from("p.toml"));
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Args::try_parse_from(["poster", "p.toml", "--format", "svg"]).is_err());
    }

    /// Write a one-pixel logo and a description with two boxes.
    fn write_description(dir: &std::path::Path) -> PathBuf {
        let logo = dir.join("logo.png");
        {
            let file = std::fs::File::create(&logo).unwrap();
            let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), 1, 1);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0]).unwrap();
        }
        let toml_path = dir.join("poster.toml");
        std::fs::write(
            &toml_path,
            format!(
                "[poster]\ntitle = \"T\"\nlogo = {:?}\n\n\
                 [[box]]\ncolumn = \"left\"\ntitle = \"A\"\nmarkup = \"text\"\n\n\
                 [[box]]\ncolumn = \"right\"\ntitle = \"B\"\nmarkup = \"more\"\n",
                logo.to_string_lossy()
            ),
        )
        .unwrap();
        toml_path
    }

    fn strokes(poster: &Poster) -> usize {
        poster
            .surface()
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { .. }))
            .count()
    }

    #[test]
    fn bbox_flag_outlines_every_box() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = write_description(dir.path());
        let args = |flag: &str| {
            Args::try_parse_from(["poster", toml_path.to_str().unwrap(), flag]).unwrap()
        };

        let plain = build_poster(&args("--format=pdf")).unwrap();
        assert_eq!(strokes(&plain), 0);
        let outlined = build_poster(&args("--bbox")).unwrap();
        assert_eq!(strokes(&outlined), 2);
    }

    #[test]
    fn run_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = write_description(dir.path());
        let stem = dir.path().join("out").to_string_lossy().into_owned();
        run(Args {
            description: toml_path,
            format: Format::Both,
            output: Some(stem),
            grid: true,
            bbox: false,
        })
        .unwrap();
        assert!(dir.path().join("out.pdf").exists());
        assert!(dir.path().join("out.eps").exists());
    }
}
