use crate::{
    command::{TileArgs, sh_escape},
    render::{self, Rotation, SheetOptions},
};
use anyhow::{Context, ensure};
use rayon::prelude::*;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Tile cropped photos across printable sheets.
#[derive(clap::Parser, Debug, Clone)]
#[group(skip)]
pub struct Sheet {
    #[clap(flatten)]
    pub args: TileArgs,

    /// Rotate the finished sheet clockwise by a multiple of 90 degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub rotate_sheet: Option<Rotation>,

    /// Jpeg output quality.
    #[arg(long, short = 'q', default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Output file name. Only valid for a single input image.
    #[arg(long, short, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory to write "<name>-sheet.<extension>" outputs into. Defaults to the current directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output file extension when not using --output, decides the image format.
    #[arg(long, default_value = "jpg")]
    pub extension: String,

    /// Number of images to process concurrently. 0=auto.
    #[arg(long, short = 'T', default_value_t = 0)]
    pub threads: usize,

    /// Images to tile.
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

impl Sheet {
    pub fn run(&self) -> anyhow::Result<Vec<PathBuf>> {
        ensure!(
            self.output.is_none() || self.images.len() == 1,
            "--output requires a single input image, use --output-dir for {}",
            self.images.len()
        );
        let opts = SheetOptions {
            rotate_sheet: self.rotate_sheet,
            ..self.args.sheet_options()
        };

        let progress = indicatif::ProgressBar::new(self.images.len() as u64).with_style(
            indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.cyan.bold} {elapsed_precise:.bold} {pos}/{len} {msg}")?,
        );
        progress.enable_steady_tick(Duration::from_millis(100));
        progress.set_message("Rendering");

        let outputs = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?
            .install(|| {
                self.images
                    .par_iter()
                    .map(|image| {
                        let out = self.output_path(image);
                        process(image, &out, &opts, self.quality).with_context(|| {
                            format!("{} -> {}", sh_escape(image), sh_escape(&out))
                        })?;
                        progress.inc(1);
                        Ok(out)
                    })
                    .collect::<anyhow::Result<Vec<_>>>()
            })?;

        progress.finish_and_clear();
        for out in &outputs {
            println!("{}", sh_escape(out));
        }
        Ok(outputs)
    }

    fn output_path(&self, image: &Path) -> PathBuf {
        if let Some(out) = &self.output {
            return out.clone();
        }
        let stem = image.file_stem().unwrap_or_default().to_string_lossy();
        let mut out = self
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        out.push(format!("{stem}-sheet.{}", self.extension));
        out
    }
}

fn process(image: &Path, out: &Path, opts: &SheetOptions, quality: u8) -> anyhow::Result<()> {
    let src = render::load(image)?;
    let (layout, sheet) = render::render(&src, opts)?;
    drop(src);
    log::info!("{}: {layout}, {} tiles", sh_escape(image), layout.tile_count());

    render::save(&sheet, out, quality)?;
    Ok(())
}
