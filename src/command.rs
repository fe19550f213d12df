mod formats;
mod plan;
mod print_completions;
mod sheet;

pub use formats::*;
pub use plan::*;
pub use print_completions::*;
pub use sheet::*;

use crate::{
    format::{Dimension, FormatArg, parse_dimension},
    layout::CropArea,
    render::{Rotation, SheetOptions, TileSize},
};

/// Sheet, tile & crop arguments shared by rendering & planning.
#[derive(clap::Args, Debug, Clone)]
#[group(skip)]
pub struct TileArgs {
    /// Sheet format. A preset name (see `formats`) or WIDTHxHEIGHT in mm.
    #[arg(long, short, env = "PHOTOSHEET_SHEET", default_value = "A4")]
    pub sheet: FormatArg,

    /// Tile/photo format. A preset name (see `formats`) or WIDTHxHEIGHT in mm.
    #[arg(long, short, env = "PHOTOSHEET_TILE", default_value = "PassportPhoto")]
    pub tile: FormatArg,

    /// Source crop in pixels, "X,Y,WIDTH,HEIGHT" or corners "X1,Y1:X2,Y2".
    /// Defaults to the whole image.
    #[arg(long, short)]
    pub crop: Option<CropArea>,

    /// Resize each cropped tile to exactly WIDTHxHEIGHT pixels.
    #[arg(long, value_parser = parse_dimension, conflicts_with = "dpi")]
    pub tile_pixels: Option<Dimension>,

    /// Resize each cropped tile to its tile format printed at this resolution.
    #[arg(long, env = "PHOTOSHEET_DPI")]
    pub dpi: Option<u32>,

    /// Rotate each tile clockwise by a multiple of 90 degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub rotate_tile: Option<Rotation>,
}

impl TileArgs {
    pub fn tile_size(&self) -> TileSize {
        match (self.tile_pixels, self.dpi) {
            (Some(px), _) => TileSize::Pixels(px),
            (None, Some(dpi)) => TileSize::Dpi(dpi),
            (None, None) => TileSize::Crop,
        }
    }

    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            crop: self.crop,
            tile_size: self.tile_size(),
            rotate_tile: self.rotate_tile,
            ..SheetOptions::new(self.sheet.0, self.tile.0)
        }
    }
}

pub fn sh_escape(path: &std::path::Path) -> std::borrow::Cow<'_, str> {
    shell_escape::escape(path.display().to_string().into())
}
