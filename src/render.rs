use crate::{
    error::{Error, Result},
    format::Dimension,
    layout::{CropArea, Layout},
};
use image::{DynamicImage, GenericImage, ImageFormat, imageops::FilterType};
use std::{
    fmt, fs,
    io::{self, BufWriter, Write},
    path::Path,
    str::FromStr,
};

const MM_PER_INCH: f64 = 25.4;

/// Clockwise rotation in quarter turns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(Error::InvalidRotation(degrees));
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Self::None,
            90 => Self::Cw90,
            180 => Self::Cw180,
            _ => Self::Cw270,
        })
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }

    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::None => img,
            Self::Cw90 => img.rotate90(),
            Self::Cw180 => img.rotate180(),
            Self::Cw270 => img.rotate270(),
        }
    }
}

impl FromStr for Rotation {
    type Err = anyhow::Error;

    fn from_str(v: &str) -> std::result::Result<Self, Self::Err> {
        let v = v.trim();
        let v = v.strip_suffix('°').unwrap_or(v);
        Ok(Self::from_degrees(v.trim().parse()?)?)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Pixel size of each tile before rotation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TileSize {
    /// Use the crop pixels as-is.
    #[default]
    Crop,
    /// Resize the crop to exactly these pixels.
    Pixels(Dimension),
    /// Resize the crop to the tile format (millimeters) printed at this resolution.
    Dpi(u32),
}

impl TileSize {
    /// Tile pixels for a `crop` sized crop of a `tile` format.
    pub fn pixels(self, crop: Dimension, tile: Dimension) -> Result<Dimension> {
        let px = match self {
            Self::Crop => crop,
            Self::Pixels(px) => px,
            Self::Dpi(dpi) => {
                let scale = |mm: u32| (f64::from(mm) * f64::from(dpi) / MM_PER_INCH).round() as u32;
                Dimension::new(scale(tile.width), scale(tile.height))
            }
        };
        px.validate("tile pixel")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetOptions {
    pub sheet: Dimension,
    pub tile: Dimension,
    /// Source crop, `None` for the whole image.
    pub crop: Option<CropArea>,
    pub tile_size: TileSize,
    pub rotate_tile: Option<Rotation>,
    pub rotate_sheet: Option<Rotation>,
}

impl SheetOptions {
    pub fn new(sheet: Dimension, tile: Dimension) -> Self {
        Self {
            sheet,
            tile,
            crop: None,
            tile_size: TileSize::Crop,
            rotate_tile: None,
            rotate_sheet: None,
        }
    }
}

/// Crop, resize & rotate the tile returning it with the matching tile format.
pub fn prepare_tile(src: &DynamicImage, opts: &SheetOptions) -> Result<(DynamicImage, Dimension)> {
    let crop = match opts.crop {
        Some(crop) => crop,
        None => CropArea::full(src.width(), src.height())?,
    };
    crop.check_within(src.width(), src.height())?;

    let mut tile = src.crop_imm(crop.x, crop.y, crop.width, crop.height);
    let px = opts.tile_size.pixels(crop.size(), opts.tile)?;
    if px != crop.size() {
        log::debug!("resizing {crop} crop to {px}px");
        tile = tile.resize_exact(px.width, px.height, FilterType::CatmullRom);
    }

    let rotation = opts.rotate_tile.unwrap_or_default();
    let format = match rotation.is_quarter_turn() {
        true => opts.tile.transposed(),
        false => opts.tile,
    };
    Ok((rotation.apply(tile), format))
}

/// Tile `src` across a new white sheet.
pub fn render(src: &DynamicImage, opts: &SheetOptions) -> Result<(Layout, DynamicImage)> {
    let (tile, tile_format) = prepare_tile(src, opts)?;
    let tile = tile.into_rgb8();
    let layout = Layout::new(
        opts.sheet,
        tile_format,
        Dimension::new(tile.width(), tile.height()),
    )?;
    log::debug!("{layout}");

    let mut sheet = image::RgbImage::from_pixel(layout.width, layout.height, image::Rgb([255; 3]));
    for placement in layout.placements() {
        sheet.copy_from(&tile, placement.rect.x, placement.rect.y)?;
    }
    drop(tile);

    let sheet = opts
        .rotate_sheet
        .unwrap_or_default()
        .apply(DynamicImage::ImageRgb8(sheet));
    Ok((layout, sheet))
}

pub fn load(path: &Path) -> Result<DynamicImage> {
    Ok(image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?)
}

/// Encode `img` to `path` with the format of its extension.
///
/// Written to a temporary file next to `path` then renamed, so a failure
/// never leaves a partial output.
pub fn save(img: &DynamicImage, path: &Path, jpeg_quality: u8) -> Result<()> {
    let format = ImageFormat::from_path(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let tmp = tempfile::Builder::new()
        .prefix(".photosheet-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    let mut out = BufWriter::new(tmp);
    match format {
        ImageFormat::Jpeg => {
            // jpeg has no alpha
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, jpeg_quality);
            rgb.write_with_encoder(encoder)?;
        }
        format => img.write_to(&mut out, format)?,
    }
    out.flush()?;
    let tmp = out.into_inner().map_err(io::IntoInnerError::into_error)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// 40x30 red image with a blue 10x10 square at 10,10.
    fn source() -> DynamicImage {
        let mut img = RgbImage::from_pixel(40, 30, RED);
        for x in 10..20 {
            for y in 10..20 {
                img.put_pixel(x, y, Rgb([0, 0, 255]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn a4_passport() -> SheetOptions {
        SheetOptions::new(Dimension::new(210, 297), Dimension::new(51, 51))
    }

    #[test]
    fn rotation_degrees() {
        assert_eq!(Rotation::from_degrees(0).unwrap(), Rotation::None);
        assert_eq!(Rotation::from_degrees(360).unwrap(), Rotation::None);
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::Cw270);
        assert_eq!(Rotation::from_degrees(450).unwrap(), Rotation::Cw90);
        assert!(matches!(
            Rotation::from_degrees(45),
            Err(Error::InvalidRotation(45))
        ));
        assert_eq!("180°".parse::<Rotation>().unwrap(), Rotation::Cw180);
        assert_eq!(" 270 ".parse::<Rotation>().unwrap(), Rotation::Cw270);
        assert!("ninety".parse::<Rotation>().is_err());
    }

    #[test]
    fn renders_white_border_and_tiles() {
        let opts = SheetOptions {
            crop: Some(CropArea::new(10, 10, 10, 10).unwrap()),
            ..a4_passport()
        };
        let (layout, sheet) = render(&source(), &opts).unwrap();
        let sheet = sheet.into_rgb8();

        assert_eq!((layout.cols, layout.rows), (4, 5));
        assert_eq!(sheet.dimensions(), (layout.width, layout.height));
        assert_eq!(*sheet.get_pixel(0, 0), WHITE);
        for p in layout.placements() {
            assert_eq!(*sheet.get_pixel(p.rect.x, p.rect.y), Rgb([0, 0, 255]));
            assert_eq!(
                *sheet.get_pixel(p.rect.right() - 1, p.rect.bottom() - 1),
                Rgb([0, 0, 255])
            );
        }
        // border below the last row
        assert!(layout.border_h > 0);
        let last = layout.placement(layout.rows - 1, 0).unwrap();
        assert_eq!(*sheet.get_pixel(last.rect.x, last.rect.bottom()), WHITE);
    }

    #[test]
    fn zero_rotation_is_noop() {
        let opts = SheetOptions {
            crop: Some(CropArea::new(5, 5, 30, 20).unwrap()),
            ..a4_passport()
        };
        let rotated = SheetOptions {
            rotate_tile: Some(Rotation::None),
            rotate_sheet: Some(Rotation::None),
            ..opts
        };
        let (layout_a, a) = render(&source(), &opts).unwrap();
        let (layout_b, b) = render(&source(), &rotated).unwrap();
        assert_eq!(layout_a, layout_b);
        assert_eq!(a.into_rgb8().into_raw(), b.into_rgb8().into_raw());
    }

    #[test]
    fn quarter_turn_tile_swaps_format() {
        let opts = SheetOptions {
            tile: Dimension::new(38, 48),
            crop: Some(CropArea::new(0, 0, 38, 48).unwrap()),
            rotate_tile: Some(Rotation::Cw90),
            ..a4_passport()
        };
        let (tile, format) = prepare_tile(&DynamicImage::new_rgb8(100, 100), &opts).unwrap();
        assert_eq!(tile.dimensions(), (48, 38));
        assert_eq!(format, Dimension::new(48, 38));
    }

    #[test]
    fn sheet_rotation_swaps_output() {
        let opts = SheetOptions {
            rotate_sheet: Some(Rotation::Cw270),
            ..a4_passport()
        };
        let (layout, sheet) = render(&source(), &opts).unwrap();
        assert_eq!(sheet.dimensions(), (layout.height, layout.width));
    }

    #[test]
    fn resize_by_pixels_and_dpi() {
        let opts = SheetOptions {
            tile_size: TileSize::Pixels(Dimension::new(64, 64)),
            ..a4_passport()
        };
        let (tile, _) = prepare_tile(&source(), &opts).unwrap();
        assert_eq!(tile.dimensions(), (64, 64));

        let opts = SheetOptions {
            tile: Dimension::new(38, 48),
            tile_size: TileSize::Dpi(300),
            ..a4_passport()
        };
        let (tile, _) = prepare_tile(&source(), &opts).unwrap();
        // 38mm & 48mm at 300dpi
        assert_eq!(tile.dimensions(), (449, 567));

        let opts = SheetOptions {
            tile_size: TileSize::Dpi(0),
            ..a4_passport()
        };
        assert!(matches!(
            prepare_tile(&source(), &opts),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn crop_outside_source_fails() {
        let opts = SheetOptions {
            crop: Some(CropArea::new(30, 0, 20, 20).unwrap()),
            ..a4_passport()
        };
        assert!(matches!(
            render(&source(), &opts),
            Err(Error::InvalidCropArea(_))
        ));
    }

    #[test]
    fn oversized_tile_fails_before_drawing() {
        let opts = SheetOptions {
            tile: Dimension::new(300, 51),
            ..a4_passport()
        };
        assert!(matches!(
            render(&source(), &opts),
            Err(Error::TileDoesNotFit { .. })
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let (_, sheet) = render(&source(), &a4_passport()).unwrap();

        let png = dir.path().join("sheet.png");
        save(&sheet, &png, 90).unwrap();
        let loaded = load(&png).unwrap();
        assert_eq!(loaded.dimensions(), sheet.dimensions());
        assert_eq!(loaded.into_rgb8().into_raw(), sheet.to_rgb8().into_raw());

        let jpg = dir.path().join("nested/sheet.jpg");
        save(&sheet, &jpg, 80).unwrap();
        assert_eq!(load(&jpg).unwrap().dimensions(), sheet.dimensions());

        // only the outputs, no temporaries
        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["nested", "sheet.png"]);
    }

    #[test]
    fn failed_save_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = DynamicImage::new_rgb8(4, 4);

        assert!(save(&sheet, &dir.path().join("sheet.nope"), 90).is_err());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("missing.jpg")),
            Err(Error::Io(_))
        ));
    }
}
