//! Grid arithmetic for tiling a crop across a sheet.
//!
//! Row & column counts come from the physical formats, the border is the
//! physical leftover scaled into tile pixels and spread over `n + 1` gaps so
//! there is a border before the first and after the last tile.
use crate::{
    error::{Error, Result},
    format::Dimension,
};
use std::{fmt, str::FromStr};

/// Rgb8 sheet allocation limit, same as the default `image::Limits::max_alloc`.
const MAX_CANVAS_BYTES: u128 = 512 * 1024 * 1024;
const RGB_BYTES: u128 = 3;

/// Source image rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropArea {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidCropArea(format!(
                "size {width}x{height} must be non-zero"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Crop spanning from the start corner (inclusive) to the end corner (exclusive).
    pub fn from_corners(x_start: i64, y_start: i64, x_end: i64, y_end: i64) -> Result<Self> {
        let span = |start: i64, end: i64| {
            end.checked_sub(start)
                .filter(|len| start >= 0 && *len > 0)
        };
        let (Some(width), Some(height)) = (span(x_start, x_end), span(y_start, y_end)) else {
            return Err(Error::InvalidCropArea(format!(
                "{x_start},{y_start}:{x_end},{y_end} must have a non-negative start before its end"
            )));
        };
        let px = |v: i64| {
            u32::try_from(v).map_err(|_| Error::InvalidCropArea(format!("{v} is out of range")))
        };
        Self::new(px(x_start)?, px(y_start)?, px(width)?, px(height)?)
    }

    /// The whole of an image.
    pub fn full(width: u32, height: u32) -> Result<Self> {
        Self::new(0, 0, width, height)
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    /// Error unless this crop lies inside a `width`x`height` image.
    pub fn check_within(&self, width: u32, height: u32) -> Result<()> {
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        if right > u64::from(width) || bottom > u64::from(height) {
            return Err(Error::InvalidCropArea(format!(
                "{self} lies outside the {width}x{height} source image"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CropArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            x,
            y,
            width,
            height,
        } = self;
        write!(f, "{width}x{height}+{x}+{y}")
    }
}

/// Parses `x,y,w,h` or corners `x1,y1:x2,y2`.
impl FromStr for CropArea {
    type Err = anyhow::Error;

    fn from_str(v: &str) -> std::result::Result<Self, Self::Err> {
        let ints = |s: &str| -> anyhow::Result<Vec<i64>> {
            s.split(',')
                .map(|n| Ok(n.trim().parse::<i64>()?))
                .collect()
        };

        let v = v.trim();
        if let Some((start, end)) = v.split_once(':') {
            let (start, end) = (ints(start)?, ints(end)?);
            anyhow::ensure!(
                start.len() == 2 && end.len() == 2,
                "expected crop corners X1,Y1:X2,Y2, got {v:?}"
            );
            return Ok(Self::from_corners(start[0], start[1], end[0], end[1])?);
        }

        match *ints(v)?.as_slice() {
            [x, y, w, h] => match (x.checked_add(w), y.checked_add(h)) {
                (Some(x_end), Some(y_end)) => Ok(Self::from_corners(x, y, x_end, y_end)?),
                _ => Err(Error::InvalidCropArea(format!("{v:?} is out of range")).into()),
            },
            _ => anyhow::bail!("expected crop X,Y,WIDTH,HEIGHT or X1,Y1:X2,Y2, got {v:?}"),
        }
    }
}

/// Pixel rectangle on the output sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: u32,
    pub col: u32,
    pub rect: Rect,
}

/// Computed sheet layout. Build a new one whenever an input changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub sheet: Dimension,
    pub tile: Dimension,
    /// Pixel size of each placed tile.
    pub tile_px: Dimension,
    pub rows: u32,
    pub cols: u32,
    pub border_w: u32,
    pub border_h: u32,
    /// Output sheet pixel width.
    pub width: u32,
    /// Output sheet pixel height.
    pub height: u32,
}

impl Layout {
    /// Lay out `tile_px` sized tiles as many times as `tile` fits into `sheet`.
    pub fn new(sheet: Dimension, tile: Dimension, tile_px: Dimension) -> Result<Self> {
        let sheet = sheet.validate("sheet")?;
        let tile = tile.validate("tile")?;
        if tile_px.width == 0 || tile_px.height == 0 {
            return Err(Error::InvalidCropArea(format!(
                "tile pixel size {tile_px} must be non-zero"
            )));
        }

        let rows = sheet.height / tile.height;
        let cols = sheet.width / tile.width;
        if rows == 0 || cols == 0 {
            return Err(Error::TileDoesNotFit {
                sheet: sheet.to_string(),
                tile: tile.to_string(),
            });
        }

        let border_w = border(sheet.width, tile.width, tile_px.width, cols);
        let border_h = border(sheet.height, tile.height, tile_px.height, rows);

        let width = grid_span(cols, tile_px.width, border_w);
        let mut height =
            u64::try_from(u128::from(width) * u128::from(sheet.height) / u128::from(sheet.width))
                .unwrap_or(u64::MAX);
        let grid_height = grid_span(rows, tile_px.height, border_h);
        if grid_height > height {
            log::warn!(
                "{rows} rows of {}px tiles need {grid_height}px, more than the {height}px \
                 sheet aspect allows, extending sheet height",
                tile_px.height
            );
            height = grid_height;
        }

        let too_large = || Error::CanvasTooLarge { width, height };
        if u128::from(width) * u128::from(height) * RGB_BYTES > MAX_CANVAS_BYTES {
            return Err(too_large());
        }
        Ok(Self {
            sheet,
            tile,
            tile_px,
            rows,
            cols,
            border_w: u32::try_from(border_w).map_err(|_| too_large())?,
            border_h: u32::try_from(border_h).map_err(|_| too_large())?,
            width: u32::try_from(width).map_err(|_| too_large())?,
            height: u32::try_from(height).map_err(|_| too_large())?,
        })
    }

    pub fn tile_count(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    /// Placement of the tile at `row`, `col` or `None` if outside the grid.
    pub fn placement(&self, row: u32, col: u32) -> Option<Placement> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let Dimension { width, height } = self.tile_px;
        Some(Placement {
            row,
            col,
            rect: Rect {
                x: self.border_w + col * (width + self.border_w),
                y: self.border_h + row * (height + self.border_h),
                width,
                height,
            },
        })
    }

    /// All tile placements, row by row.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).filter_map(move |col| self.placement(row, col)))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} grid of {} tiles on {} sheet, border {}x{}px -> {}x{}px",
            self.cols,
            self.rows,
            self.tile,
            self.sheet,
            self.border_w,
            self.border_h,
            self.width,
            self.height
        )
    }
}

/// Leftover physical space, scaled to tile pixels, split over `n + 1` gaps.
fn border(sheet_len: u32, tile_len: u32, tile_px: u32, n: u32) -> u64 {
    let leftover = u64::from(sheet_len % tile_len);
    leftover * u64::from(tile_px) / (u64::from(tile_len) * (u64::from(n) + 1))
}

fn grid_span(n: u32, tile_px: u32, border: u64) -> u64 {
    u64::from(n) * u64::from(tile_px) + border * (u64::from(n) + 1)
}
