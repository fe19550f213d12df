use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid {kind} format {width}x{height}: width and height must be positive")]
    InvalidFormat {
        kind: &'static str,
        width: i64,
        height: i64,
    },
    #[error("tile {tile} does not fit sheet {sheet}")]
    TileDoesNotFit { sheet: String, tile: String },
    #[error("output sheet {width}x{height}px is too large")]
    CanvasTooLarge { width: u64, height: u64 },
    #[error("invalid crop area: {0}")]
    InvalidCropArea(String),
    #[error("invalid rotation {0}°: must be a multiple of 90")]
    InvalidRotation(i32),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
