use crate::{command::TileArgs, format::Dimension, layout::Layout, render::TileSize};
use anyhow::ensure;

/// Print the sheet layout & tile placements without reading any images.
#[derive(clap::Parser, Debug, Clone)]
#[group(skip)]
pub struct Plan {
    #[clap(flatten)]
    pub args: TileArgs,
}

impl Plan {
    pub fn run(&self) -> anyhow::Result<Layout> {
        let layout = self.layout()?;

        println!("{layout}");
        println!("row\tcol\tx\ty\tright\tbottom");
        for p in layout.placements() {
            let r = p.rect;
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                p.row,
                p.col,
                r.x,
                r.y,
                r.right(),
                r.bottom()
            );
        }
        Ok(layout)
    }

    fn layout(&self) -> anyhow::Result<Layout> {
        let opts = self.args.sheet_options();
        ensure!(
            opts.crop.is_some() || opts.tile_size != TileSize::Crop,
            "tile pixel size unknown, set one of --crop, --tile-pixels or --dpi"
        );
        let crop = opts.crop.map(|c| c.size()).unwrap_or(Dimension::new(0, 0));
        let mut px = opts.tile_size.pixels(crop, opts.tile)?;
        let mut tile = opts.tile;
        if opts.rotate_tile.is_some_and(|r| r.is_quarter_turn()) {
            px = px.transposed();
            tile = tile.transposed();
        }
        Ok(Layout::new(opts.sheet, tile, px)?)
    }
}
