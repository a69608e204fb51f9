use crate::consts::{
    DIMENSION_MISMATCH_MESSAGE, MAP_HEIGHT, MAP_WIDTH, MAX_TILE_ID, MULTIPLE_LAYERS_MESSAGE,
    TILE_ID_RANGE_MESSAGE,
};
use crate::{ExportError, ExportErrorCode, FlatByteBuffer, MapLayer, Result, TileMap};

/// Flattens the map's only tile layer into the 960-byte KPC8 layout.
///
/// Non-tile layers are skipped. A map without any tile layer yields an
/// all-zero buffer. Fails on a second tile layer, on any size other than
/// 40x24, and on tile ids above 255; no partial buffer is ever returned.
pub fn flatten<M: TileMap + ?Sized>(map: &M) -> Result<FlatByteBuffer> {
    let mut buffer = FlatByteBuffer::zeroed();
    let mut tile_layer_seen = false;

    for index in 0..map.layer_count() {
        let layer = map.layer_at(index);
        if !layer.is_tile_layer() {
            log::debug!("skipping non-tile layer {index}");
            continue;
        }

        if tile_layer_seen {
            log::debug!("second tile layer found at index {index}");
            return Err(ExportError::new(
                ExportErrorCode::MultipleLayers,
                MULTIPLE_LAYERS_MESSAGE,
            ));
        }
        tile_layer_seen = true;

        copy_layer(layer, &mut buffer)?;
    }

    if !tile_layer_seen {
        log::warn!("map has no tile layer; exporting an empty tilemap");
    }

    Ok(buffer)
}

fn copy_layer<L: MapLayer + ?Sized>(layer: &L, buffer: &mut FlatByteBuffer) -> Result<()> {
    let (width, height) = (layer.width(), layer.height());
    if height != MAP_HEIGHT || width != MAP_WIDTH {
        log::debug!("tile layer is {width}x{height}, expected {MAP_WIDTH}x{MAP_HEIGHT}");
        return Err(ExportError::new(
            ExportErrorCode::DimensionMismatch,
            DIMENSION_MISMATCH_MESSAGE,
        ));
    }

    for y in 0..height {
        for x in 0..width {
            let tile_id = layer.cell_at(x, y).tile_id;
            if tile_id > MAX_TILE_ID {
                log::debug!("tile id {tile_id} at ({x}, {y}) exceeds {MAX_TILE_ID}");
                return Err(ExportError::new(
                    ExportErrorCode::TileIdRange,
                    TILE_ID_RANGE_MESSAGE,
                ));
            }
            buffer.set((y * width + x) as usize, tile_id as u8);
        }
    }

    Ok(())
}
