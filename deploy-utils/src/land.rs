//! Land & quad ids on the 408x408 land grid

use alloy::primitives::U256;

use crate::errors::UtilsError;

/// The width & height of the land grid
pub const GRID_SIZE: u64 = 408;

/// The bit offset of the layer byte in a quad id
const LAYER_OFFSET: usize = 248;

/// The supported quad sizes, indexed by layer
pub const QUAD_SIZES: [u64; 5] = [1, 3, 6, 12, 24];

/// The id of the single land at the given coordinates
pub fn land_id(x: u64, y: u64) -> Result<U256, UtilsError> {
    quad_id(1, x, y)
}

/// The id of the quad of the given size whose top-left land is at `(x, y)`
pub fn quad_id(size: u64, x: u64, y: u64) -> Result<U256, UtilsError> {
    let layer = layer(size)?;
    if x % size != 0 || y % size != 0 {
        return Err(UtilsError::InvalidQuad(format!("{size}x{size} at ({x}, {y}) is misaligned")));
    }
    // `size` is one of `QUAD_SIZES`, all smaller than the grid
    if x > GRID_SIZE - size || y > GRID_SIZE - size {
        return Err(UtilsError::InvalidQuad(format!(
            "{size}x{size} at ({x}, {y}) extends past the grid"
        )));
    }

    Ok((U256::from(layer) << LAYER_OFFSET) | U256::from(x + y * GRID_SIZE))
}

/// The size & top-left coordinates of the quad with the given id
pub fn quad_coordinates(id: U256) -> Result<(u64, u64, u64), UtilsError> {
    let layer = (id >> LAYER_OFFSET).to::<u64>();
    let size = *QUAD_SIZES
        .get(layer as usize)
        .ok_or_else(|| UtilsError::InvalidQuad(format!("unknown layer {layer}")))?;

    let position = id & ((U256::from(1) << LAYER_OFFSET) - U256::from(1));
    if position >= U256::from(GRID_SIZE * GRID_SIZE) {
        return Err(UtilsError::InvalidQuad(format!("position {position} is off the grid")));
    }

    let position = position.to::<u64>();
    Ok((size, position % GRID_SIZE, position / GRID_SIZE))
}

/// The ids of every land covered by the given quad, row by row
pub fn quad_lands(size: u64, x: u64, y: u64) -> Result<Vec<U256>, UtilsError> {
    quad_id(size, x, y)?;

    let mut lands = Vec::with_capacity((size * size) as usize);
    for row in y..y + size {
        for col in x..x + size {
            lands.push(land_id(col, row)?);
        }
    }

    Ok(lands)
}

/// The layer of the given quad size
fn layer(size: u64) -> Result<u64, UtilsError> {
    QUAD_SIZES
        .iter()
        .position(|&s| s == size)
        .map(|l| l as u64)
        .ok_or_else(|| UtilsError::InvalidQuad(format!("unsupported size {size}")))
}
