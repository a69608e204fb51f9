//! Read-only view of an editor map.
//!
//! Hosts implement [`TileMap`] and [`MapLayer`] over their own map model; the
//! exporter only ever reads through these traits. [`MemoryMap`] is an owned
//! implementation for maps assembled in code.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub tile_id: u32,
}

impl Cell {
    pub fn new(tile_id: u32) -> Self {
        Self { tile_id }
    }
}

pub trait MapLayer {
    /// True for grid layers whose cells reference tiles. Object and image
    /// layers return false and are ignored by the exporter.
    fn is_tile_layer(&self) -> bool;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Cell at column `x`, row `y`. Only called with `x < width()` and `y < height()`.
    ///
    /// Tiled reports empty cells as `-1`, which its own script exporter stored as
    /// byte 255; map them to an explicit id here (usually 0 or 255).
    fn cell_at(&self, x: u32, y: u32) -> Cell;
}

pub trait TileMap {
    type Layer: MapLayer;

    fn layer_count(&self) -> usize;
    /// Only called with `index < layer_count()`.
    fn layer_at(&self, index: usize) -> &Self::Layer;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Tile,
    Object,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLayer {
    kind: LayerKind,
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl MemoryLayer {
    /// A tile layer with every cell set to tile 0.
    pub fn tiles(width: u32, height: u32) -> Self {
        Self {
            kind: LayerKind::Tile,
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// A tile layer whose cells come from `tile_id(x, y)`.
    pub fn from_fn(width: u32, height: u32, mut tile_id: impl FnMut(u32, u32) -> u32) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(tile_id(x, y)));
            }
        }
        Self {
            kind: LayerKind::Tile,
            width,
            height,
            cells,
        }
    }

    pub fn objects() -> Self {
        Self::non_tile(LayerKind::Object)
    }

    pub fn image() -> Self {
        Self::non_tile(LayerKind::Image)
    }

    fn non_tile(kind: LayerKind) -> Self {
        Self {
            kind,
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Sets one cell. Returns false when `(x, y)` lies outside the layer.
    pub fn set_tile(&mut self, x: u32, y: u32, tile_id: u32) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.cells[index] = Cell::new(tile_id);
                true
            }
            None => false,
        }
    }

    fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl MapLayer for MemoryLayer {
    fn is_tile_layer(&self) -> bool {
        self.kind == LayerKind::Tile
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn cell_at(&self, x: u32, y: u32) -> Cell {
        self.index_of(x, y)
            .map(|index| self.cells[index])
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryMap {
    layers: Vec<MemoryLayer>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: MemoryLayer) -> Self {
        self.layers.push(layer);
        self
    }
}

impl TileMap for MemoryMap {
    type Layer = MemoryLayer;

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn layer_at(&self, index: usize) -> &MemoryLayer {
        &self.layers[index]
    }
}
