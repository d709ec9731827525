#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// The number of layout nodes pre-provisioned in each pass slab.
    ///
    /// - **Higher values**: Fewer slab growth events on large documents,
    ///   at the cost of memory held by idle slabs in the pool.
    /// - **Lower values**: Smaller idle footprint; large passes grow the slab
    ///   by doubling.
    ///
    /// Defaults to `200`.
    pub pool_capacity: usize,

    /// Hard ceiling on live nodes in a single pass. Exceeding it aborts the
    /// pass with `LayoutError::PoolExhausted`.
    ///
    /// Defaults to `None` (unbounded).
    pub max_pool_nodes: Option<usize>,

    /// Width removed from a box's content area when its vertical scrollbar
    /// is shown.
    ///
    /// Defaults to `16.0`.
    pub scrollbar_width: f32,

    /// How many times one children pass may restart from the first sibling
    /// before further restart requests are ignored.
    ///
    /// Defaults to `8`.
    pub max_sibling_restarts: usize,

    /// Advance of every glyph as a fraction of the font size, used by the
    /// default `FixedAdvance` text measure.
    ///
    /// Defaults to `0.5`.
    pub glyph_advance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 200,
            max_pool_nodes: None,
            scrollbar_width: 16.0,
            max_sibling_restarts: 8,
            glyph_advance: 0.5,
        }
    }
}
