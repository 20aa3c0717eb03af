//! Layers and layer masks.

use std::fmt;

use bitflags::bitflags;

/// Number of independent index partitions.
pub const LAYER_COUNT: usize = 16;

/// One of the sixteen partitions, `0..16`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Layer(u8);

impl Layer {
    /// Create a layer from its index. Returns `None` outside `0..16`.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < LAYER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Get all layers in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..LAYER_COUNT as u8).map(Self)
    }

    /// Position of this layer in `0..16`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Mask selecting only this layer.
    #[must_use]
    pub const fn mask(self) -> LayerMask {
        LayerMask::from_bits_retain(1 << self.0)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

bitflags! {
    /// Set of layers; bit `i` selects layer `i`.
    ///
    /// Used both for the layers an object occupies and for the layers a
    /// broad-phase query targets.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct LayerMask: u16 {
        const L0 = 1 << 0;
        const L1 = 1 << 1;
        const L2 = 1 << 2;
        const L3 = 1 << 3;
        const L4 = 1 << 4;
        const L5 = 1 << 5;
        const L6 = 1 << 6;
        const L7 = 1 << 7;
        const L8 = 1 << 8;
        const L9 = 1 << 9;
        const L10 = 1 << 10;
        const L11 = 1 << 11;
        const L12 = 1 << 12;
        const L13 = 1 << 13;
        const L14 = 1 << 14;
        const L15 = 1 << 15;
    }
}

impl LayerMask {
    /// Check if `layer` is selected.
    #[must_use]
    pub const fn contains_layer(self, layer: Layer) -> bool {
        self.bits() & (1 << layer.0) != 0
    }

    /// Iterate the selected layers in index order.
    pub fn layers(self) -> impl Iterator<Item = Layer> {
        Layer::all().filter(move |layer| self.contains_layer(*layer))
    }

    /// Number of selected layers.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.bits().count_ones()
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        layer.mask()
    }
}

impl FromIterator<Layer> for LayerMask {
    fn from_iter<T: IntoIterator<Item = Layer>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |mask, layer| mask | layer.mask())
    }
}

impl fmt::Display for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018b}", self.bits())
    }
}
