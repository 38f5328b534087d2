use serde::{Deserialize, Serialize};

/// Number of sky-map layers composited onto the sphere.
pub const LAYER_COUNT: usize = 5;

/// Identity of a sky-map layer. The discriminant is the texture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    Grid = 0,
    Galaxy = 1,
    Constellations = 2,
    Stars = 3,
    Overlay = 4,
}

impl LayerId {
    /// All layers in texture-unit order.
    pub const ALL: [LayerId; LAYER_COUNT] = [
        LayerId::Grid,
        LayerId::Galaxy,
        LayerId::Constellations,
        LayerId::Stars,
        LayerId::Overlay,
    ];

    /// Texture unit (binding slot) the layer is bound to for the whole session.
    pub const fn unit(self) -> u32 {
        self as u32
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_unit(unit: u32) -> Option<Self> {
        Self::ALL.get(unit as usize).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            LayerId::Grid => "grid",
            LayerId::Galaxy => "galaxy",
            LayerId::Constellations => "constellations",
            LayerId::Stars => "stars",
            LayerId::Overlay => "overlay",
        }
    }

    /// Weight of the layer in the additive composite.
    pub const fn weight(self) -> f32 {
        match self {
            LayerId::Constellations => 0.2,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-layer visibility flags for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerVisibility {
    pub grid: bool,
    pub galaxy: bool,
    pub constellations: bool,
    pub stars: bool,
    pub overlay: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            grid: true,
            galaxy: true,
            constellations: false,
            stars: true,
            overlay: false,
        }
    }
}

impl LayerVisibility {
    pub const NONE: Self = Self {
        grid: false,
        galaxy: false,
        constellations: false,
        stars: false,
        overlay: false,
    };

    pub const ALL: Self = Self {
        grid: true,
        galaxy: true,
        constellations: true,
        stars: true,
        overlay: true,
    };

    pub fn is_visible(&self, layer: LayerId) -> bool {
        match layer {
            LayerId::Grid => self.grid,
            LayerId::Galaxy => self.galaxy,
            LayerId::Constellations => self.constellations,
            LayerId::Stars => self.stars,
            LayerId::Overlay => self.overlay,
        }
    }

    pub fn set(&mut self, layer: LayerId, visible: bool) {
        let flag = match layer {
            LayerId::Grid => &mut self.grid,
            LayerId::Galaxy => &mut self.galaxy,
            LayerId::Constellations => &mut self.constellations,
            LayerId::Stars => &mut self.stars,
            LayerId::Overlay => &mut self.overlay,
        };
        *flag = visible;
    }

    /// Bit `unit` is set for every visible layer.
    pub fn mask(&self) -> u32 {
        LayerId::ALL
            .iter()
            .filter(|layer| self.is_visible(**layer))
            .fold(0, |mask, layer| mask | (1 << layer.unit()))
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        LayerId::ALL.into_iter().filter(|l| self.is_visible(*l))
    }
}
