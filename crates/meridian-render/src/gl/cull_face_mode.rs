use super::types::{Face, Winding};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CullFaceMode {
    pub enabled: bool,
    pub face: Face,
    pub winding: Winding,
}

impl CullFaceMode {
    pub const DISABLED: CullFaceMode = CullFaceMode {
        enabled: false,
        face: Face::Back,
        winding: Winding::CounterClockwise,
    };

    /// Culls back faces of counter-clockwise geometry. Used for extrusions.
    pub const BACK_CCW: CullFaceMode = CullFaceMode {
        enabled: true,
        face: Face::Back,
        winding: Winding::CounterClockwise,
    };
}
