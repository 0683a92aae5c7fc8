/// A paint value already evaluated for the current zoom, or a marker that it
/// varies per feature and lives in the bucket's paint buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue<T> {
    Constant(T),
    DataDriven,
}

impl<T: Copy> PropertyValue<T> {
    /// The constant, or `fallback` when data-driven.
    #[inline]
    pub fn constant_or(&self, fallback: T) -> T {
        match self {
            PropertyValue::Constant(v) => *v,
            PropertyValue::DataDriven => fallback,
        }
    }

    #[inline]
    pub fn constant(&self) -> Option<T> {
        match self {
            PropertyValue::Constant(v) => Some(*v),
            PropertyValue::DataDriven => None,
        }
    }
}

impl PropertyValue<f32> {
    /// True only for a constant exactly `0`.
    #[inline]
    pub fn is_constant_zero(&self) -> bool {
        matches!(self, PropertyValue::Constant(v) if *v == 0.0)
    }
}

impl<T> From<T> for PropertyValue<T> {
    fn from(v: T) -> Self {
        PropertyValue::Constant(v)
    }
}

/// Previous and current generation of a cross-faded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossFaded<T> {
    pub from: T,
    pub to: T,
}

impl<T: Clone> CrossFaded<T> {
    pub fn same(value: T) -> Self {
        Self {
            from: value.clone(),
            to: value,
        }
    }
}

/// Blend between two pattern generations while zooming across an integer level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeParameters {
    pub from_scale: f32,
    pub to_scale: f32,
    pub t: f32,
}

impl CrossfadeParameters {
    /// Parameters for `zoom` at time `now` (ms).
    pub fn new(zoom: f32, now: f64, history: &ZoomHistory, fade_duration: f64) -> Self {
        let fraction = zoom - zoom.floor();
        let t = if fade_duration <= 0.0 {
            1.0
        } else {
            ((now - history.last_integer_zoom_time) / fade_duration).min(1.0) as f32
        };

        if zoom > history.last_integer_zoom {
            Self {
                from_scale: 2.0,
                to_scale: 1.0,
                t: fraction + (1.0 - fraction) * t,
            }
        } else {
            Self {
                from_scale: 0.5,
                to_scale: 1.0,
                t: 1.0 - (1.0 - t) * fraction,
            }
        }
    }
}

/// Tracks integer-zoom crossings for pattern crossfades.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomHistory {
    pub last_zoom: f32,
    pub last_floor_zoom: f32,
    pub last_integer_zoom: f32,
    pub last_integer_zoom_time: f64,
    first: bool,
}

impl Default for ZoomHistory {
    fn default() -> Self {
        Self {
            last_zoom: 0.0,
            last_floor_zoom: 0.0,
            last_integer_zoom: 0.0,
            last_integer_zoom_time: 0.0,
            first: true,
        }
    }
}

impl ZoomHistory {
    /// Records zoom `z` at time `now`. Returns whether the zoom changed.
    pub fn update(&mut self, z: f32, now: f64) -> bool {
        let floor_z = z.floor();

        if self.first {
            self.first = false;
            self.last_integer_zoom = floor_z;
            self.last_integer_zoom_time = 0.0;
            self.last_zoom = z;
            self.last_floor_zoom = floor_z;
            return true;
        }

        if self.last_floor_zoom > floor_z {
            self.last_integer_zoom = floor_z + 1.0;
            self.last_integer_zoom_time = now;
        } else if self.last_floor_zoom < floor_z {
            self.last_integer_zoom = floor_z;
            self.last_integer_zoom_time = now;
        }

        if z != self.last_zoom {
            self.last_zoom = z;
            self.last_floor_zoom = floor_z;
            return true;
        }
        false
    }
}

/// Frame of reference for translations and light direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslateAnchor {
    #[default]
    Map,
    Viewport,
}

/// Whether a symbol or circle follows the map plane or the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    Map,
    #[default]
    Viewport,
}
