//! Typed uniform slots that only reach the backend when their value changes.

use std::borrow::Cow;

use crate::color::Color;

use super::backend::Backend;
use super::types::UniformLocation;

/// Column-major 4×4 matrix.
pub type Mat4 = [f32; 16];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Color,
    Mat4,
}

/// A uniform value as forwarded to [`Backend::set_uniform`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformData {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Color(Color),
    Mat4(Mat4),
}

impl UniformData {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformData::Int(_) => UniformKind::Int,
            UniformData::Float(_) => UniformKind::Float,
            UniformData::Vec2(_) => UniformKind::Vec2,
            UniformData::Vec3(_) => UniformKind::Vec3,
            UniformData::Vec4(_) => UniformKind::Vec4,
            UniformData::Color(_) => UniformKind::Color,
            UniformData::Mat4(_) => UniformKind::Mat4,
        }
    }
}

/// Value types a [`UniformSlot`] can hold.
pub trait UniformValue: Copy {
    const KIND: UniformKind;

    /// Equality used to skip redundant writes.
    fn same_as(&self, other: &Self) -> bool;

    fn into_data(self) -> UniformData;

    fn from_data(data: UniformData) -> Option<Self>;
}

macro_rules! plain_uniform {
    ($ty:ty, $variant:ident) => {
        impl UniformValue for $ty {
            const KIND: UniformKind = UniformKind::$variant;

            #[inline]
            fn same_as(&self, other: &Self) -> bool {
                self == other
            }

            #[inline]
            fn into_data(self) -> UniformData {
                UniformData::$variant(self)
            }

            #[inline]
            fn from_data(data: UniformData) -> Option<Self> {
                match data {
                    UniformData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for UniformData {
            #[inline]
            fn from(v: $ty) -> Self {
                UniformData::$variant(v)
            }
        }
    };
}

plain_uniform!(i32, Int);
plain_uniform!(f32, Float);
plain_uniform!([f32; 2], Vec2);
plain_uniform!([f32; 3], Vec3);
plain_uniform!([f32; 4], Vec4);
plain_uniform!(Color, Color);

impl UniformValue for Mat4 {
    const KIND: UniformKind = UniformKind::Mat4;

    /// Translation (12) and x-scale (0) change most often between tiles, so
    /// they are compared before the full scan.
    #[inline]
    fn same_as(&self, other: &Self) -> bool {
        if self[12] != other[12] || self[0] != other[0] {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }

    #[inline]
    fn into_data(self) -> UniformData {
        UniformData::Mat4(self)
    }

    #[inline]
    fn from_data(data: UniformData) -> Option<Self> {
        match data {
            UniformData::Mat4(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Mat4> for UniformData {
    #[inline]
    fn from(v: Mat4) -> Self {
        UniformData::Mat4(v)
    }
}

/// Last value written to one program location.
#[derive(Debug, Clone)]
pub struct UniformSlot<T> {
    location: Option<UniformLocation>,
    current: Option<T>,
}

impl<T: UniformValue> UniformSlot<T> {
    /// `None` means the linker dropped the uniform; writes are absorbed.
    pub fn new(location: Option<UniformLocation>) -> Self {
        Self {
            location,
            current: None,
        }
    }

    #[inline]
    pub fn location(&self) -> Option<UniformLocation> {
        self.location
    }

    #[inline]
    pub fn current(&self) -> Option<T> {
        self.current
    }

    /// Writes `value` if it differs from the cached one. Returns whether a
    /// backend write happened.
    pub fn set<B: Backend + ?Sized>(&mut self, backend: &mut B, value: T) -> bool {
        if self.current.is_some_and(|current| current.same_as(&value)) {
            return false;
        }
        self.current = Some(value);

        let Some(location) = self.location else { return false };
        backend.set_uniform(location, value.into_data());
        true
    }

    /// Forgets the cached value so the next `set` always writes.
    #[inline]
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}

/// A slot of any supported kind, as stored in a program's uniform table.
#[derive(Debug, Clone)]
pub enum Uniform {
    Int(UniformSlot<i32>),
    Float(UniformSlot<f32>),
    Vec2(UniformSlot<[f32; 2]>),
    Vec3(UniformSlot<[f32; 3]>),
    Vec4(UniformSlot<[f32; 4]>),
    Color(UniformSlot<Color>),
    Mat4(UniformSlot<Mat4>),
}

impl Uniform {
    pub fn new(kind: UniformKind, location: Option<UniformLocation>) -> Self {
        match kind {
            UniformKind::Int => Uniform::Int(UniformSlot::new(location)),
            UniformKind::Float => Uniform::Float(UniformSlot::new(location)),
            UniformKind::Vec2 => Uniform::Vec2(UniformSlot::new(location)),
            UniformKind::Vec3 => Uniform::Vec3(UniformSlot::new(location)),
            UniformKind::Vec4 => Uniform::Vec4(UniformSlot::new(location)),
            UniformKind::Color => Uniform::Color(UniformSlot::new(location)),
            UniformKind::Mat4 => Uniform::Mat4(UniformSlot::new(location)),
        }
    }

    pub fn kind(&self) -> UniformKind {
        match self {
            Uniform::Int(_) => UniformKind::Int,
            Uniform::Float(_) => UniformKind::Float,
            Uniform::Vec2(_) => UniformKind::Vec2,
            Uniform::Vec3(_) => UniformKind::Vec3,
            Uniform::Vec4(_) => UniformKind::Vec4,
            Uniform::Color(_) => UniformKind::Color,
            Uniform::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Forwards `data` to the typed slot. `Err` carries the slot's kind when
    /// `data` is of a different kind.
    pub fn set<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        data: UniformData,
    ) -> Result<bool, UniformKind> {
        fn typed<T: UniformValue, B: Backend + ?Sized>(
            slot: &mut UniformSlot<T>,
            backend: &mut B,
            data: UniformData,
        ) -> Result<bool, UniformKind> {
            let value = T::from_data(data).ok_or(T::KIND)?;
            Ok(slot.set(backend, value))
        }

        match self {
            Uniform::Int(s) => typed(s, backend, data),
            Uniform::Float(s) => typed(s, backend, data),
            Uniform::Vec2(s) => typed(s, backend, data),
            Uniform::Vec3(s) => typed(s, backend, data),
            Uniform::Vec4(s) => typed(s, backend, data),
            Uniform::Color(s) => typed(s, backend, data),
            Uniform::Mat4(s) => typed(s, backend, data),
        }
    }

    pub fn invalidate(&mut self) {
        match self {
            Uniform::Int(s) => s.invalidate(),
            Uniform::Float(s) => s.invalidate(),
            Uniform::Vec2(s) => s.invalidate(),
            Uniform::Vec3(s) => s.invalidate(),
            Uniform::Vec4(s) => s.invalidate(),
            Uniform::Color(s) => s.invalidate(),
            Uniform::Mat4(s) => s.invalidate(),
        }
    }
}

/// Named uniform values for one draw call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformValues {
    values: Vec<(Cow<'static, str>, UniformData)>,
}

impl UniformValues {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<UniformData>,
    ) -> Self {
        self.set(name, value);
        self
    }

    /// Inserts or replaces `name`.
    pub fn set(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<UniformData>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&UniformData> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn extend(&mut self, other: &UniformValues) {
        for (name, value) in &other.values {
            self.set(name.clone(), *value);
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformData)> {
        self.values.iter().map(|(n, v)| (n.as_ref(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::RecordingBackend;
    use crate::math::mat4_identity;

    fn slot<T: UniformValue>() -> UniformSlot<T> {
        UniformSlot::new(Some(UniformLocation(3)))
    }

    #[test]
    fn repeated_value_writes_once() {
        let mut backend = RecordingBackend::new();
        let mut s = slot::<[f32; 4]>();

        assert!(s.set(&mut backend, [1.0, 2.0, 3.0, 4.0]));
        assert!(!s.set(&mut backend, [1.0, 2.0, 3.0, 4.0]));
        assert_eq!(backend.uniform_write_count(), 1);
    }

    #[test]
    fn changed_component_writes_again() {
        let mut backend = RecordingBackend::new();
        let mut s = slot::<[f32; 4]>();

        s.set(&mut backend, [1.0, 2.0, 3.0, 4.0]);
        s.set(&mut backend, [1.0, 2.0, 3.0, 9.0]);
        assert_eq!(backend.uniform_write_count(), 2);
    }

    #[test]
    fn matrix_difference_outside_fast_path_is_detected() {
        let a = mat4_identity();
        let mut b = a;
        b[5] = 2.0;

        assert!(!a.same_as(&b));
        assert!(a.same_as(&mat4_identity()));

        let mut backend = RecordingBackend::new();
        let mut s = slot::<Mat4>();
        s.set(&mut backend, a);
        s.set(&mut backend, b);
        assert_eq!(backend.uniform_write_count(), 2);
    }

    #[test]
    fn missing_location_absorbs_writes() {
        let mut backend = RecordingBackend::new();
        let mut s = UniformSlot::<f32>::new(None);

        assert!(!s.set(&mut backend, 1.0));
        assert_eq!(s.current(), Some(1.0));
        assert_eq!(backend.uniform_write_count(), 0);
    }

    #[test]
    fn dynamic_slot_rejects_wrong_kind() {
        let mut backend = RecordingBackend::new();
        let mut u = Uniform::new(UniformKind::Float, Some(UniformLocation(0)));

        assert_eq!(u.set(&mut backend, UniformData::Vec2([0.0, 1.0])), Err(UniformKind::Float));
        assert_eq!(u.set(&mut backend, UniformData::Float(0.5)), Ok(true));
        assert_eq!(u.set(&mut backend, UniformData::Float(0.5)), Ok(false));
    }

    #[test]
    fn invalidate_forces_next_write() {
        let mut backend = RecordingBackend::new();
        let mut s = slot::<i32>();
        s.set(&mut backend, 7);
        s.invalidate();
        assert!(s.set(&mut backend, 7));
    }

    #[test]
    fn values_replace_by_name() {
        let values = UniformValues::new()
            .with("u_opacity", 0.5f32)
            .with("u_opacity", 1.0f32);
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("u_opacity"), Some(&UniformData::Float(1.0)));
    }
}
