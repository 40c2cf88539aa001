//! Colors and shared surface materials

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Linear RGB color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Create from linear components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create from a 0xRRGGBB sRGB hex value, converting to linear
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Convert back to a 0xRRGGBB sRGB hex value
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (linear_to_srgb(v).clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Scale every channel
    pub fn scaled(self, factor: f32) -> Self {
        Self::rgb(self.r * factor, self.g * factor, self.b * factor)
    }

    /// RGBA array with the given alpha
    pub fn to_array(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Surface description shared between meshes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Cache key
    pub name: String,
    /// Base color
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    /// Render both faces
    pub double_sided: bool,
}

impl Material {
    /// Oak veneer used for the tower blocks
    pub fn oak_veneer() -> Self {
        Self {
            name: "oak_veneer".to_string(),
            color: Color::from_hex(0xc49a6c),
            roughness: 0.8,
            metalness: 0.0,
            double_sided: false,
        }
    }

    /// Raw planks used for the floor
    pub fn raw_plank() -> Self {
        Self {
            name: "raw_plank".to_string(),
            color: Color::from_hex(0x8a6a4a),
            roughness: 0.9,
            metalness: 0.0,
            double_sided: true,
        }
    }
}

/// Memoizes materials by name so every mesh of a kind shares one instance
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Arc<Material>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached material named `name`, building it on first use
    pub fn get_or_insert_with(&mut self, name: &str, build: impl FnOnce() -> Material) -> Arc<Material> {
        if let Some(material) = self.materials.get(name) {
            return Arc::clone(material);
        }
        let material = Arc::new(build());
        log::debug!("Material '{}' created", name);
        self.materials.insert(name.to_string(), Arc::clone(&material));
        material
    }

    /// Shared block material
    pub fn blocks(&mut self) -> Arc<Material> {
        self.get_or_insert_with("oak_veneer", Material::oak_veneer)
    }

    /// Shared floor material
    pub fn floor(&mut self) -> Arc<Material> {
        self.get_or_insert_with("raw_plank", Material::raw_plank)
    }

    /// Number of distinct materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_primaries() {
        assert_eq!(Color::from_hex(0xff0000).to_hex(), 0xff0000);
        assert_eq!(Color::from_hex(0x808080).to_hex(), 0x808080);
    }

    #[test]
    fn test_from_hex_is_linear() {
        let gray = Color::from_hex(0x808080);
        // sRGB mid gray is darker in linear space
        assert!(gray.r > 0.2 && gray.r < 0.23);
        let red = Color::from_hex(0xff0000);
        assert!((red.r - 1.0).abs() < 1e-5);
        assert_eq!(red.g, 0.0);
        assert_eq!(red.b, 0.0);
    }

    #[test]
    fn test_library_memoizes() {
        let mut library = MaterialLibrary::new();
        let a = library.blocks();
        let b = library.blocks();
        assert!(Arc::ptr_eq(&a, &b));

        let floor = library.floor();
        assert!(floor.double_sided);
        assert_eq!(library.len(), 2);
    }
}
