//! Shape and colour for each record.
//!
//! Pure lookup over the closed category x era (or device kind) space.

use std::f32::consts::{FRAC_PI_4, FRAC_PI_6};

use bevy::prelude::*;

use crate::catalog::{CatalogRecord, Category, DeviceKind, Era};
use crate::scene::graph::Shape;

pub const GLOW_COLOR: Color = Color::srgb(0.0, 0.831, 1.0);

/// Main body of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub shape: Shape,
    pub color: Color,
    /// Resting orientation of the body.
    pub rotation: Quat,
    /// Nominal footprint; detail parts are laid out against it.
    pub size: Vec3,
}

pub fn appearance(record: &CatalogRecord) -> Appearance {
    match record.category {
        Category::HistoricalNode => milestone(record.device, record.era),
        category => component(category, record.era),
    }
}

fn milestone(device: Option<DeviceKind>, era: Era) -> Appearance {
    let color = milestone_color(era);
    let boxed = |w: f32, h: f32, d: f32| Appearance {
        shape: Shape::Cuboid(Vec3::new(w, h, d)),
        color,
        rotation: Quat::IDENTITY,
        size: Vec3::new(w, h, d),
    };
    match device {
        Some(DeviceKind::Abacus) => Appearance {
            rotation: Quat::from_rotation_y(FRAC_PI_4),
            ..boxed(2.0, 0.3, 1.5)
        },
        Some(DeviceKind::Mechanical) => Appearance {
            shape: Shape::Frustum {
                radius_top: 1.0,
                radius_bottom: 1.2,
                height: 1.5,
            },
            color,
            rotation: Quat::from_rotation_x(FRAC_PI_6),
            size: Vec3::new(2.4, 1.5, 2.4),
        },
        Some(DeviceKind::Analytical) => boxed(1.8, 2.0, 1.2),
        Some(DeviceKind::Electronic) => boxed(3.0, 2.5, 2.0),
        Some(DeviceKind::Transistor) => boxed(2.5, 2.0, 1.8),
        Some(DeviceKind::Integrated) => boxed(2.0, 1.5, 1.5),
        Some(DeviceKind::Microprocessor) => boxed(1.5, 0.3, 1.5),
        Some(DeviceKind::Personal) => boxed(2.0, 1.8, 1.5),
        Some(DeviceKind::Internet) => Appearance {
            shape: Shape::Sphere(1.2),
            color,
            rotation: Quat::IDENTITY,
            size: Vec3::splat(2.4),
        },
        Some(DeviceKind::Modern) => boxed(1.8, 0.2, 1.2),
        None => boxed(1.5, 1.5, 1.5),
    }
}

fn milestone_color(era: Era) -> Color {
    match era {
        Era::Ancient => Color::srgb_u8(0x8B, 0x45, 0x13),
        Era::Mechanical => Color::srgb_u8(0x70, 0x80, 0x90),
        Era::Electronic => Color::srgb_u8(0xFF, 0xD7, 0x00),
        Era::Digital => Color::srgb_u8(0x00, 0xCE, 0xD1),
        Era::Modern => Color::srgb_u8(0x93, 0x70, 0xDB),
        Era::Early | Era::Transistor | Era::Integrated => Color::srgb_u8(0x88, 0x88, 0x88),
    }
}

/// Footprint shrinks as technology matures.
pub fn component_size(era: Era) -> Vec3 {
    match era {
        Era::Ancient | Era::Mechanical | Era::Early => Vec3::new(3.0, 2.5, 2.5),
        Era::Electronic => Vec3::new(2.5, 2.0, 2.0),
        Era::Transistor => Vec3::new(2.0, 1.5, 1.5),
        Era::Integrated => Vec3::new(1.5, 1.0, 1.0),
        Era::Digital => Vec3::new(1.2, 0.8, 0.8),
        Era::Modern => Vec3::new(1.0, 0.5, 0.8),
    }
}

fn component(category: Category, era: Era) -> Appearance {
    let size = component_size(era);
    let color = component_color(category, era);
    let shape = match (category, era) {
        (Category::Storage, Era::Modern) => Shape::Cuboid(Vec3::new(size.x, size.y * 0.3, size.z)),
        (Category::Storage, Era::Digital) => Shape::Frustum {
            radius_top: size.x * 0.8,
            radius_bottom: size.x * 0.8,
            height: size.y,
        },
        _ => Shape::Cuboid(size),
    };
    Appearance {
        shape,
        color,
        rotation: Quat::IDENTITY,
        size,
    }
}

fn component_color(category: Category, era: Era) -> Color {
    let hex = match (category, era) {
        (Category::Cpu, Era::Early) => 0x8B4513,
        (Category::Cpu, Era::Electronic) => 0xFFD700,
        (Category::Cpu, Era::Transistor) => 0x708090,
        (Category::Cpu, Era::Integrated) => 0x2E8B57,
        (Category::Cpu, Era::Digital) => 0x4169E1,
        (Category::Cpu, Era::Modern) => 0x9370DB,
        (Category::Memory, Era::Early) => 0x654321,
        (Category::Memory, Era::Electronic) => 0xFFA500,
        (Category::Memory, Era::Transistor) => 0x696969,
        (Category::Memory, Era::Integrated) => 0x20B2AA,
        (Category::Memory, Era::Digital) => 0x1E90FF,
        (Category::Memory, Era::Modern) => 0x8A2BE2,
        (Category::Storage, Era::Early) => 0x2F4F4F,
        (Category::Storage, Era::Electronic) => 0xCD853F,
        (Category::Storage, Era::Transistor) => 0x778899,
        (Category::Storage, Era::Integrated) => 0x48D1CC,
        (Category::Storage, Era::Digital) => 0x00CED1,
        (Category::Storage, Era::Modern) => 0x7B68EE,
        (_, Era::Ancient | Era::Mechanical) | (Category::HistoricalNode, _) => 0x888888,
    };
    hex_color(hex)
}

pub fn hex_color(hex: u32) -> Color {
    let [_, r, g, b] = hex.to_be_bytes();
    Color::srgb_u8(r, g, b)
}
