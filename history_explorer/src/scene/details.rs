//! Detail parts mounted on component entities.

use bevy::prelude::*;

use crate::catalog::{Category, Era};
use crate::scene::appearance::hex_color;
use crate::scene::graph::{Shape, Visual};

const SILVER: u32 = 0xC0C0C0;
const CHIP_BLACK: u32 = 0x2F2F2F;
const GOLD: u32 = 0xFFD700;

/// Where a part rests relative to the entity body and what it looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct PartSpec {
    pub mount: Vec3,
    pub visual: Visual,
}

pub fn detail_parts(category: Category, era: Era, size: Vec3) -> Vec<PartSpec> {
    match category {
        Category::HistoricalNode => Vec::new(),
        Category::Cpu => cpu_parts(era, size),
        Category::Memory => memory_parts(era, size),
        Category::Storage => storage_parts(era, size),
    }
}

fn cpu_parts(era: Era, size: Vec3) -> Vec<PartSpec> {
    let mut parts = match era {
        Era::Modern => Vec::new(),
        Era::Early | Era::Ancient | Era::Mechanical => pins(8, size),
        _ => pins(64, size),
    };
    if matches!(era, Era::Digital | Era::Modern) {
        parts.push(PartSpec {
            mount: Vec3::new(0.0, size.y / 2.0 + 0.25, 0.0),
            visual: Visual::new(
                Shape::Cuboid(Vec3::new(size.x * 1.2, 0.5, size.z * 1.2)),
                hex_color(SILVER),
            ),
        });
    }
    parts
}

/// Square pin grid under the package, `ceil(sqrt(count))` per side.
fn pins(count: usize, size: Vec3) -> Vec<PartSpec> {
    let per_side = (count as f32).sqrt().ceil() as usize;
    let spacing = size.x / (per_side as f32 + 1.0);
    let pin = Visual::new(
        Shape::Frustum {
            radius_top: 0.02,
            radius_bottom: 0.02,
            height: 0.3,
        },
        hex_color(SILVER),
    );
    (0..per_side)
        .flat_map(|i| (0..per_side).map(move |j| (i, j)))
        .map(|(i, j)| PartSpec {
            mount: Vec3::new(
                -size.x / 2.0 + (i as f32 + 1.0) * spacing,
                -size.y / 2.0 - 0.15,
                -size.z / 2.0 + (j as f32 + 1.0) * spacing,
            ),
            visual: pin.clone(),
        })
        .collect()
}

fn memory_parts(era: Era, size: Vec3) -> Vec<PartSpec> {
    let chips = if era == Era::Modern { 8 } else { 4 };
    let spacing = size.x / (chips as f32 + 1.0);
    let mut parts: Vec<PartSpec> = (0..chips)
        .map(|i| PartSpec {
            mount: Vec3::new(
                -size.x / 2.0 + (i as f32 + 1.0) * spacing,
                size.y / 2.0 + 0.05,
                0.0,
            ),
            visual: Visual::new(
                Shape::Cuboid(Vec3::new(0.3, 0.1, 0.2)),
                hex_color(CHIP_BLACK),
            ),
        })
        .collect();
    parts.push(PartSpec {
        mount: Vec3::new(0.0, -size.y / 2.0 - 0.1, size.z / 2.0 + 0.05),
        visual: Visual::new(Shape::Cuboid(Vec3::new(size.x, 0.2, 0.1)), hex_color(GOLD)),
    });
    parts
}

fn storage_parts(era: Era, size: Vec3) -> Vec<PartSpec> {
    match era {
        Era::Digital => vec![PartSpec {
            mount: Vec3::ZERO,
            visual: Visual::new(
                Shape::Frustum {
                    radius_top: size.x * 0.7,
                    radius_bottom: size.x * 0.7,
                    height: 0.05,
                },
                hex_color(CHIP_BLACK),
            ),
        }],
        Era::Modern => vec![PartSpec {
            mount: Vec3::new(0.0, size.y / 2.0 + 0.025, 0.0),
            visual: Visual::new(
                Shape::Cuboid(Vec3::new(0.4, 0.05, 0.3)),
                hex_color(CHIP_BLACK),
            ),
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::appearance::component_size;

    #[test]
    fn cpu_part_counts_by_era() {
        let count = |era| detail_parts(Category::Cpu, era, component_size(era)).len();
        assert_eq!(count(Era::Early), 9);
        assert_eq!(count(Era::Transistor), 64);
        assert_eq!(count(Era::Digital), 65);
        assert_eq!(count(Era::Modern), 1);
    }

    #[test]
    fn memory_has_chips_and_connector() {
        let early = detail_parts(Category::Memory, Era::Early, component_size(Era::Early));
        assert_eq!(early.len(), 5);
        let modern = detail_parts(Category::Memory, Era::Modern, component_size(Era::Modern));
        assert_eq!(modern.len(), 9);
        assert_eq!(modern.last().unwrap().visual.color, hex_color(GOLD));
    }

    #[test]
    fn only_disk_and_flash_storage_have_parts() {
        let parts = |era| detail_parts(Category::Storage, era, component_size(era)).len();
        assert_eq!(parts(Era::Early), 0);
        assert_eq!(parts(Era::Electronic), 0);
        assert_eq!(parts(Era::Digital), 1);
        assert_eq!(parts(Era::Modern), 1);
    }

    #[test]
    fn first_pin_sits_under_the_front_left_corner() {
        let size = component_size(Era::Early);
        let parts = detail_parts(Category::Cpu, Era::Early, size);
        assert!(parts[0]
            .mount
            .abs_diff_eq(Vec3::new(-0.75, -1.4, -0.5), 1e-5));
    }
}
