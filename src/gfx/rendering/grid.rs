use crate::gfx::scene::LineVertex;

/// Half width of the floor grid in world units
pub const GRID_HALF_EXTENT: i32 = 10;

pub const GRID_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// Line list for a square floor grid on the Z = 0 plane
///
/// One line every unit from `-half_extent` to `half_extent` in both X and Y.
pub fn floor_grid(half_extent: i32, color: [f32; 3]) -> Vec<LineVertex> {
    let edge = half_extent as f32;
    let mut vertices = Vec::with_capacity(((2 * half_extent + 1) * 4) as usize);

    for i in -half_extent..=half_extent {
        let offset = i as f32;
        vertices.push(LineVertex {
            position: [offset, -edge, 0.0],
            color,
        });
        vertices.push(LineVertex {
            position: [offset, edge, 0.0],
            color,
        });
        vertices.push(LineVertex {
            position: [-edge, offset, 0.0],
            color,
        });
        vertices.push(LineVertex {
            position: [edge, offset, 0.0],
            color,
        });
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_floor() {
        let grid = floor_grid(GRID_HALF_EXTENT, GRID_COLOR);
        assert_eq!(grid.len(), 21 * 4);
        assert!(grid.iter().all(|v| v.position[2] == 0.0));
        assert!(grid
            .iter()
            .all(|v| v.position[0].abs() <= 10.0 && v.position[1].abs() <= 10.0));
        assert_eq!(grid[0].position, [-10.0, -10.0, 0.0]);
        assert_eq!(grid[1].position, [-10.0, 10.0, 0.0]);
    }

    #[test]
    fn empty_extent_gives_a_cross() {
        let grid = floor_grid(0, GRID_COLOR);
        assert_eq!(grid.len(), 4);
    }
}
