//! Plain-text grid rendering for terminals.

use std::collections::HashSet;
use std::fmt::Write;

use algoviz_model::{Coord, Grid};

/// Draw `grid` one row per line.
///
/// `S`/`E` mark the endpoints, `#` obstacles, `*` path cells and `.`
/// visited cells. Everything else is a space.
pub fn render_grid(grid: &Grid, visited: &[Coord], path: &[Coord]) -> String {
    let visited: HashSet<Coord> = visited.iter().copied().collect();
    let path: HashSet<Coord> = path.iter().copied().collect();
    let mut out = String::with_capacity((grid.width() + 3) * (grid.height() + 2));

    let border = "-".repeat(grid.width());
    let _ = writeln!(out, "+{border}+");
    for y in 0..grid.height() as i64 {
        out.push('|');
        for x in 0..grid.width() as i64 {
            let coord = Coord::new(x, y);
            let glyph = if grid.start() == Some(coord) {
                'S'
            } else if grid.end() == Some(coord) {
                'E'
            } else if grid.is_obstacle(coord) {
                '#'
            } else if path.contains(&coord) {
                '*'
            } else if visited.contains(&coord) {
                '.'
            } else {
                ' '
            };
            out.push(glyph);
        }
        out.push_str("|\n");
    }
    let _ = writeln!(out, "+{border}+");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_endpoints_obstacles_and_path() {
        let mut grid = Grid::with_default_endpoints(5, 5).unwrap();
        grid.set_obstacle(Coord::new(2, 2), true).unwrap();
        let path = [Coord::new(0, 4), Coord::new(1, 4)];
        let text = render_grid(&grid, &[Coord::new(0, 3)], &path);
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0], "+-----+");
        assert_eq!(rows[1], "|    E|");
        assert_eq!(rows[3], "|  #  |");
        assert_eq!(rows[4], "|.    |");
        assert_eq!(rows[5], "|S*   |");
    }
}
