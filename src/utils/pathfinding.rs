//! # Pathfinding
//!
//! Step selection for AI movement. A* runs inside a box around the walker and
//! its goal so a long-range search never walks the whole floor.

use crate::game::{Map, Position};
use ::pathfinding::prelude::astar;

/// First step of a shortest cardinal path from `from` to `goal`.
///
/// Only tiles inside the bounding box of both points grown by `margin` are
/// searched. Occupied tiles are avoided except the goal itself. Returns
/// `None` when no path exists or the walker is already adjacent.
pub fn next_step(map: &Map, from: Position, goal: Position, margin: i32) -> Option<Position> {
    let min_x = from.x.min(goal.x) - margin;
    let max_x = from.x.max(goal.x) + margin;
    let min_y = from.y.min(goal.y) - margin;
    let max_y = from.y.max(goal.y) + margin;
    let in_window = |pos: &Position| pos.x >= min_x && pos.x <= max_x && pos.y >= min_y && pos.y <= max_y;

    let (path, _cost) = astar(
        &from,
        |pos| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|next| in_window(next) && (*next == goal || map.is_free(*next)))
                .map(|next| (next, 1u32))
                .collect::<Vec<_>>()
        },
        |pos| pos.manhattan_distance(goal),
        |pos| *pos == goal,
    )?;

    path.get(1).copied().filter(|step| *step != goal)
}

/// Free neighbouring tile that closes the larger axis gap to `goal` first,
/// used when A* finds nothing.
pub fn greedy_step(map: &Map, from: Position, goal: Position) -> Option<Position> {
    let dx = (goal.x - from.x).signum();
    let dy = (goal.y - from.y).signum();
    let horizontal = Position::new(from.x + dx, from.y);
    let vertical = Position::new(from.x, from.y + dy);

    let candidates = if (goal.x - from.x).abs() >= (goal.y - from.y).abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    candidates
        .into_iter()
        .find(|pos| *pos != from && map.is_free(*pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Rect, DEFAULT_FLOOR_KEY, DEFAULT_WALL_KEY};

    fn open_map() -> Map {
        let mut map = Map::new(20, 20, DEFAULT_FLOOR_KEY, DEFAULT_WALL_KEY);
        map.carve_room(&Rect::from_corners(0, 0, 19, 19, "").unwrap());
        map
    }

    #[test]
    fn test_next_step_straight_line() {
        let map = open_map();
        let step = next_step(&map, Position::new(2, 5), Position::new(8, 5), 4);
        assert_eq!(step, Some(Position::new(3, 5)));
    }

    #[test]
    fn test_next_step_when_adjacent() {
        let map = open_map();
        assert_eq!(next_step(&map, Position::new(2, 5), Position::new(3, 5), 4), None);
    }

    #[test]
    fn test_next_step_around_wall() {
        let mut map = open_map();
        // Wall from (5, 1) to (5, 17) with a gap at the bottom
        for y in 1..=17 {
            map.get_tile_mut(Position::new(5, y)).unwrap().blocked = true;
        }
        let from = Position::new(3, 3);
        let goal = Position::new(8, 3);

        assert_eq!(next_step(&map, from, goal, 1), None);
        let step = next_step(&map, from, goal, 16).unwrap();
        assert_eq!(step.manhattan_distance(from), 1);
        assert!(map.is_free(step));
    }

    #[test]
    fn test_greedy_step_prefers_larger_gap() {
        let map = open_map();
        let from = Position::new(5, 5);
        assert_eq!(greedy_step(&map, from, Position::new(10, 7)), Some(Position::new(6, 5)));
        assert_eq!(greedy_step(&map, from, Position::new(6, 12)), Some(Position::new(5, 6)));
    }

    #[test]
    fn test_greedy_step_blocked() {
        let mut map = open_map();
        map.get_tile_mut(Position::new(6, 5)).unwrap().blocked = true;
        map.get_tile_mut(Position::new(5, 6)).unwrap().blocked = true;
        assert_eq!(greedy_step(&map, Position::new(5, 5), Position::new(9, 9)), None);
    }
}
