use glam::Vec2;
use gridcast_core::{CellCoord, Command, Direction, NpcId, Path};
use gridcast_system_path_finding::{
    level_predicate, Connectivity, Navigator, PathFinder, ReplanReason,
};
use gridcast_world::{apply, query, Engine, LevelDescription, LevelMap, TextureDescription};

fn description(layout: &[&str]) -> LevelDescription {
    LevelDescription {
        name: "test".to_owned(),
        layout: layout.iter().map(|row| (*row).to_owned()).collect(),
        textures: vec![TextureDescription {
            id: 1,
            name: "stone".to_owned(),
        }],
        npcs: Vec::new(),
    }
}

fn engine(layout: &[&str]) -> Engine {
    Engine::from_description(&description(layout), 1.0).expect("valid level")
}

fn assert_walkable(level: &LevelMap, start: CellCoord, path: &Path, connectivity: Connectivity) {
    let mut previous = start;
    for &cell in path.waypoints() {
        let direction = Direction::between(previous, cell).expect("adjacent waypoints");
        assert!(connectivity.directions().contains(&direction));
        assert!(!level.is_blocked(cell, None), "{cell:?} is blocked");
        if let Some((first, second)) = direction.components() {
            for component in [first, second] {
                let corner = previous
                    .neighbor(component, level.dimensions().0, level.dimensions().1)
                    .expect("corner inside grid");
                assert!(!level.is_blocked(corner, None), "cut corner at {corner:?}");
            }
        }
        previous = cell;
    }
}

#[test]
fn open_grid_path_length_matches_metric() {
    let bounds = (9, 7);
    let pairs = [
        (CellCoord::new(0, 0), CellCoord::new(8, 6)),
        (CellCoord::new(4, 3), CellCoord::new(0, 6)),
        (CellCoord::new(7, 1), CellCoord::new(2, 1)),
        (CellCoord::new(3, 6), CellCoord::new(3, 0)),
    ];

    for (start, goal) in pairs {
        let four = PathFinder::new(Connectivity::Four)
            .find_path(bounds, start, goal, |_| false)
            .expect("in bounds")
            .expect("reachable");
        assert_eq!(four.len() as u32, start.manhattan_distance(goal));
        assert_eq!(four.goal(), Some(goal));

        let eight = PathFinder::new(Connectivity::Eight)
            .find_path(bounds, start, goal, |_| false)
            .expect("in bounds")
            .expect("reachable");
        assert_eq!(eight.len() as u32, start.chebyshev_distance(goal));
        assert_eq!(eight.goal(), Some(goal));
    }
}

#[test]
fn path_through_maze_is_walkable() {
    let engine = engine(&[
        "111111111", //
        "1P..1...1", //
        "1.1.1.1.1", //
        "1.1...1.1", //
        "1.11111.1", //
        "1.......1", //
        "111111111", //
    ]);
    let level = query::level_map(&engine);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(5, 1);

    for connectivity in [Connectivity::Four, Connectivity::Eight] {
        let path = PathFinder::new(connectivity)
            .find_level_path(level, None, start, goal)
            .expect("in bounds")
            .expect("reachable");
        assert_walkable(level, start, &path, connectivity);
        assert_eq!(path.goal(), Some(goal));
    }
}

#[test]
fn diagonal_is_refused_past_a_wall_corner() {
    let engine = engine(&[
        "1111", //
        "1P.1", //
        "1.11", //
        "1111", //
    ]);
    let level = query::level_map(&engine);

    // Stepping diagonally from (2,1) to (1,2) would clip the (2,2) wall.
    let path = PathFinder::new(Connectivity::Eight)
        .find_level_path(level, None, CellCoord::new(2, 1), CellCoord::new(1, 2))
        .expect("in bounds")
        .expect("reachable");

    assert_eq!(path.len(), 2, "diagonal past the (2,2) wall is not allowed");
    assert_eq!(path.waypoints(), &[CellCoord::new(1, 1), CellCoord::new(1, 2)]);
    assert_eq!(path.first(), Some(CellCoord::new(1, 1)));
}

#[test]
fn blocked_or_unreachable_goal_yields_none() {
    let engine = engine(&[
        "1111111", //
        "1P.1..1", //
        "1..1..1", //
        "1111111", //
    ]);
    let level = query::level_map(&engine);
    let finder = PathFinder::default();

    assert_eq!(
        finder.find_level_path(level, None, CellCoord::new(1, 1), CellCoord::new(3, 1)),
        Ok(None),
        "goal is a wall"
    );
    assert_eq!(
        finder.find_level_path(level, None, CellCoord::new(1, 1), CellCoord::new(5, 2)),
        Ok(None),
        "goal is walled off"
    );
}

#[test]
fn start_equal_to_goal_yields_empty_path() {
    let finder = PathFinder::default();
    let cell = CellCoord::new(2, 2);

    let path = finder
        .find_path((4, 4), cell, cell, |_| true)
        .expect("in bounds")
        .expect("trivial path");

    assert!(path.is_empty());
}

#[test]
fn start_cell_is_never_tested() {
    let start = CellCoord::new(0, 0);
    let mut tested = Vec::new();

    let path = PathFinder::new(Connectivity::Four)
        .find_path((3, 1), start, CellCoord::new(2, 0), |cell| {
            tested.push(cell);
            cell == start
        })
        .expect("in bounds")
        .expect("reachable");

    assert_eq!(path.len(), 2);
    assert!(!tested.contains(&start));
}

#[test]
fn identical_inputs_produce_identical_paths() {
    let engine = engine(&[
        "1111111111", //
        "1P.......1", //
        "1..1..1..1", //
        "1........1", //
        "1..1..1..1", //
        "1........1", //
        "1111111111", //
    ]);
    let level = query::level_map(&engine);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(8, 5);

    for connectivity in [Connectivity::Four, Connectivity::Eight] {
        let first = PathFinder::new(connectivity)
            .find_path(level.dimensions(), start, goal, level_predicate(level, None))
            .expect("in bounds");
        for _ in 0..8 {
            let again = PathFinder::new(connectivity)
                .find_path(level.dimensions(), start, goal, level_predicate(level, None))
                .expect("in bounds");
            assert_eq!(first, again);
        }
    }
}

#[test]
fn occupied_cells_are_avoided_except_by_their_occupant() {
    let mut engine = engine(&[
        "1111111", //
        "1P.N..1", //
        "1.....1", //
        "1111111", //
    ]);
    let finder = PathFinder::new(Connectivity::Four);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(5, 1);
    let occupied = CellCoord::new(3, 1);

    let detour = finder
        .find_level_path(query::level_map(&engine), None, start, goal)
        .expect("in bounds")
        .expect("reachable");
    assert_eq!(detour.len(), 6);
    assert!(!detour.waypoints().contains(&occupied));

    let own = finder
        .find_level_path(query::level_map(&engine), Some(NpcId::new(0)), start, goal)
        .expect("in bounds")
        .expect("reachable");
    assert_eq!(own.len(), 4);

    let mut events = Vec::new();
    apply(
        &mut engine,
        Command::KillNpc {
            npc: NpcId::new(0),
        },
        &mut events,
    );
    engine.update(&mut events);

    let direct = finder
        .find_level_path(query::level_map(&engine), None, start, goal)
        .expect("in bounds")
        .expect("reachable");
    assert_eq!(direct.len(), 4);
}

#[test]
fn occupied_goal_is_unreachable() {
    let engine = engine(&[
        "111111", //
        "1P..N1", //
        "111111", //
    ]);

    assert_eq!(
        PathFinder::default().find_level_path(
            query::level_map(&engine),
            None,
            CellCoord::new(1, 1),
            CellCoord::new(4, 1)
        ),
        Ok(None)
    );
}

#[test]
fn navigator_replans_around_newly_blocked_waypoint() {
    let mut engine = engine(&[
        "1111111", //
        "1N....1", //
        "1....N1", //
        "1P....1", //
        "1111111", //
    ]);
    let finder = PathFinder::new(Connectivity::Four);
    let walker = NpcId::new(0);
    let blocker = NpcId::new(1);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(5, 1);
    let mut navigator = Navigator::new();

    let first = navigator
        .next_waypoint(&finder, query::level_map(&engine), walker, start, goal)
        .expect("in bounds");
    assert_eq!(first, Some(CellCoord::new(2, 1)));

    let mut events = Vec::new();
    apply(
        &mut engine,
        Command::MoveNpc {
            npc: blocker,
            position: Vec2::new(2.5, 1.5),
        },
        &mut events,
    );
    engine.update(&mut events);

    let rerouted = navigator
        .next_waypoint(&finder, query::level_map(&engine), walker, start, goal)
        .expect("in bounds");

    assert_eq!(navigator.last_replan(), Some(ReplanReason::Blocked));
    assert_eq!(rerouted, Some(CellCoord::new(1, 2)));
    assert_eq!(navigator.goal(), Some(goal));
}
