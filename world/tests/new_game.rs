use std::{fs, path::Path};

use gridcast_core::CellCoord;
use gridcast_world::{query, Engine, LevelCatalog, LevelError};

const FOV: f32 = 1.0;

fn write_level(directory: &Path, file: &str, name: &str, spawn_row: usize) {
    let mut rows = vec!["1111", "1..1", "1..1", "1111"];
    let spawn = "1P.1";
    rows[spawn_row] = spawn;
    let layout = rows
        .iter()
        .map(|row| format!("  \"{row}\","))
        .collect::<Vec<_>>()
        .join("\n");
    let source = format!(
        "name = \"{name}\"\nlayout = [\n{layout}\n]\n\n[[textures]]\nid = 1\nname = \"stone\"\n"
    );
    fs::write(directory.join(file), source).expect("write level");
}

#[test]
fn new_game_cycles_through_catalog() {
    let directory = tempfile::tempdir().expect("tempdir");
    write_level(directory.path(), "testing.toml", "testing", 1);
    write_level(directory.path(), "level_0.toml", "first", 2);

    let catalog = LevelCatalog::discover(directory.path()).expect("catalog");

    let testing = Engine::new_game(&catalog, 0, FOV).expect("testing level");
    assert_eq!(query::level_map(&testing).name(), "testing");
    assert_eq!(
        query::level_map(&testing).player_spawn(),
        CellCoord::new(1, 1)
    );

    let wrapped = Engine::new_game(&catalog, 3, FOV).expect("wrapped level");
    assert_eq!(query::level_map(&wrapped).name(), "first");
    assert_eq!(query::level_number(&wrapped), 3);
    assert_eq!(
        query::camera_pose(&wrapped).cell(),
        Some(CellCoord::new(1, 2))
    );
}

#[test]
fn malformed_level_aborts_new_game() {
    let directory = tempfile::tempdir().expect("tempdir");
    fs::write(
        directory.path().join("level_0.toml"),
        "layout = [\"1.1\"]\n[[textures]]\nid = 1\nname = \"stone\"\n",
    )
    .expect("write level");

    let catalog = LevelCatalog::discover(directory.path()).expect("catalog");

    assert!(matches!(
        Engine::new_game(&catalog, 0, FOV),
        Err(LevelError::Malformed(_))
    ));
}
