//! Integration tests for the ScriptSweep pipeline
//!
//! These tests build small Unity projects on disk and run the complete
//! analysis against them.

mod common;

use common::*;
use scriptsweep::hierarchy::Hierarchy;
use scriptsweep::scene::SceneParser;
use scriptsweep::{Analyzer, Config, Reporter};
use std::collections::BTreeSet;

fn run(root: &std::path::Path, out: &std::path::Path) -> scriptsweep::AnalysisReport {
    let config = Config::default();
    let report = Analyzer::new(&config).run(root, out).expect("analysis should succeed");
    Reporter::new(out, &config.report.csv_name)
        .with_terminal(false)
        .report(&report, root)
        .expect("report should be written");
    report
}

#[test]
fn test_end_to_end_single_object() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    mover_project(&root, "m_Speed");

    let report = run(&root, &out);

    let dump = std::fs::read_to_string(out.join("Main.unity.dump")).unwrap();
    assert_eq!(dump.lines().collect::<Vec<_>>(), vec!["Root"]);

    let csv = std::fs::read_to_string(out.join("UnusedScripts.csv")).unwrap();
    assert_eq!(csv, "Relative Path,GUID\n");
    assert!(report.unused.is_empty());
    assert_eq!(report.scripts_registered, 1);
}

#[test]
fn test_unreferenced_script_is_reported() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    mover_project(&root, "m_Speed");
    script(
        &root,
        "Assets/Scripts/AI/Patrol.cs",
        "def456",
        "public class Patrol : MonoBehaviour { public float radius; }\n",
    );

    let report = run(&root, &out);

    let csv = std::fs::read_to_string(out.join("UnusedScripts.csv")).unwrap();
    assert_eq!(csv, "Relative Path,GUID\nAssets/Scripts/AI/Patrol.cs,def456\n");
    assert_eq!(report.unused.len(), 1);
}

#[test]
fn test_scripts_without_sidecar_are_never_reported() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    mover_project(&root, "m_Speed");
    write(&root, "Assets/Editor/Tool.cs", "public class Tool { }\n");

    let report = run(&root, &out);

    assert_eq!(report.scripts_found, 2);
    assert_eq!(report.scripts_registered, 1);
    assert!(report.unused.is_empty());
}

#[test]
fn test_script_shared_by_many_scenes_counts_once() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    script(&root, "Assets/Scripts/Mover.cs", "abc123", MOVER_SOURCE);

    for i in 0..12 {
        write(
            &root,
            &format!("Assets/Scenes/Level{}.unity", i),
            &scene(&[
                game_object("1", &format!("Level{}", i)),
                transform("2", "1", "0"),
                behaviour("3", "1", "abc123", &[("speed", "1")]),
                behaviour("4", "1", "abc123", &[("m_Speed", "2")]),
            ]),
        );
    }

    let report = run(&root, &out);

    assert_eq!(report.scenes_processed(), 12);
    assert!(report.unused.is_empty());
    assert_eq!(report.used_count(), 1);
    for i in 0..12 {
        let dump = std::fs::read_to_string(out.join(format!("Level{}.unity.dump", i))).unwrap();
        assert_eq!(dump, format!("Level{}\n", i));
    }
}

#[test]
fn test_scenes_outside_scene_dir_are_ignored() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    script(&root, "Assets/Scripts/Mover.cs", "abc123", MOVER_SOURCE);
    write(
        &root,
        "Assets/Sandbox/Scratch.unity",
        &scene(&[
            game_object("1", "Scratch"),
            transform("2", "1", "0"),
            behaviour("3", "1", "abc123", &[("m_Speed", "1")]),
        ]),
    );

    let report = run(&root, &out);

    assert_eq!(report.scenes_processed(), 0);
    assert!(!out.join("Scratch.unity.dump").exists());
    assert_eq!(report.unused.len(), 1);
}

#[test]
fn test_nested_hierarchy_dump() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    write(
        &root,
        "Assets/Scenes/World.unity",
        &scene(&[
            game_object("10", "Environment"),
            game_object("20", "Terrain"),
            game_object("30", "Trees"),
            game_object("40", "Player"),
            game_object("50", "Camera"),
            transform("11", "10", "0"),
            transform("21", "20", "11"),
            transform("31", "30", "11"),
            transform("41", "40", "0"),
            transform("51", "50", "41"),
            // Owner does not exist: no line, no descendants
            transform("61", "999", "41"),
            game_object("70", "Hidden"),
            transform("71", "70", "61"),
        ]),
    );

    let report = run(&root, &out);

    let dump = std::fs::read_to_string(out.join("World.unity.dump")).unwrap();
    assert_eq!(dump, "Environment\n-Terrain\n-Trees\nPlayer\n-Camera\n");
    assert_eq!(report.scenes[0].objects, 5);
    assert_eq!(report.cycle_count(), 0);
}

#[test]
fn test_malformed_blocks_do_not_abort_scene() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    let text = format!(
        "{}{}--- !u!1 &77\nGameObject:\n  m_Name: [broken\n{}",
        SCENE_PREAMBLE,
        game_object("1", "Survivor"),
        transform("2", "1", "0"),
    );
    write(&root, "Assets/Scenes/Broken.unity", &text);

    let report = run(&root, &out);

    assert_eq!(report.scenes[0].malformed_blocks, 1);
    let dump = std::fs::read_to_string(out.join("Broken.unity.dump")).unwrap();
    assert_eq!(dump, "Survivor\n");
}

#[test]
fn test_entity_counts_match_block_counts() {
    let mut blocks = Vec::new();
    let (objects, transforms, behaviours) = (4, 3, 5);
    for i in 0..objects {
        blocks.push(game_object(&format!("{}", 100 + i), &format!("Obj{}", i)));
    }
    for i in 0..transforms {
        blocks.push(transform(&format!("{}", 200 + i), "100", "0"));
    }
    for i in 0..behaviours {
        blocks.push(behaviour(&format!("{}", 300 + i), "100", "g", &[]));
    }
    // Anchorless and unrecognized blocks contribute nothing
    blocks.push("--- !u!1 &\nGameObject:\n  m_Name: NoAnchor\n".to_string());
    blocks.push("--- !u!20 &900\nCamera:\n  m_Enabled: 1\n".to_string());

    let document = SceneParser::default().parse(&scene(&blocks));

    assert_eq!(document.entity_count(), objects + transforms + behaviours);
    assert_eq!(document.nodes().count(), objects);
    assert_eq!(document.transforms().count(), transforms);
    assert_eq!(document.components().count(), behaviours);
}

#[test]
fn test_hierarchy_lines_stable_across_builds() {
    let text = scene(&[
        game_object("1", "A"),
        game_object("2", "B"),
        game_object("3", "C"),
        transform("13", "3", "11"),
        transform("11", "1", "0"),
        transform("12", "2", "11"),
    ]);
    let parser = SceneParser::default();

    let first = Hierarchy::build(&parser.parse(&text));
    let second = Hierarchy::build(&parser.parse(&text));

    let first_set: BTreeSet<_> = first.lines().iter().cloned().collect();
    let second_set: BTreeSet<_> = second.lines().iter().cloned().collect();
    assert_eq!(first_set, second_set);
    assert_eq!(first.lines(), second.lines());
    assert_eq!(first.lines(), &["A", "-B", "-C"]);
}

#[test]
fn test_output_directory_is_created() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("deep").join("nested").join("out");
    mover_project(&root, "m_Speed");

    run(&root, &out);

    assert!(out.join("UnusedScripts.csv").is_file());
    assert!(out.join("Main.unity.dump").is_file());
}

#[test]
fn test_project_below_temp_directory_is_scanned() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("Temp").join("Project");
    let out = temp_dir.path().join("out");
    mover_project(&root, "m_Speed");

    let report = run(&root, &out);

    assert_eq!(report.scripts_found, 1);
    assert_eq!(report.scenes_processed(), 1);
    assert_eq!(
        std::fs::read_to_string(out.join("Main.unity.dump")).unwrap(),
        "Root\n"
    );
}
