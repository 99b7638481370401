//! Shared helpers for building throwaway Unity projects

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const SCENE_PREAMBLE: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

pub fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Write a script and its `.meta` sidecar
pub fn script(root: &Path, rel: &str, guid: &str, source: &str) -> PathBuf {
    let meta = format!(
        "fileFormatVersion: 2\nguid: {}\nMonoImporter:\n  serializedVersion: 2\n",
        guid
    );
    write(root, &format!("{}.meta", rel), &meta);
    write(root, rel, source)
}

pub fn game_object(anchor: &str, name: &str) -> String {
    format!(
        "--- !u!1 &{}\nGameObject:\n  m_ObjectHideFlags: 0\n  serializedVersion: 6\n  m_Name: {}\n  m_IsActive: 1\n",
        anchor, name
    )
}

pub fn transform(anchor: &str, owner: &str, parent: &str) -> String {
    format!(
        "--- !u!4 &{}\nTransform:\n  m_ObjectHideFlags: 0\n  m_GameObject: {{fileID: {}}}\n  m_LocalPosition: {{x: 0, y: 0, z: 0}}\n  m_Children: []\n  m_Father: {{fileID: {}}}\n",
        anchor, owner, parent
    )
}

pub fn behaviour(anchor: &str, owner: &str, guid: &str, fields: &[(&str, &str)]) -> String {
    let mut block = format!(
        "--- !u!114 &{}\nMonoBehaviour:\n  m_ObjectHideFlags: 0\n  m_CorrespondingSourceObject: {{fileID: 0}}\n  m_PrefabInstance: {{fileID: 0}}\n  m_PrefabAsset: {{fileID: 0}}\n  m_GameObject: {{fileID: {}}}\n  m_Enabled: 1\n  m_EditorHideFlags: 0\n  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n  m_Name: \n  m_EditorClassIdentifier: \n",
        anchor, owner, guid
    );
    for (key, value) in fields {
        block.push_str(&format!("  {}: {}\n", key, value));
    }
    block
}

pub fn scene(blocks: &[String]) -> String {
    format!("{}{}", SCENE_PREAMBLE, blocks.concat())
}

pub const MOVER_SOURCE: &str = r#"using UnityEngine;

public class Mover : MonoBehaviour
{
    public float speed = 1f;

    void Update()
    {
        transform.Translate(Vector3.forward * speed * Time.deltaTime);
    }
}
"#;

/// The single-object project: Root with a Mover behaviour carrying `field`
pub fn mover_project(root: &Path, field: &str) {
    script(root, "Assets/Scripts/Mover.cs", "abc123", MOVER_SOURCE);
    write(
        root,
        "Assets/Scenes/Main.unity",
        &scene(&[
            game_object("100", "Root"),
            transform("400", "100", "0"),
            behaviour("500", "100", "abc123", &[(field, "5")]),
        ]),
    );
}
