//! Integration tests for the config.ini codec
//!
//! These tests verify:
//! - Element sequences survive a serialize/deserialize cycle in any order
//! - Elements that cannot be written are rejected instead of changing on read
//! - Files on disk round-trip through the atomic writer
//! - Real-world config.ini files with comments and blank lines

use camino::Utf8PathBuf;
use hutao_install::models::IniElement;
use hutao_install::services::ini;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn section_name() -> impl Strategy<Value = String> {
    "\\PC{1,12}".prop_filter("section names are stored trimmed", |name| {
        !name.is_empty() && name.trim() == name
    })
}

fn key() -> impl Strategy<Value = String> {
    "\\PC{1,12}".prop_filter("keys are trimmed and cannot look like other lines", |key| {
        !key.is_empty()
            && key.trim() == key
            && !key.contains('=')
            && !key.starts_with(['[', ';', '#'])
    })
}

fn element_strategy() -> impl Strategy<Value = IniElement> {
    prop_oneof![
        section_name().prop_map(IniElement::section),
        (key(), "\\PC{0,12}").prop_map(|(key, value)| IniElement::parameter(key, value)),
        "\\PC{0,24}".prop_map(IniElement::comment),
    ]
}

fn any_element() -> impl Strategy<Value = IniElement> {
    prop_oneof![
        "(?s).{0,8}".prop_map(IniElement::section),
        ("(?s).{0,8}", "(?s).{0,8}").prop_map(|(key, value)| IniElement::parameter(key, value)),
        "(?s).{0,8}".prop_map(IniElement::comment),
    ]
}

proptest! {
    #[test]
    fn prop_serialize_then_deserialize_is_identity(
        elements in prop::collection::vec(element_strategy(), 0..40)
    ) {
        let text = ini::serialize(&elements).unwrap();
        let parsed = ini::deserialize(&text).unwrap();
        prop_assert_eq!(parsed, elements);
    }

    #[test]
    fn prop_written_elements_always_read_back(
        elements in prop::collection::vec(any_element(), 0..10)
    ) {
        match ini::serialize(&elements) {
            Ok(text) => {
                prop_assert_eq!(ini::deserialize(&text).unwrap(), elements);
            }
            Err(err) => {
                prop_assert!(
                    matches!(err, ini::IniError::Unrepresentable { .. }),
                    "unexpected error: {}",
                    err
                );
            }
        }
    }
}

#[test]
fn test_file_round_trip_preserves_order() {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().join("config.ini")).unwrap();

    let elements = vec![
        IniElement::comment("OSRELWin5.0.0_R24530411"),
        IniElement::section("General"),
        IniElement::parameter("game_version", "5.0.0"),
        IniElement::comment(" plugin entries below"),
        IniElement::section("Plugin"),
        IniElement::parameter("plugin_sdk_version", "3.5.0"),
        IniElement::parameter("channel", "1"),
    ];

    ini::serialize_to_file(&path, &elements).unwrap();
    assert_eq!(ini::deserialize_from_file(&path).unwrap(), elements);
}

#[test]
fn test_blank_lines_do_not_affect_parameters() {
    let text = "[General]\r\n\r\nchannel=1\r\n   \r\nsub_channel=1\r\n";
    let elements = ini::deserialize(text).unwrap();

    assert_eq!(
        elements,
        vec![
            IniElement::section("General"),
            IniElement::parameter("channel", "1"),
            IniElement::parameter("sub_channel", "1"),
        ]
    );
    assert_eq!(
        ini::serialize(&elements).unwrap(),
        "[General]\nchannel=1\nsub_channel=1\n"
    );
}

#[test]
fn test_keys_are_trimmed_and_values_kept_verbatim() {
    let elements = ini::deserialize("  channel = 14  \n[ General ]\n").unwrap();
    assert_eq!(
        elements,
        vec![
            IniElement::parameter("channel", " 14  "),
            IniElement::section("General"),
        ]
    );
}

#[test]
fn test_comments_survive_a_rewrite() {
    let text = "; launcher note\n# hash note\nOSRELWin5.0.0_R24530411\n[General]\nchannel=1\n";
    let elements = ini::deserialize(text).unwrap();
    let rewritten = ini::serialize(&elements).unwrap();

    assert_eq!(
        rewritten,
        "; launcher note\n; hash note\n;OSRELWin5.0.0_R24530411\n[General]\nchannel=1\n"
    );
    assert_eq!(ini::deserialize(&rewritten).unwrap(), elements);
}

#[test]
fn test_malformed_file_reports_line() {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().join("config.ini")).unwrap();
    fs::write(&path, "[General]\nchannel=1\n\n= orphan value\n").unwrap();

    let err = ini::deserialize_from_file(&path).unwrap_err();
    assert!(matches!(err, ini::IniError::Malformed { line: 4, .. }));
    assert!(err.to_string().contains("line 4"));
}
