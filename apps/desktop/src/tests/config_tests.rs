use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn missing_file_and_env_yield_defaults() {
    let temp = tempfile::tempdir().expect("tempdir");
    let settings =
        load_settings_from(&temp.path().join(SETTINGS_FILE), env_from(&[])).expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.storage_key, "students_registry_v1");
}

#[test]
fn file_values_override_defaults() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join(SETTINGS_FILE);
    fs::write(&file, "data_dir = \"/var/lib/registry\"\nstorage_key = \"class_2024\"\n")
        .expect("write settings");

    let settings = load_settings_from(&file, env_from(&[])).expect("settings");
    assert_eq!(settings.data_dir, PathBuf::from("/var/lib/registry"));
    assert_eq!(settings.storage_key, "class_2024");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join(SETTINGS_FILE);
    fs::write(&file, "storage_key = \"from_file\"\n").expect("write settings");

    let settings = load_settings_from(
        &file,
        env_from(&[
            ("REGISTRY_DATA_DIR", "/tmp/plain"),
            ("APP__DATA_DIR", "/tmp/app"),
            ("REGISTRY_STORAGE_KEY", " from_env "),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.data_dir, PathBuf::from("/tmp/app"));
    assert_eq!(settings.storage_key, "from_env");
}

#[test]
fn malformed_file_is_an_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join(SETTINGS_FILE);
    fs::write(&file, "storage_key = [1, 2").expect("write settings");
    assert!(load_settings_from(&file, env_from(&[])).is_err());

    fs::write(&file, "unknown = \"x\"").expect("write settings");
    assert!(load_settings_from(&file, env_from(&[])).is_err());
}

#[test]
fn blank_storage_key_is_rejected() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = load_settings_from(
        &temp.path().join(SETTINGS_FILE),
        env_from(&[("APP__STORAGE_KEY", "   ")]),
    )
    .expect_err("blank key");
    assert!(err.to_string().contains("storage key"));
}
