use std::fs;

use ptsbot_config::{
    ConfigError, DocumentFormat, IutLink, Loader, ProjectConfigList, ReferenceKind, SchemaErrorKind,
};
use tempfile::tempdir;

use super::sample_dir;

fn sample_loader() -> Loader {
    Loader::new().check_git_paths(false)
}

// 示例中两条记录的项目名都是 zephyr，按声明顺序返回
#[test_log::test]
fn test_sample_records_in_declaration_order() {
    let projects = sample_loader()
        .load(&sample_dir().join("bot_projects.sample.toml"))
        .unwrap();

    assert_eq!(projects.len(), 2);
    let labels: Vec<_> = projects.iter().map(|p| p.label.clone().unwrap()).collect();
    assert_eq!(labels, vec!["nrf_v160", "zephyr_nrf52"]);
    assert_eq!(projects.names().collect::<Vec<_>>(), vec!["zephyr", "zephyr"]);

    for project in &projects {
        assert!(!project.name.is_empty());
        assert_eq!(project.auto_pts.server_ip.len(), project.auto_pts.cli_port.len());
        assert!(project.iut_config().is_some());
    }
}

#[test]
fn test_sample_presets_substituted() {
    let projects = sample_loader()
        .load(&sample_dir().join("bot_projects.sample.toml"))
        .unwrap();
    let mmdl = projects.get(1).unwrap().iut_config().unwrap();
    let entry = mmdl.get("overlay-mesh.conf").unwrap();
    assert_eq!(entry.test_cases, vec!["MMDL"]);
    assert_eq!(
        entry.overlay.get("CONFIG_BT_MESH_MODEL_EXTENSIONS").map(String::as_str),
        Some("y")
    );
}

#[test]
fn test_superguard_default_when_omitted() {
    let projects = sample_loader()
        .load(&sample_dir().join("bot_projects.sample.toml"))
        .unwrap();
    assert_eq!(projects.get(0).unwrap().auto_pts.superguard, 15);
    // 第二条记录没有写 superguard
    assert_eq!(projects.get(1).unwrap().auto_pts.superguard, 15);
    assert_eq!(
        projects.get(1).unwrap().auto_pts.superguard_timeout(),
        std::time::Duration::from_secs(15 * 60)
    );
}

#[test]
fn test_sample_hardware_settings() {
    let projects = sample_loader()
        .load(&sample_dir().join("bot_projects.sample.toml"))
        .unwrap();
    let nrf = &projects.get(0).unwrap().auto_pts;
    assert!(!nrf.stress_test);
    assert_eq!(nrf.ykush.as_deref(), Some("1"));
    assert_eq!(nrf.iut_link(), IutLink::Tty("/dev/ttyACM0"));
    assert_eq!(nrf.debugger_snr.as_deref(), Some("683000000"));
    assert!(nrf.rtt_log);
    assert!(!nrf.btmon);
    assert_eq!(nrf.test_cases, vec!["GAP", "GATT", "MESH"]);
    assert!(nrf.runs_test_case("GATT/SR/GAR/BV-01-C"));
    assert!(!nrf.runs_test_case("GATT/CL/GAR/BV-01-C"));
    assert!(!nrf.runs_test_case("L2CAP/COS/CED/BV-01-C"));

    // 第二条记录全部使用默认值
    let zephyr = &projects.get(1).unwrap().auto_pts;
    assert!(!zephyr.stress_test && !zephyr.rtt_log && !zephyr.btmon);
    assert_eq!(zephyr.ykush, None);
    assert_eq!(zephyr.debugger_snr, None);
    assert_eq!(zephyr.iut_link(), IutLink::Emulated);
    assert!(zephyr.test_cases.is_empty() && zephyr.excluded.is_empty());
    assert!(zephyr.runs_test_case("L2CAP/COS/CED/BV-01-C"));
}

#[test]
fn test_empty_tty_file_rejected() {
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    let edited = sample.replace("tty_file = \"/dev/ttyACM0\"", "tty_file = \"\"");
    let err = sample_loader()
        .with_presets_file(sample_dir().join("iut_presets.toml"))
        .load_str(&edited, DocumentFormat::Toml)
        .unwrap_err();
    match err {
        ConfigError::Schema(e) => {
            assert_eq!(e.record.index, 0);
            assert_eq!(e.field, "auto_pts.tty_file");
            assert!(matches!(e.kind, SchemaErrorKind::Invariant(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_loading_twice_is_equal() {
    let path = sample_dir().join("bot_projects.sample.toml");
    let first = sample_loader().load(&path).unwrap();
    let second = sample_loader().load(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_yaml_sample() {
    let projects = sample_loader()
        .load(&sample_dir().join("bot_projects.sample.yaml"))
        .unwrap();
    assert_eq!(projects.len(), 1);
    let project = projects.get(0).unwrap();
    assert_eq!(project.auto_pts.superguard, 20);
    assert!(!project.repo("zephyr").unwrap().update_repo);
    let iut = project.iut_config().unwrap();
    assert_eq!(iut.config_for_test_case("BAP/UCL/SCC/BV-001-C"), Some("overlay-le-audio.conf"));
    assert_eq!(project.mail.as_ref().unwrap().smtp_port, 587);
    assert!(project.auto_pts.stress_test);
    assert_eq!(project.auto_pts.iut_link(), IutLink::Hci(0));
    assert!(!project.auto_pts.runs_test_case("GAP/BROB/BCST/BV-01-C"));
    assert!(project.auto_pts.runs_test_case("GAP/BROB/OBSV/BV-01-C"));
}

#[test]
fn test_round_trip_through_document() {
    let projects = sample_loader()
        .load(&sample_dir().join("bot_projects.sample.toml"))
        .unwrap();
    for format in [DocumentFormat::Toml, DocumentFormat::Yaml] {
        let text = projects.to_document_string(format).unwrap();
        let reloaded: ProjectConfigList = sample_loader().load_str(&text, format).unwrap();
        assert_eq!(reloaded, projects);
    }
}

#[test]
fn test_update_repo_omitted_defaults_to_false() {
    let dir = tempdir().unwrap();
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    let edited = sample.replacen("update_repo = true\n", "", 1);
    fs::write(dir.path().join("bot.toml"), edited).unwrap();
    fs::copy(sample_dir().join("iut_presets.toml"), dir.path().join("iut_presets.toml")).unwrap();

    let projects = sample_loader().load(&dir.path().join("bot.toml")).unwrap();
    assert!(!projects.get(0).unwrap().repo("nrf").unwrap().update_repo);
    assert!(projects.get(1).unwrap().repo("zephyr").unwrap().update_repo);
}

#[test]
fn test_git_paths_checked_relative_to_document() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("zephyrproject/zephyr")).unwrap();
    let doc = r#"
[[projects]]
name = "zephyr"

[projects.auto_pts]
project_path = "zephyrproject/zephyr"
workspace = "zephyr-master"
board = "nrf52"

[projects.git.zephyr]
remote = "origin"
branch = "master"
path = "zephyrproject/zephyr"

[projects.git.mcuboot]
remote = "origin"
branch = "main"
path = "zephyrproject/bootloader/mcuboot"

[projects.iut_config."prj.conf"]
test_cases = ["GAP"]
"#;
    fs::write(dir.path().join("bot.toml"), doc).unwrap();

    let err = Loader::new().load(&dir.path().join("bot.toml")).unwrap_err();
    match err {
        ConfigError::Reference(e) => {
            assert_eq!(e.project, "zephyr");
            assert!(matches!(e.kind, ReferenceKind::GitPath { ref repo, .. } if repo == "mcuboot"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    fs::create_dir_all(dir.path().join("zephyrproject/bootloader/mcuboot")).unwrap();
    let projects = Loader::new().load(&dir.path().join("bot.toml")).unwrap();
    assert_eq!(projects.get(0).unwrap().git.len(), 2);
}

#[test]
fn test_missing_presets_file_is_fatal() {
    let dir = tempdir().unwrap();
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    fs::write(dir.path().join("bot.toml"), sample).unwrap();

    let result = sample_loader().load_lenient(&dir.path().join("bot.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_lenient_skips_only_bad_record() {
    let dir = tempdir().unwrap();
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    let edited = sample.replace("workspace = \"nrf-v160\"\n", "");
    fs::write(dir.path().join("bot.toml"), edited).unwrap();

    let outcome = sample_loader()
        .with_presets_file(sample_dir().join("iut_presets.toml"))
        .load_lenient(&dir.path().join("bot.toml"))
        .unwrap();
    assert_eq!(outcome.projects.len(), 1);
    assert_eq!(outcome.projects.get(0).unwrap().label.as_deref(), Some("zephyr_nrf52"));
    match &outcome.rejected[..] {
        [ConfigError::Schema(e)] => {
            assert_eq!(e.record.index, 0);
            assert_eq!(e.field, "auto_pts.workspace");
            assert_eq!(e.kind, SchemaErrorKind::MissingField);
        }
        other => panic!("unexpected rejections: {other:?}"),
    }
}

#[test]
fn test_bad_presets_key_names_document() {
    let dir = tempdir().unwrap();
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    let edited = sample.replace("iut_presets = \"iut_presets.toml\"", "iut_presets = 5");
    let path = dir.path().join("bot.toml");
    fs::write(&path, edited).unwrap();

    match sample_loader().load(&path) {
        Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_toml_time_literals_in_document() {
    let dir = tempdir().unwrap();
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    let edited = sample
        .replace("monday = \"10:00\"", "monday = 10:00:00")
        .replace("friday = \"22:00\"", "friday = 22:00:30");
    fs::write(dir.path().join("bot.toml"), edited).unwrap();
    fs::copy(sample_dir().join("iut_presets.toml"), dir.path().join("iut_presets.toml")).unwrap();

    let projects = sample_loader().load(&dir.path().join("bot.toml")).unwrap();
    let scheduler = projects.get(1).unwrap().scheduler.clone().unwrap();
    let triggers: Vec<_> = scheduler.triggers().map(|(day, at)| format!("{day} {at}")).collect();
    assert_eq!(triggers, vec!["monday 10:00", "friday 22:00:30"]);
}
