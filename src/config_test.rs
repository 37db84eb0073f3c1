use super::*;
use serial_test::serial;

fn options(args: &[&str]) -> BTreeMap<String, String> {
    parse_options(args).unwrap()
}

/// テスト中だけ環境変数を差し替える
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn set(vars: &[(&'static str, Option<&str>)]) -> Self {
        let saved = vars
            .iter()
            .map(|(key, _)| (*key, std::env::var(key).ok()))
            .collect();
        for (key, value) in vars {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

mod parse_bool_tests {
    use super::*;

    #[test]
    fn accepts_common_spellings() {
        for value in ["true", "TRUE", "yes", "On", "1", " true "] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["false", "False", "no", "OFF", "0"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
    }

    #[test]
    fn rejects_anything_else() {
        for value in ["", "maybe", "2", "truee", "y"] {
            assert_eq!(parse_bool(value), None, "{value}");
        }
    }
}

mod parse_options_tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let parsed = options(&["registry-path=/tmp/a=b.json"]);
        assert_eq!(parsed["registry-path"], "/tmp/a=b.json");
    }

    #[test]
    fn strips_dashes_and_normalizes_case() {
        let parsed = options(&["--Server-DataFolder=/data"]);
        assert_eq!(parsed["server-datafolder"], "/data");
    }

    #[test]
    fn later_value_wins() {
        let parsed = options(&["jobs-folder=/a", "jobs-folder=/b"]);
        assert_eq!(parsed["jobs-folder"], "/b");
    }

    #[test]
    fn empty_value_is_allowed() {
        let parsed = options(&["log-level="]);
        assert_eq!(parsed["log-level"], "");
    }

    #[test]
    fn missing_equals_is_argument_error() {
        let err = parse_options(["registry-path"]).unwrap_err();
        assert!(matches!(err, ImportError::Argument(_)));
    }

    #[test]
    fn separator_is_skipped() {
        let parsed = options(&["server-datafolder=/data", "--", "--jobs-folder=/jobs"]);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["jobs-folder"], "/jobs");
    }

    #[test]
    fn missing_key_is_argument_error() {
        let err = parse_options(["=value"]).unwrap_err();
        assert!(matches!(err, ImportError::Argument(_)));
    }
}

mod resolve_tests {
    use super::*;

    #[test]
    #[serial]
    fn explicit_datafolder_derives_paths() {
        let _env = EnvGuard::set(&[(DATAFOLDER_ENV, Some("/from/env"))]);

        let config = ImportConfig::resolve(&options(&["server-datafolder=/data"])).unwrap();

        assert_eq!(config.datafolder, PathBuf::from("/data"));
        assert_eq!(config.registry_path, PathBuf::from("/data/registry.json"));
        assert_eq!(config.jobs_folder, PathBuf::from("/data/jobs"));
    }

    #[test]
    #[serial]
    fn explicit_paths_override_datafolder() {
        let config = ImportConfig::resolve(&options(&[
            "server-datafolder=/data",
            "registry-path=/etc/jobs.json",
            "jobs-folder=/var/lib/jobs",
        ]))
        .unwrap();

        assert_eq!(config.registry_path, PathBuf::from("/etc/jobs.json"));
        assert_eq!(config.jobs_folder, PathBuf::from("/var/lib/jobs"));
    }

    #[test]
    #[serial]
    fn falls_back_to_environment() {
        let _env = EnvGuard::set(&[(DATAFOLDER_ENV, Some("/from/env"))]);

        let config = ImportConfig::resolve(&BTreeMap::new()).unwrap();
        assert_eq!(config.datafolder, PathBuf::from("/from/env"));
    }

    #[test]
    #[serial]
    fn falls_back_to_home() {
        let _env = EnvGuard::set(&[(DATAFOLDER_ENV, Some("")), ("HOME", Some("/home/alice"))]);

        let config = ImportConfig::resolve(&BTreeMap::new()).unwrap();
        assert_eq!(config.datafolder, PathBuf::from("/home/alice/.job-import"));
    }

    #[test]
    #[serial]
    fn no_location_is_argument_error() {
        let _env = EnvGuard::set(&[
            (DATAFOLDER_ENV, None),
            ("HOME", None),
            ("USERPROFILE", None),
        ]);

        let err = ImportConfig::resolve(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ImportError::Argument(_)));
    }

    #[test]
    #[serial]
    fn unknown_options_are_ignored() {
        let config =
            ImportConfig::resolve(&options(&["server-datafolder=/data", "dbpath=/x"])).unwrap();
        assert_eq!(config.registry_path, PathBuf::from("/data/registry.json"));
    }

    #[test]
    #[serial]
    fn relative_option_paths_become_absolute() {
        let cwd = std::env::current_dir().unwrap();

        let config = ImportConfig::resolve(&options(&[
            "server-datafolder=data",
            "jobs-folder=stores/jobs",
        ]))
        .unwrap();

        assert!(config.datafolder.is_absolute());
        assert_eq!(config.datafolder, cwd.join("data"));
        assert_eq!(config.registry_path, cwd.join("data").join("registry.json"));
        assert_eq!(config.jobs_folder, cwd.join("stores/jobs"));
    }

    #[test]
    #[serial]
    fn relative_environment_path_becomes_absolute() {
        let _env = EnvGuard::set(&[(DATAFOLDER_ENV, Some("from-env"))]);

        let config = ImportConfig::resolve(&options(&["registry-path=jobs.json"])).unwrap();

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.datafolder, cwd.join("from-env"));
        assert_eq!(config.registry_path, cwd.join("jobs.json"));
        assert_eq!(config.jobs_folder, cwd.join("from-env").join("jobs"));
    }
}
