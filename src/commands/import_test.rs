//! job-import コマンドのユニットテスト

use super::*;
use crate::error::ImportError;
use crate::registry::JobRegistry;
use crate::testing::{export_document, write_plain_bundle};
use tempfile::TempDir;

fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
    Args::try_parse_from(std::iter::once("job-import").chain(args.iter().copied()))
}

mod args_tests {
    use super::*;

    #[test]
    fn import_metadata_is_required() {
        let err = parse(&["bundle.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn import_metadata_accepts_bool_spellings() {
        assert!(parse(&["b.json", "--import-metadata=true"]).unwrap().import_metadata);
        assert!(parse(&["b.json", "--import-metadata", "YES"]).unwrap().import_metadata);
        assert!(!parse(&["b.json", "--import-metadata=0"]).unwrap().import_metadata);
    }

    #[test]
    fn import_metadata_rejects_other_values() {
        let err = parse(&["b.json", "--import-metadata=perhaps"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn dashed_options_are_collected() {
        let args = parse(&[
            "b.json",
            "--import-metadata=false",
            "--server-datafolder=/data",
            "registry-path=/srv/jobs.json",
        ])
        .unwrap();

        assert_eq!(args.bundle, PathBuf::from("b.json"));
        assert_eq!(
            args.options,
            vec!["--server-datafolder=/data", "registry-path=/srv/jobs.json"]
        );
    }

    #[test]
    fn separator_before_options_is_accepted() {
        let args = parse(&[
            "b.json",
            "--import-metadata=false",
            "server-datafolder=/data",
            "--",
            "--jobs-folder=/jobs",
        ])
        .unwrap();

        let options = parse_options(&args.options).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options["server-datafolder"], "/data");
        assert_eq!(options["jobs-folder"], "/jobs");
    }
}

mod run_tests {
    use super::*;

    #[test]
    fn imports_into_datafolder() {
        let temp_dir = TempDir::new().unwrap();
        let bundle = write_plain_bundle(temp_dir.path(), &export_document("Nightly"));
        let datafolder = temp_dir.path().join("data");

        run(Args {
            bundle,
            import_metadata: false,
            options: vec![format!("server-datafolder={}", datafolder.display())],
        })
        .unwrap();

        let mut registry =
            JsonJobRegistry::new(datafolder.join("registry.json"), datafolder.join("jobs"));
        assert!(registry.exists("Nightly").unwrap());
        let entries = registry.list().unwrap();
        assert!(entries[0].job.metadata.is_empty());
        assert!(entries[0].job.db_path.as_ref().unwrap().is_file());
    }

    #[test]
    fn malformed_option_is_argument_error() {
        let temp_dir = TempDir::new().unwrap();
        let bundle = write_plain_bundle(temp_dir.path(), &export_document("Nightly"));

        let err = run(Args {
            bundle,
            import_metadata: true,
            options: vec!["server-datafolder".to_string()],
        })
        .unwrap_err();

        assert!(matches!(err, ImportError::Argument(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
