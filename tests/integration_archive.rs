use assert_fs::prelude::*;
use assert_fs::TempDir;
use flowbooster::core::archive::{
    discover_volumes, ArchivePackager, ArchiveReport, ArchiveRequest, NamingPolicy, PackageOutcome,
};
use flowbooster::core::config::OrganizerConfig;
use flowbooster::core::organize::{OperationMode, OrganizeOptions, Organizer};
use flowbooster::error::ArchiveError;
use predicates::prelude::*;
use std::fs::File;
use std::io::Read;

fn written(outcome: PackageOutcome) -> ArchiveReport {
    match outcome {
        PackageOutcome::Written(report) => report,
        PackageOutcome::NothingToDo => panic!("expected an archive"),
    }
}

fn member_names(report: &ArchiveReport) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(&report.archive_path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

#[test]
fn organized_project_can_be_archived() {
    let source = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    source.child("a.jpg").write_str("jpeg").unwrap();
    source.child("b.cr2").write_str("raw").unwrap();
    source.child("c.mp4").write_str("video").unwrap();

    let config = OrganizerConfig::default();
    let options = OrganizeOptions {
        operation: OperationMode::Copy,
        ..Default::default()
    };
    Organizer::new(&config)
        .organize_by_type(source.path(), project.path(), &options)
        .unwrap();

    let request = ArchiveRequest::new(
        vec![project.path().join("img"), project.path().join("videos")],
        out.path(),
    )
    .with_naming(NamingPolicy::Fixed("delivery".to_string()));
    let report = written(ArchivePackager::package(&request).unwrap());

    out.child("delivery.zip").assert(predicate::path::is_file());
    assert_eq!(
        member_names(&report),
        vec!["img/jpg/a.jpg", "img/raw/b.cr2", "videos/c.mp4"]
    );
}

#[test]
fn same_relative_path_in_two_sources_stays_apart() {
    let temp = TempDir::new().unwrap();
    temp.child("A/x.txt").write_str("a").unwrap();
    temp.child("B/x.txt").write_str("b").unwrap();

    let request = ArchiveRequest::new(
        vec![temp.path().join("A"), temp.path().join("B")],
        temp.path().join("out"),
    )
    .with_naming(NamingPolicy::Fixed("both".to_string()));
    let report = written(ArchivePackager::package(&request).unwrap());

    assert_eq!(member_names(&report), vec!["A/x.txt", "B/x.txt"]);
}

#[test]
fn protected_split_archive_round_trips() {
    let temp = TempDir::new().unwrap();
    // Incompressible payload so the archive exceeds the cap
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let payload: Vec<u8> = (0..30_000)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 56) as u8
        })
        .collect();
    temp.child("src/big.bin").write_binary(&payload).unwrap();

    let request = ArchiveRequest::new(vec![temp.path().join("src")], temp.path().join("out"))
        .with_naming(NamingPolicy::Fixed("secure".to_string()))
        .with_password("correct horse")
        .with_volume_size(8 * 1024);
    let report = written(ArchivePackager::package(&request).unwrap());

    assert!(report.encrypted);
    assert!(report.volumes.len() >= 4);
    assert_eq!(discover_volumes(&report.archive_path), report.volumes);
    temp.child("out/secure.z01").assert(predicate::path::is_file());

    let joined: Vec<u8> = report
        .volumes
        .iter()
        .flat_map(|v| std::fs::read(v).unwrap())
        .collect();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(joined)).unwrap();
    let mut restored = Vec::new();
    archive
        .by_name_decrypt("big.bin", b"correct horse")
        .unwrap()
        .read_to_end(&mut restored)
        .unwrap();
    assert_eq!(restored, payload);
}

#[test]
fn empty_or_missing_sources() {
    let temp = TempDir::new().unwrap();
    temp.child("empty").create_dir_all().unwrap();

    let request = ArchiveRequest::new(vec![temp.path().join("empty")], temp.path().join("out"));
    assert!(matches!(
        ArchivePackager::package(&request).unwrap(),
        PackageOutcome::NothingToDo
    ));
    temp.child("out").assert(predicate::path::missing());

    let request = ArchiveRequest::new(vec![temp.path().join("nope")], temp.path().join("out"));
    assert!(matches!(
        ArchivePackager::package(&request),
        Err(ArchiveError::SourceNotFound { .. })
    ));
}

#[test]
fn leftover_volumes_without_base_archive_are_cleared() {
    let temp = TempDir::new().unwrap();
    temp.child("src/a.jpg").write_str("jpeg").unwrap();
    for name in ["x.z01", "x.z02", "x.z03"] {
        temp.child("out").child(name).write_str("old part").unwrap();
    }

    let request = ArchiveRequest::new(vec![temp.path().join("src")], temp.path().join("out"))
        .with_naming(NamingPolicy::Fixed("x".to_string()));
    let report = written(ArchivePackager::package(&request).unwrap());

    assert_eq!(report.volumes, vec![temp.path().join("out/x.zip")]);
    assert_eq!(discover_volumes(&report.archive_path), report.volumes);
    temp.child("out/x.z01").assert(predicate::path::missing());
    temp.child("out/x.z03").assert(predicate::path::missing());
}
