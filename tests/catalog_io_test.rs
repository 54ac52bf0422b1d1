mod common;

use std::fs;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use obsplan::constants::{BANDS, SOUTHERN_REACH};
use obsplan::field::{io, CompletedFields};
use obsplan::scheduler::params::SchedulerParams;
use obsplan::scheduler_errors::SchedulerError;
use obsplan::survey::{prepare_fields, DitherMode};
use obsplan::time::minutes;

use common::{reference_date, scheduler_with, strip_catalog};

fn utf8_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
}

#[test]
fn test_scheduled_file_feeds_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let tstart = reference_date();
    let scheduler = scheduler_with(strip_catalog(1), vec![], SchedulerParams::default());

    let mut state = scheduler.initial_state(CompletedFields::new());
    let first = scheduler
        .run(&mut state, tstart, Some(tstart + minutes(30.0)), false)
        .unwrap();
    let path = utf8_path(&dir, "night1.csv");
    io::write_fields(&path, &first, false).unwrap();

    let completed = io::read_completed(&[path.clone()]).unwrap();
    assert_eq!(completed.len(), first.len());
    for (read, written) in completed.iter().zip(&first) {
        assert_eq!(read.id(), written.id());
        assert_eq!(read.date(), written.date());
    }

    // a fresh state seeded from the file picks up where the first run stopped
    let restart = *first.last().unwrap().date().unwrap() + minutes(2.0);
    let mut state = scheduler.initial_state(completed);
    let second = scheduler
        .run(&mut state, restart, Some(restart + minutes(30.0)), false)
        .unwrap();
    assert!(!second.is_empty());
    assert!(second.iter().all(|f| !first.iter().any(|g| g.id() == f.id())));
}

#[test]
fn test_empty_schedule_can_be_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = utf8_path(&dir, "20160215.csv");
    io::write_fields(&path, &[], false).unwrap();

    let header = fs::read_to_string(&path).unwrap();
    assert!(header.starts_with("ID,HEX,TILING,FILTER,RA,DEC"));

    let completed = io::read_completed(&[path]).unwrap();
    assert!(completed.is_empty());
}

#[test]
fn test_write_protect() {
    let dir = tempfile::tempdir().unwrap();
    let path = utf8_path(&dir, "protected.csv");
    let fields = strip_catalog(1);

    io::write_fields(&path, &fields, true).unwrap();
    assert!(fs::metadata(&path).unwrap().permissions().readonly());

    assert_eq!(
        io::write_fields(&path, &fields, false),
        Err(SchedulerError::WriteProtected(path.to_string()))
    );
    assert_eq!(io::read_fields(&path).unwrap().len(), fields.len());
}

#[test]
fn test_prepared_catalog_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let hexes_path = utf8_path(&dir, "hexes.csv");
    fs::write(
        &hexes_path,
        "ID,RA,DEC\n1,120.0,-60.0\n2,330.0,-70.0\n3,200.0,0.0\n",
    )
    .unwrap();

    let hexes = io::read_hexes(&hexes_path).unwrap();
    assert_eq!(hexes.len(), 3);

    let fields = prepare_fields(&hexes, DitherMode::None, &BANDS, SOUTHERN_REACH, None);
    assert_eq!(fields.len(), 2 * 4 * BANDS.len());

    let catalog_path = utf8_path(&dir, "target_fields.csv");
    io::write_fields(&catalog_path, &fields, false).unwrap();
    let read = io::read_fields(&catalog_path).unwrap();
    assert_eq!(read, fields);
}
