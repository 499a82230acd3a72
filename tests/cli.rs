use std::error::Error;

use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use predicates::prelude::*;

const SIGNAL: &str = "\
track type=bedGraph name=signal
chr1	100	150	5
chr1	150	155	0.5
chr1	160	200	9
chr1	500	520	3
chr2	10	12	8
";

fn bgpeaks() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("bgpeaks")?)
}

#[test]
fn merge_with_default_output_name() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let input = temp.child("sample.bg");
    input.write_str(SIGNAL)?;

    bgpeaks()?
        .arg(input.path())
        .args(["-t", "1", "-m", "10", "-d", "20"])
        .assert()
        .success();

    temp.child("sample_peaks.bed")
        .assert("chr1\t100\t200\t1\t14\nchr1\t500\t520\t2\t3\n");
    Ok(())
}

#[test]
fn keep_highest_without_ids() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let input = temp.child("sample.bg");
    input.write_str(SIGNAL)?;
    let output = temp.child("highest.bed");

    bgpeaks()?
        .arg(input.path())
        .args(["-t", "1", "-m", "2", "-d", "20", "--close-peaks", "keep-highest", "--no-id"])
        .arg("-o")
        .arg(output.path())
        .assert()
        .success();

    output.assert("chr1\t160\t200\t9\nchr1\t500\t520\t3\nchr2\t10\t12\t8\n");
    temp.child("sample_peaks.bed").assert(predicate::path::missing());
    Ok(())
}

#[test]
fn blacklist_removes_overlapping_peaks() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let input = temp.child("sample.bg");
    input.write_str(SIGNAL)?;
    let blacklist = temp.child("blacklist.bed");
    blacklist.write_str("chr1\t519\t530\tartifact\nchr2\t0\t10\tadjacent\n")?;
    let output = temp.child("filtered.bed");

    bgpeaks()?
        .arg(input.path())
        .args(["-t", "1", "-m", "2", "-d", "20", "--id-prefix", "id"])
        .arg("-b")
        .arg(blacklist.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success();

    output.assert("chr1\t100\t200\tid1\t14\nchr2\t10\t12\tid2\t8\n");
    Ok(())
}

#[test]
fn malformed_input_fails_without_output() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let input = temp.child("broken.bg");
    input.write_str("chr1\t100\t150\t5\nchr1\t200\tabc\t1\n")?;

    bgpeaks()?
        .arg(input.path())
        .args(["-t", "1", "-m", "1", "-d", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));

    temp.child("broken_peaks.bed").assert(predicate::path::missing());
    Ok(())
}

#[test]
fn missing_input_fails() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;

    bgpeaks()?
        .arg(temp.child("absent.bg").path())
        .args(["-t", "1", "-m", "1", "-d", "20"])
        .assert()
        .failure();

    temp.child("absent_peaks.bed").assert(predicate::path::missing());
    Ok(())
}

#[test]
fn invalid_length_range_fails() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let input = temp.child("sample.bg");
    input.write_str(SIGNAL)?;

    bgpeaks()?
        .arg(input.path())
        .args(["-t", "1", "-m", "100", "-M", "10", "-d", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_length"));

    temp.child("sample_peaks.bed").assert(predicate::path::missing());
    Ok(())
}
