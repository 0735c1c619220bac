use std::fs;
use std::process::Command;

use tempfile::tempdir;

const LEDGER: &str = "\
template_hash,label,run_id,status,exit_code,destination,reason,params
abc,6,id-6,completed,,out/prof_6,,\"{\"\"yHe\"\":6.0}\"
abc,7,id-7,failed,4,,solver exited with code 4,\"{\"\"yHe\"\":7.0}\"
abc,8,id-8,completed,,out/prof_8,,\"{\"\"yHe\"\":8.0}\"
";

fn crust_sim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_crust-sim"))
}

#[test]
fn ledger_lists_failed_runs() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.csv");
    fs::write(&ledger, LEDGER).unwrap();
    let output = crust_sim()
        .args(["ledger", "--status", "failed", "--ledger"])
        .arg(&ledger)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("template_hash\tlabel\trun_id\tstatus"));
    assert!(lines[1].starts_with("abc\t7\tid-7\tfailed\t4\t"));
}

#[test]
fn ledger_limit_and_missing_file() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.csv");
    fs::write(&ledger, LEDGER).unwrap();
    let output = crust_sim()
        .args(["ledger", "--limit", "1", "--ledger"])
        .arg(&ledger)
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("id-6"));

    let output = crust_sim()
        .args(["ledger", "--ledger"])
        .arg(dir.path().join("absent.csv"))
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().lines().count(), 1);
}
