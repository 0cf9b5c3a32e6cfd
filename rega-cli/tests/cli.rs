use std::fs;
use std::process::Command;

use rega::constants::{HEADER_BYTES, MAGIC};
use rega::decode_header;

fn rega_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rega"))
}

#[test]
fn compile_then_execute_prints_expected_output() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("program.asm");
    fs::write(&source_path, "MOV r1, 3\nMOV r2, 4\nADD r1, r2\nPRINT r1\nEND\n").unwrap();

    let compile = rega_bin().arg("-c").arg(&source_path).output().unwrap();
    assert!(compile.status.success(), "{:?}", compile);
    assert_eq!(String::from_utf8_lossy(&compile.stdout).trim(), "updated");

    let bytecode_path = dir.path().join("program.asm_c");
    assert!(bytecode_path.exists());

    let execute = rega_bin().arg("-e").arg(&bytecode_path).output().unwrap();
    assert!(execute.status.success(), "{:?}", execute);
    assert_eq!(String::from_utf8_lossy(&execute.stdout).trim(), "VM PRINT: 7");
}

#[test]
fn recompiling_unchanged_source_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("program.asm");
    fs::write(&source_path, "NOP\nEND\n").unwrap();

    let first = rega_bin().arg("-c").arg(&source_path).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&first.stdout).trim(), "updated");

    let bytecode_path = dir.path().join("program.asm_c");
    let first_bytes = fs::read(&bytecode_path).unwrap();

    let second = rega_bin().arg("-c").arg(&source_path).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&second.stdout).trim(), "up-to-date");

    let second_bytes = fs::read(&bytecode_path).unwrap();
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn changing_source_forces_recompile() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("program.asm");
    let bytecode_path = dir.path().join("program.asm_c");

    fs::write(&source_path, "NOP\nEND\n").unwrap();
    rega_bin().arg("-c").arg(&source_path).output().unwrap();
    let first_header = decode_header(&fs::read(&bytecode_path).unwrap()[..HEADER_BYTES]);

    fs::write(&source_path, "NOP\nNOP\nEND\n").unwrap();
    let recompile = rega_bin().arg("-c").arg(&source_path).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&recompile.stdout).trim(), "updated");

    let second_header = decode_header(&fs::read(&bytecode_path).unwrap()[..HEADER_BYTES]);
    assert_eq!(second_header.magic, MAGIC);
    assert_ne!(second_header.checksum, first_header.checksum);
}

#[test]
fn parse_error_in_source_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("bad.asm");
    fs::write(&source_path, "MOV error, error\n").unwrap();

    let compile = rega_bin().arg("-c").arg(&source_path).output().unwrap();
    assert!(!compile.status.success());
    assert!(!compile.stderr.is_empty());
}

#[test]
fn executing_a_file_with_the_wrong_magic_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bogus_path = dir.path().join("bogus_c");
    fs::write(&bogus_path, [0u8; HEADER_BYTES]).unwrap();

    let execute = rega_bin().arg("-e").arg(&bogus_path).output().unwrap();
    assert!(!execute.status.success());
}
