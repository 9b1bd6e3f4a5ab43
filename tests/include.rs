use std::fs;
use std::path::PathBuf;

use spark_rs::{assemble_file, AsmError, Registry};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("spark-include-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn unwrap_at_line(err: AsmError) -> AsmError {
    match err {
        AsmError::AtLine { source, .. } => *source,
        other => other,
    }
}

#[test]
fn included_lines_precede_the_rest_of_the_includer() {
    let dir = scratch("ordering");
    fs::write(dir.join("inc.s"), "jmp sp\n").unwrap();
    let main = dir.join("main.s");
    fs::write(&main, "add r0, r1, r2\n#include 'inc.s'\nmov r0, r1\n").unwrap();

    let reg = Registry::spark().unwrap();
    let out = assemble_file(&reg, &main).unwrap();
    assert_eq!(out.words, vec![0x0D09_5000, 0x2380_0000, 0x1109_0000]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn includes_nest() {
    let dir = scratch("nested");
    fs::write(dir.join("inner.s"), "ret\n").unwrap();
    fs::write(dir.join("outer.s"), "#include 'inner.s'\njmp sp\n").unwrap();
    let main = dir.join("main.s");
    fs::write(&main, "#include 'outer.s'\nadd r0, r1, r2\n").unwrap();

    let reg = Registry::spark().unwrap();
    let out = assemble_file(&reg, &main).unwrap();
    // inner, then outer's own line, then main's
    assert_eq!(out.words, vec![0x2360_0000, 0x2380_0000, 0x0D09_5000]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn labels_cross_include_boundaries() {
    let dir = scratch("labels");
    fs::write(dir.join("prologue.s"), "entry:\nadd r0, r0, r0\n").unwrap();
    let main = dir.join("main.s");
    fs::write(&main, "#include 'prologue.s'\nlabjmp 'entry'\n").unwrap();

    let reg = Registry::spark().unwrap();
    let out = assemble_file(&reg, &main).unwrap();
    assert_eq!(out.labels[0].name, "entry");
    assert_eq!(out.labels[0].offset, 4);
    assert_eq!(out.words[1], 0x0B19_0000);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn search_paths_resolve_includes() {
    let dir = scratch("search-path");
    let lib_dir = dir.join("lib");
    fs::create_dir_all(&lib_dir).unwrap();
    fs::write(lib_dir.join("lib.s"), "ret\n").unwrap();
    let main = dir.join("main.s");
    fs::write(
        &main,
        format!("#includePath '{}'\n#include 'lib.s'\n", lib_dir.display()),
    )
    .unwrap();

    let reg = Registry::spark().unwrap();
    let out = assemble_file(&reg, &main).unwrap();
    assert_eq!(out.words, vec![0x2360_0000]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn ambiguous_includes_conflict() {
    let dir = scratch("conflict");
    let a = dir.join("a");
    let b = dir.join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::write(a.join("lib.s"), "ret\n").unwrap();
    fs::write(b.join("lib.s"), "jmp sp\n").unwrap();
    let main = dir.join("main.s");
    fs::write(
        &main,
        format!(
            "#includePath '{}'\n#includePath '{}'\n#include 'lib.s'\n",
            a.display(),
            b.display()
        ),
    )
    .unwrap();

    let reg = Registry::spark().unwrap();
    let err = unwrap_at_line(assemble_file(&reg, &main).unwrap_err());
    match err {
        AsmError::IncludeConflict { name, candidates } => {
            assert_eq!(name, "lib.s");
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unresolved_includes_fail() {
    let dir = scratch("unresolved");
    let main = dir.join("main.s");
    fs::write(&main, "#include 'missing.s'\n").unwrap();

    let reg = Registry::spark().unwrap();
    let err = unwrap_at_line(assemble_file(&reg, &main).unwrap_err());
    assert!(matches!(err, AsmError::IncludeResolve { .. }));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bad_include_path_fails() {
    let dir = scratch("bad-path");
    let main = dir.join("main.s");
    fs::write(&main, "#includePath '/no/such/directory/anywhere'\n").unwrap();

    let reg = Registry::spark().unwrap();
    let err = unwrap_at_line(assemble_file(&reg, &main).unwrap_err());
    assert!(matches!(err, AsmError::PathError { .. }));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn include_cycles_are_detected() {
    let dir = scratch("cycle");
    fs::write(dir.join("a.s"), "#include 'b.s'\n").unwrap();
    fs::write(dir.join("b.s"), "#include 'a.s'\n").unwrap();

    let reg = Registry::spark().unwrap();
    let err = assemble_file(&reg, &dir.join("a.s")).unwrap_err();
    assert!(matches!(err, AsmError::IncludeCycle { .. }));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn diamond_includes_are_not_cycles() {
    let dir = scratch("diamond");
    fs::write(dir.join("shared.s"), "ret\n").unwrap();
    fs::write(dir.join("left.s"), "#include 'shared.s'\n").unwrap();
    fs::write(dir.join("right.s"), "#include 'shared.s'\n").unwrap();
    let main = dir.join("main.s");
    fs::write(&main, "#include 'left.s'\n#include 'right.s'\n").unwrap();

    let reg = Registry::spark().unwrap();
    let out = assemble_file(&reg, &main).unwrap();
    assert_eq!(out.words, vec![0x2360_0000, 0x2360_0000]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn directive_arguments_must_be_quoted() {
    let dir = scratch("unquoted");
    let main = dir.join("main.s");
    fs::write(&main, "#include lib.s\n").unwrap();

    let reg = Registry::spark().unwrap();
    let err = unwrap_at_line(assemble_file(&reg, &main).unwrap_err());
    assert!(matches!(err, AsmError::DirectiveSyntax { .. }));

    let _ = fs::remove_dir_all(&dir);
}
