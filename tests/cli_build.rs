use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const QUARTET: &str = "4
A 0 2 4 4
B 2 0 4 4
C 4 4 0 2
D 4 4 2 0
";

#[test]
fn command_build_nj() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input.phy");
    let output = temp.path().join("output.nwk");
    std::fs::write(&input, QUARTET)?;

    let mut cmd = cargo_bin_cmd!("treelike");
    cmd.arg("build")
        .arg(&input)
        .arg("--method")
        .arg("nj")
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let nwk = std::fs::read_to_string(&output)?;
    assert_eq!(nwk, "((A:1,B:1):2,C:1,D:1);\n");

    Ok(())
}

#[test]
fn command_build_bionj_lower_triangle() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input.phy");
    let content = "4
A
B 2
C 4 4
D 4 4 2
";
    std::fs::write(&input, content)?;

    let mut cmd = cargo_bin_cmd!("treelike");
    let output = cmd.arg("build").arg(&input).output()?;
    assert!(output.status.success());

    let nwk = String::from_utf8(output.stdout)?;
    assert!(nwk.trim_end().ends_with(';'));
    for name in ["A:", "B:", "C:", "D:"] {
        assert!(nwk.contains(name));
    }
    assert_eq!(nwk.matches('(').count(), 2);

    Ok(())
}

#[test]
fn command_build_stdin_names() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("treelike");
    cmd.arg("build")
        .arg("stdin")
        .arg("--method")
        .arg("nj")
        .arg("--names")
        .arg("A,C,D")
        .write_stdin(QUARTET)
        .assert()
        .success()
        .stdout(predicate::str::contains("A:").and(predicate::str::contains("B:").not()));

    Ok(())
}

#[test]
fn command_build_indent() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("treelike");
    cmd.arg("build")
        .arg("stdin")
        .arg("--method")
        .arg("nj")
        .arg("--indent")
        .arg("  ")
        .write_stdin(QUARTET)
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  (\n"));

    Ok(())
}

#[test]
fn command_build_negative_distance() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("treelike");
    cmd.arg("build")
        .arg("stdin")
        .write_stdin("3\nA 0 1 2\nB 1 0 -1\nC 2 -1 0\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("degenerate input"));

    Ok(())
}

#[test]
fn command_build_unknown_name() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("treelike");
    cmd.arg("build")
        .arg("stdin")
        .arg("--names")
        .arg("A,Z")
        .write_stdin(QUARTET)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Z"));

    Ok(())
}

#[test]
fn command_build_bad_method() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("treelike");
    cmd.arg("build")
        .arg("stdin")
        .arg("--method")
        .arg("upgma")
        .write_stdin(QUARTET)
        .assert()
        .failure();

    Ok(())
}
