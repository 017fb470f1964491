use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::tempdir;

fn bin() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_marker-cli"));
    command.env_remove("RUST_LOG");
    command
}

fn run_with_stdin(
    args: &[&str],
    stdin: impl AsRef<[u8]>,
) -> Result<Output, Box<dyn std::error::Error>> {
    let mut child = bin()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .ok_or("stdin not captured")?
        .write_all(stdin.as_ref())?;
    Ok(child.wait_with_output()?)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp path is UTF-8")
}

#[test]
fn stdin_to_stdout_document() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_with_stdin(&[], "# Hi\n")?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("<!DOCTYPE html>\n"));
    assert!(stdout.contains("<h1>Hi</h1>\n"));
    assert!(stdout.ends_with("</body>\n</html>\n"));
    Ok(())
}

#[test]
fn invalid_utf8_is_replaced_on_stdin_and_files() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_with_stdin(&["--raw"], b"# Caf\xe9\n")?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "<h1>Caf\u{FFFD}</h1>\n");

    let dir = tempdir()?;
    let input = dir.path().join("latin1.md");
    fs::write(&input, b"*na\xefve*\n")?;
    let output = bin().args(["--raw", path_arg(&input)]).output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "<p><em>na\u{FFFD}ve</em></p>\n");
    Ok(())
}

#[test]
fn raw_file_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.md");
    fs::write(&input, "*x*\n")?;

    let output = bin().args(["--raw", path_arg(&input)]).output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "<p><em>x</em></p>\n");
    Ok(())
}

#[test]
fn writes_output_file_with_stylesheet() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.md");
    let target = dir.path().join("out.html");
    fs::write(&input, "text\n")?;

    let output = bin()
        .args([
            "--css",
            "theme.css",
            "-o",
            path_arg(&target),
            path_arg(&input),
        ])
        .output()?;
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let html = fs::read_to_string(&target)?;
    assert!(html.contains("<link rel=\"stylesheet\" href=\"theme.css\">"));
    assert!(html.contains("<p>text</p>"));
    Ok(())
}

#[test]
fn check_reports_unclosed_fence() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_with_stdin(&["--check"], "text\n```\ncode\n")?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("<stdin>:2: E_UNCLOSED_FENCE: Unclosed code fence"));

    let output = run_with_stdin(&["--check"], "```\ncode\n```\n")?;
    assert!(output.status.success());
    Ok(())
}

#[test]
fn sanitized_drops_scripts() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_with_stdin(&["--raw", "--sanitized"], "hi <script>alert(1)</script>\n")?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("<p>hi"));
    assert!(!stdout.contains("script"));
    Ok(())
}

#[test]
fn feature_switches_reach_the_parser() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_with_stdin(&["--raw", "--no-tables", "--no-escape"], "| a < b |\n|---|\n")?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "<p>| a < b |</p>\n<p>|---|</p>\n"
    );
    Ok(())
}

#[test]
fn directory_mode_mirrors_tree() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("docs");
    let site = dir.path().join("site");
    fs::create_dir_all(src.join("guide"))?;
    fs::write(src.join("index.md"), "# Home\n")?;
    fs::write(src.join("guide/setup.markdown"), "- step\n")?;
    fs::write(src.join("notes.txt"), "ignored\n")?;

    let output = bin()
        .args([path_arg(&src), "--out-dir", path_arg(&site)])
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(fs::read_to_string(site.join("index.html"))?.contains("<h1>Home</h1>"));
    assert!(fs::read_to_string(site.join("guide/setup.html"))?.contains("<li>step</li>"));
    assert!(!site.join("notes.html").exists());
    Ok(())
}

#[test]
fn directory_without_out_dir_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = bin().arg(path_arg(dir.path())).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--out-dir"));
    Ok(())
}

#[test]
fn missing_input_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = bin().arg(path_arg(&dir.path().join("nope.md"))).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
    Ok(())
}

#[test]
fn unknown_flag_is_a_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let output = bin().arg("--definitely-not-a-flag").output()?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}
