//! End-to-end scenarios driving the compiled binary against a local
//! `mockito` HTTP stub or a `tempfile` directory tree, the way the
//! teacher would black-box test a bin-only crate with no library target.

use std::io::Write;
use std::process::Command;

fn linkchecker() -> Command {
    Command::new(env!("CARGO_BIN_EXE_linkchecker"))
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create config file");
    file.write_all(contents.as_bytes()).expect("write config file");
    file
}

/// S1 (file depth 0): a local HTML file with one real anchor is checked
/// for a fragment that doesn't exist on the page; with `AnchorCheck`
/// enabled the run is still valid, but carries a warning naming the
/// missing anchor and the anchors that do exist.
#[test]
fn s1_missing_anchor_on_local_file_warns_but_stays_valid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let page = dir.path().join("anchor.html");
    std::fs::write(&page, r#"<html><body><div id="myid">hi</div></body></html>"#).unwrap();

    let config = write_config("[plugins]\nenabledplugins = AnchorCheck\n");

    let output = linkchecker()
        .arg("-f")
        .arg(config.path())
        .arg("-v")
        .arg("-r")
        .arg("0")
        .arg(format!("file://{}#broken", page.display()))
        .output()
        .expect("run linkchecker");

    let stdout = String::from_utf8_lossy(&output.stdout);
    // Valid but warned (§6 exit codes: warnings still exit 1 unless --no-warnings).
    assert_eq!(output.status.code(), Some(1), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Valid"), "stdout: {stdout}");
    assert!(stdout.to_lowercase().contains("anchor"), "stdout: {stdout}");
    assert!(stdout.contains("myid"), "stdout: {stdout}");
}

/// S2 (HTTP status matrix, subset): 204 stays valid with a "No Content"
/// warning, 429 stays valid with a rate-limit warning, 404 is invalid,
/// 200 is valid and silent without `-v`'s force-print.
#[test]
fn s2_status_matrix_subset() {
    let mut server = mockito::Server::new();
    let ok = server.mock("GET", "/status/200").with_status(200).with_body("hi").create();
    let no_content = server.mock("GET", "/status/204").with_status(204).create();
    let rate_limited = server
        .mock("GET", "/status/429")
        .with_status(429)
        .with_header("retry-after", "5")
        .create();
    let not_found = server.mock("GET", "/status/404").with_status(404).create();

    let output = linkchecker()
        .arg("-v")
        .arg("-r")
        .arg("0")
        .arg(format!("{}/status/200", server.url()))
        .arg(format!("{}/status/204", server.url()))
        .arg(format!("{}/status/429", server.url()))
        .arg(format!("{}/status/404", server.url()))
        .output()
        .expect("run linkchecker");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("/status/200"), "stdout: {stdout}");
    assert!(stdout.contains("No Content"), "stdout: {stdout}");
    assert!(stdout.to_lowercase().contains("rate limited"), "stdout: {stdout}");
    assert!(stdout.contains("404"), "stdout: {stdout}");
    // exit code 1: at least one invalid URL in the batch (§6 exit codes).
    assert_eq!(output.status.code(), Some(1));

    ok.assert();
    no_content.assert();
    rate_limited.assert();
    not_found.assert();
}

/// S3 (redirect refuse cross-scheme): a redirect into `ftp://` is
/// refused without ever attempting the FTP connection.
#[test]
fn s3_redirect_to_different_scheme_is_refused() {
    let mut server = mockito::Server::new();
    let redirect = server
        .mock("GET", "/redirect_newscheme_ftp")
        .with_status(302)
        .with_header("location", "ftp://nonexistent.invalid/file")
        .create();

    let output = linkchecker()
        .arg("-v")
        .arg("-r")
        .arg("0")
        .arg(format!("{}/redirect_newscheme_ftp", server.url()))
        .output()
        .expect("run linkchecker");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error"), "stdout: {stdout}");
    assert_eq!(output.status.code(), Some(1));
    redirect.assert();
}

/// S4 (robots gate): a path disallowed by `robots.txt` is reported valid
/// (syntax-only) with an explanatory info line, and the disallowed path
/// itself is never fetched.
#[test]
fn s4_robots_disallow_skips_connection() {
    let mut server = mockito::Server::new();
    let robots = server
        .mock("GET", "/robots.txt")
        .with_status(200)
        .with_body("User-agent: *\nDisallow: /secret\n")
        .create();
    let secret = server.mock("GET", "/secret").with_status(200).expect(0).create();

    let output = linkchecker()
        .arg("-v")
        .arg("-r")
        .arg("0")
        .arg(format!("{}/secret", server.url()))
        .output()
        .expect("run linkchecker");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Valid"), "stdout: {stdout}");
    assert!(stdout.to_lowercase().contains("robots.txt"), "stdout: {stdout}");
    robots.assert();
    secret.assert();
}
