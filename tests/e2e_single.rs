
use std::fs;
use std::thread;
use std::time::Duration;

use tempfile::tempdir;

use support_single::{
    Reply, TOKEN_ID, read_child_output, run_ec2auth, spawn_ec2auth, spawn_identity_server,
};

const ACCESS: &str = "AKIDINTEGRATION";
const SECRET: &str = "integration-secret";

fn credential_args(url: &str) -> Vec<String> {
    vec![
        "--auth-url".to_owned(),
        url.to_owned(),
        "--access".to_owned(),
        ACCESS.to_owned(),
        "--secret".to_owned(),
        SECRET.to_owned(),
        "--no-color".to_owned(),
    ]
}

fn describe(output: &std::process::Output) -> String {
    format!(
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn e2e_single_prints_token() -> Result<(), String> {
    let (url, server) = spawn_identity_server(Reply::Token)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_ec2auth(credential_args(&url), &[], dir.path())?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.trim_end() != TOKEN_ID {
        return Err(describe(&output));
    }

    let bodies = server.bodies();
    let Some(body) = bodies.first() else {
        return Err("identity service saw no request".to_owned());
    };
    if !body.contains(ACCESS) || body.contains(SECRET) {
        return Err(format!("unexpected credential document: {}", body));
    }
    Ok(())
}

#[test]
fn e2e_single_rejection_exits_one() -> Result<(), String> {
    let (url, _server) = spawn_identity_server(Reply::Reject)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_ec2auth(credential_args(&url), &[], dir.path())?;
    if output.status.code() != Some(1) || !output.stdout.is_empty() {
        return Err(describe(&output));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("requires authentication") {
        return Err(describe(&output));
    }
    Ok(())
}

#[test]
fn e2e_missing_credentials_fail_before_network() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_ec2auth(["--no-color"], &[], dir.path())?;
    if output.status.success() {
        return Err(describe(&output));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    for expected in ["--auth-url", "--access", "--secret"] {
        if !stderr.contains(expected) {
            return Err(format!("missing {} hint\n{}", expected, describe(&output)));
        }
    }
    Ok(())
}

#[test]
fn e2e_credentials_from_environment() -> Result<(), String> {
    let (url, _server) = spawn_identity_server(Reply::Token)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let envs = [
        ("OS_AUTH_URL", url.as_str()),
        ("AWS_ACCESS_KEY_ID", ACCESS),
        ("AWS_SECRET_ACCESS_KEY", SECRET),
    ];
    let output = run_ec2auth(["--no-color"], &envs, dir.path())?;
    if !output.status.success() || String::from_utf8_lossy(&output.stdout).trim_end() != TOKEN_ID
    {
        return Err(describe(&output));
    }
    Ok(())
}

#[test]
fn e2e_debug_logs_masked_traffic() -> Result<(), String> {
    let (url, _server) = spawn_identity_server(Reply::Token)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let mut args = credential_args(&url);
    args.push("--debug".to_owned());
    let output = run_ec2auth(args, &[], dir.path())?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if String::from_utf8_lossy(&output.stdout).trim_end() != TOKEN_ID {
        return Err(describe(&output));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    for expected in [
        "-> URL: POST",
        "<- Code: 201",
        "User: alice",
        "Project: demo",
    ] {
        if !stderr.contains(expected) {
            return Err(format!("missing {:?}\n{}", expected, describe(&output)));
        }
    }
    if stderr.contains(ACCESS) || stderr.contains(SECRET) || stderr.contains(TOKEN_ID) {
        return Err(format!("credentials leaked\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_config_file_supplies_credentials() -> Result<(), String> {
    let (url, _server) = spawn_identity_server(Reply::Token)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = format!(
        "auth_url = \"{}\"\naccess = \"{}\"\nsecret = \"{}\"\nno_color = true\n",
        url, ACCESS, SECRET
    );
    fs::write(dir.path().join("ec2auth.toml"), config)
        .map_err(|err| format!("write config failed: {}", err))?;

    let output = run_ec2auth(Vec::<String>::new(), &[], dir.path())?;
    if !output.status.success() || String::from_utf8_lossy(&output.stdout).trim_end() != TOKEN_ID
    {
        return Err(describe(&output));
    }
    Ok(())
}

#[test]
fn e2e_continuous_reports_failure_rate() -> Result<(), String> {
    let (url, _server) = spawn_identity_server(Reply::Reject)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let mut args = credential_args(&url);
    args.extend([
        "--threads".to_owned(),
        "2".to_owned(),
        "--show-error".to_owned(),
    ]);
    let mut child = spawn_ec2auth(args, &[], dir.path())?;
    thread::sleep(Duration::from_millis(2500));

    if let Some(status) = child
        .try_wait()
        .map_err(|err| format!("wait failed: {}", err))?
    {
        let (_, stderr) = read_child_output(&mut child)?;
        return Err(format!("continuous mode exited early ({}): {}", status, stderr));
    }
    drop(child.kill());
    drop(child.wait());
    let (stdout, stderr) = read_child_output(&mut child)?;

    if !stdout.is_empty() {
        return Err(format!("continuous mode printed a token: {}", stdout));
    }
    for expected in ["rps, ", "failed (100%)", "failed: 100%", "ERROR: rejected (401) -> "] {
        if !stderr.contains(expected) {
            return Err(format!("missing {:?} in stderr:\n{}", expected, stderr));
        }
    }
    Ok(())
}
