//! Integration tests for the entente driver binary.
//!
//! Spawns the engine process, feeds it commands on stdin and checks the
//! reply lines on stdout.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_entente");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start entente");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

/// A running engine driven one command at a time.
struct Driver {
    child: std::process::Child,
    stdin: std::process::ChildStdin,
    stdout: std::io::BufReader<std::process::ChildStdout>,
}

impl Driver {
    fn start() -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_entente"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to start entente");
        let stdin = child.stdin.take().unwrap();
        let stdout = std::io::BufReader::new(child.stdout.take().unwrap());
        Driver { child, stdin, stdout }
    }

    /// Sends one command and returns its reply line.
    fn send(&mut self, cmd: &str) -> String {
        writeln!(self.stdin, "{}", cmd).unwrap();
        self.stdin.flush().unwrap();
        let mut line = String::new();
        self.stdout.read_line(&mut line).unwrap();
        line.trim_end().to_string()
    }

    fn quit(mut self) {
        writeln!(self.stdin, "quit").unwrap();
        drop(self.stdin);
        assert!(self.child.wait().unwrap().success());
    }
}

fn report_json(line: &str) -> serde_json::Value {
    let json = line.strip_prefix("report ").unwrap_or_else(|| panic!("not a report: {}", line));
    serde_json::from_str(json).unwrap()
}

#[test]
fn one_reply_per_command() {
    let lines = run_engine(&["register alice pw", "", "login alice pw", "games", "quit", "games"]);
    assert_eq!(lines, vec!["ok registered alice", "ok logged in alice", "report []"]);
}

#[test]
fn unknown_command_is_an_error_line() {
    let lines = run_engine(&["dance", "status"]);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "error unknown command 'dance'");
    assert!(lines[1].starts_with("error "));
}

#[test]
fn bad_credentials_are_refused() {
    let lines = run_engine(&["register bob secret", "login bob wrong", "create"]);
    assert_eq!(lines[0], "ok registered bob");
    assert!(lines[1].starts_with("error "));
    assert_eq!(lines[2], "error not logged in");
}

#[test]
fn create_order_and_status() {
    let lines = run_engine(&[
        "register alice pw",
        "login alice pw",
        "create",
        r#"order -o '["ENG: F edi -> nth", "ENG: F lon -> eng", "ENG: A lvp -> wal -> lon"]'"#,
        "status",
        "quit",
    ]);
    assert_eq!(lines.len(), 5);

    let created: Vec<&str> = lines[2].split_whitespace().collect();
    assert_eq!(created[0..2], ["ok", "game"]);
    assert_eq!(created[3], "ENG");

    let outcome = report_json(&lines[3]);
    assert_eq!(outcome["accepted"].as_array().map(|a| a.len()), Some(2));
    assert_eq!(outcome["rejected"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(outcome["reports"].as_array().map(|a| a.len()), Some(0));
    assert_eq!(outcome["pending"].as_array().map(|a| a.len()), Some(6));

    let status = report_json(&lines[4]);
    assert_eq!(status["year"], 1901);
    assert_eq!(status["submitted"].as_array().map(|a| a.len()), Some(1));
}

#[test]
fn force_resolves_with_missing_orders() {
    let lines = run_engine(&[
        "register alice pw",
        "login alice pw",
        "create",
        r#"order '["ENG: F edi -> nth"]'"#,
        "force",
        "board",
    ]);
    assert_eq!(lines.len(), 6);
    let reports = report_json(&lines[4]);
    assert_eq!(reports.as_array().map(|a| a.len()), Some(1));

    let board = report_json(&lines[5]);
    assert!(board.to_string().contains("nth"));
}

#[test]
fn register_create_and_order_opening_for_all_powers() {
    let mut driver = Driver::start();
    assert_eq!(driver.send("register Louis 1234"), "ok registered Louis");
    let created = driver.send("create");
    let game = created.split_whitespace().nth(2).unwrap().to_string();
    assert!(created.ends_with("ENG"), "{}", created);

    let england = report_json(&driver.send(
        r#"order -o '["ENG: F edi -> nth", "ENG: F lon -> eng", "ENG: A lvp -> edi"]'"#,
    ));
    assert_eq!(england["accepted"].as_array().map(|a| a.len()), Some(3));

    let others = [
        ("french", "FRA", r#"["FRA: F bre -> mao", "FRA: A par -> bur", "FRA: A mar -> spa"]"#),
        ("german", "GER", r#"["GER: F kie -> den", "GER: A ber -> kie", "GER: A mun -> ruh"]"#),
        ("italian", "ITA", r#"["ITA: F nap -> ion", "ITA: A rom -> apu", "ITA: A ven -> tyr"]"#),
        ("austrian", "AUS", r#"["AUS: F tri -> adr", "AUS: A vie -> bud", "AUS: A bud -> ser"]"#),
        (
            "russian",
            "RUS",
            r#"["RUS: F sev -> bla", "RUS: A mos -> ukr", "RUS: A war -> gal", "RUS: F stp(sc) -> bot"]"#,
        ),
        ("turkish", "TUR", r#"["TUR: F ank -> bla", "TUR: A con -> bul", "TUR: A smy -> con"]"#),
    ];
    let mut last = serde_json::Value::Null;
    for (name, power, orders) in others {
        assert_eq!(driver.send(&format!("register {} 1234", name)), format!("ok registered {}", name));
        assert_eq!(driver.send(&format!("join {}", game)), format!("ok joined {} {}", game, power));
        last = report_json(&driver.send(&format!("order -o '{}'", orders)));
        assert_eq!(last["rejected"].as_array().map(|a| a.len()), Some(0), "{}", power);
    }

    // The last submission resolves spring 1901.
    assert_eq!(last["reports"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(last["pending"].as_array().map(|a| a.len()), Some(7));
    let status = report_json(&driver.send("status"));
    assert_eq!(status["phase"], "fall_movement");
    driver.quit();
}
