//! Tests for the admin command shell.

mod common;
use common::*;

use metaserv_admin::prelude::*;
use metaserv_admin::shell::{CONTINUATION_PROMPT, PROMPT};

async fn run(fx: &Fixture, input: &str) -> String {
    let mut output = Vec::new();
    CommandShell::new(&fx.admin)
        .run(input.as_bytes(), &mut output)
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn statements_executed_in_order() {
    let fx = fixture().await;
    let output = run(
        &fx,
        "ADD INSTITUTION SLAC; ADD PROJECT LSST;\nADD USER jdoe Jane Doe SLAC jdoe@example.org;\n",
    )
    .await;

    assert!(output.contains("Added institution 'SLAC'"));
    assert!(output.contains("Added project 'LSST'"));
    assert!(output.contains("Added user 'jdoe'"));
    assert_eq!(count(&fx.admin, "User").await, 1);
}

#[tokio::test]
async fn errors_reported_and_shell_continues() {
    let fx = fixture().await;
    let output = run(
        &fx,
        "ADD USER jdoe Jane Doe SLAC jdoe@example.org;\nFROB;\nADD PROJECT LSST;\n",
    )
    .await;

    assert!(output.contains("ERROR: Institution 'SLAC' not found"));
    assert!(output.contains("ERROR: Command 'FROB' not implemented"));
    assert!(output.contains("Added project 'LSST'"));
}

#[tokio::test]
async fn exit_stops_reading() {
    let fx = fixture().await;
    let output = run(&fx, "ADD PROJECT A;\nquit;\nADD PROJECT B;\n").await;

    assert!(output.contains("Added project 'A'"));
    assert!(!output.contains("'B'"));
    assert_eq!(count(&fx.admin, "Project").await, 1);
}

#[tokio::test]
async fn multi_line_statement_prompts_for_more() {
    let fx = fixture().await;
    let output = run(&fx, "ADD\nPROJECT\nLSST;\n").await;

    assert!(output.starts_with(PROMPT));
    assert_eq!(output.matches(CONTINUATION_PROMPT).count(), 2);
    assert!(output.contains("Added project 'LSST'"));
}

#[tokio::test]
async fn help_lists_commands() {
    let fx = fixture().await;
    let output = run(&fx, "HELP;").await;
    assert!(output.contains("ADD DBDESCR"));
    assert!(output.contains("ADD INSTITUTION"));
}

#[tokio::test]
async fn registers_database_through_shell() {
    let fx = fixture().await;
    let schema = fx.write("db1.sql", SCHEMA);
    let output = run(
        &fx,
        &format!(
            "ADD PROJECT LSST; ADD INSTITUTION SLAC;\n\
             ADD USER jdoe Jane Doe SLAC jdoe@example.org;\n\
             ADD DBDESCR db1 {} L2 DR1 jdoe unreleased LSST {};\n",
            schema.display(),
            fx.target_file.display()
        ),
    )
    .await;

    assert!(
        output.contains("Added database 'db1' (2 tables, 6 columns)"),
        "{output}"
    );
    assert_eq!(fx.queries().databases("L2").await.unwrap(), vec!["db1"]);
}

#[tokio::test]
async fn script_stops_at_first_error() {
    let fx = fixture().await;
    let shell = CommandShell::new(&fx.admin);

    let messages = shell
        .execute_script("ADD PROJECT A;\nADD PROJECT B;")
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);

    let err = shell
        .execute_script("ADD PROJECT C; ADD PROJECT A; ADD PROJECT D;")
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::ProjectExists(ref name) if name == "A"));
    assert_eq!(count(&fx.admin, "Project").await, 3);
}

#[tokio::test]
async fn unsupported_commands() {
    let fx = fixture().await;
    let shell = CommandShell::new(&fx.admin);

    let err = shell.execute("ADD DB x").await.unwrap_err();
    assert_eq!(err.code(), 9998);
    let err = shell.execute("ADD PROJECT").await.unwrap_err();
    assert_eq!(err.code(), 3005);
    assert_eq!(shell.execute("EXIT").await.unwrap(), Outcome::Exit);
}
