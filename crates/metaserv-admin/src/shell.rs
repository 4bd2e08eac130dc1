//! Interactive admin shell.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

use crate::admin::MetaAdmin;
use crate::command::{split_statements, Command, StatementBuffer, HELP_TEXT};
use crate::error::Result;

/// Prompt shown when no statement is pending.
pub const PROMPT: &str = "metab > ";

/// Prompt shown while a statement is incomplete.
pub const CONTINUATION_PROMPT: &str = "~ ";

/// What happened after executing a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Message for the operator; keep reading.
    Message(String),
    /// Stop the shell.
    Exit,
}

/// Runs admin statements against a [`MetaAdmin`].
pub struct CommandShell<'a> {
    admin: &'a MetaAdmin,
}

impl<'a> CommandShell<'a> {
    /// Creates a shell.
    #[must_use]
    pub fn new(admin: &'a MetaAdmin) -> Self {
        Self { admin }
    }

    /// Parses and executes one statement.
    ///
    /// # Errors
    ///
    /// Returns whatever parsing or the operation returns.
    pub async fn execute(&self, statement: &str) -> Result<Outcome> {
        debug!(statement = %statement, "Executing");

        let message = match statement.parse::<Command>()? {
            Command::AddDbDescr(request) => {
                let registration = self.admin.add_db_descr(&request).await?;
                format!(
                    "Added database '{}' ({} tables, {} columns)",
                    request.db_name, registration.tables, registration.columns
                )
            }
            Command::AddInstitution(name) => {
                self.admin.add_institution(&name).await?;
                format!("Added institution '{name}'")
            }
            Command::AddProject(name) => {
                self.admin.add_project(&name).await?;
                format!("Added project '{name}'")
            }
            Command::AddUser(user, affiliation) => {
                self.admin.add_user(&user, &affiliation).await?;
                format!("Added user '{}'", user.user_name)
            }
            Command::Help => HELP_TEXT.to_string(),
            Command::Exit => return Ok(Outcome::Exit),
        };

        Ok(Outcome::Message(message))
    }

    /// Executes every statement in `text`, stopping at the first error.
    ///
    /// Returns the messages produced before an `EXIT`/`QUIT` or the end.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error.
    pub async fn execute_script(&self, text: &str) -> Result<Vec<String>> {
        let mut messages = Vec::new();
        for statement in split_statements(text) {
            match self.execute(&statement).await? {
                Outcome::Message(message) => messages.push(message),
                Outcome::Exit => break,
            }
        }
        Ok(messages)
    }

    /// Reads statements from `input` until `EXIT`, `QUIT` or end of input.
    ///
    /// Failed statements are reported as `ERROR: ...` and the loop goes on.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Io`](crate::AdminError::Io) if reading or
    /// writing fails.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut buffer = StatementBuffer::new();

        loop {
            let prompt = if buffer.is_pending() {
                CONTINUATION_PROMPT
            } else {
                PROMPT
            };
            output.write_all(prompt.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                output.write_all(b"\n").await?;
                break;
            };

            for statement in buffer.push_line(&line) {
                match self.execute(&statement).await {
                    Ok(Outcome::Message(message)) => {
                        output.write_all(format!("{message}\n").as_bytes()).await?;
                    }
                    Ok(Outcome::Exit) => {
                        output.flush().await?;
                        return Ok(());
                    }
                    Err(e) => {
                        error!(code = e.code(), "{e}");
                        output.write_all(format!("ERROR: {e}\n").as_bytes()).await?;
                    }
                }
            }
        }

        output.flush().await?;
        Ok(())
    }
}
