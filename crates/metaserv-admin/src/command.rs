//! Admin command language.
//!
//! Statements are whitespace-separated words terminated by `;`. Keywords are
//! case-insensitive; arguments are taken verbatim.

use std::str::FromStr;

use crate::admin::DbDescrRequest;
use crate::catalog::NewUser;
use crate::error::AdminError;

/// Help shown by `HELP`.
pub const HELP_TEXT: &str = "\
Supported commands:
  ADD DBDESCR <dbName> <schemaFile> <level> <dataRel> <owner> <accessibility> [<projectName>] [<connFile>];
    Registers an existing database, described by an annotated schema file.
    level: DC, L1, L2, L3 or dev
    accessibility: released, unreleased or private
    projectName defaults to LSST; connFile defaults to the catalog connection file.
  ADD INSTITUTION <name>;
  ADD PROJECT <name>;
  ADD USER <userName> <firstName> <lastName> <affiliation> <email>;
  HELP;
  QUIT;
  EXIT;
Statements end with ';'.";

/// A parsed admin statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `ADD DBDESCR`.
    AddDbDescr(DbDescrRequest),
    /// `ADD INSTITUTION`.
    AddInstitution(String),
    /// `ADD PROJECT`.
    AddProject(String),
    /// `ADD USER`; the second field is the affiliation.
    AddUser(NewUser, String),
    /// `HELP`.
    Help,
    /// `QUIT` or `EXIT`.
    Exit,
}

fn bad(statement: &str) -> AdminError {
    AdminError::BadCommand(statement.to_string())
}

fn parse_add(statement: &str, words: &[&str]) -> Result<Command, AdminError> {
    let Some((what, args)) = words.split_first() else {
        return Err(bad(statement));
    };

    match (what.to_uppercase().as_str(), args) {
        ("DBDESCR", [db, file, level, release, owner, access, rest @ ..]) if rest.len() <= 2 => {
            let mut request = DbDescrRequest::new(
                *db,
                *file,
                level.parse()?,
                *release,
                *owner,
                access.parse()?,
            );
            if let Some(project) = rest.first() {
                request = request.project(*project);
            }
            if let Some(connection) = rest.get(1) {
                request = request.connection(*connection);
            }
            Ok(Command::AddDbDescr(request))
        }
        ("DB", _) => Err(AdminError::NotImplemented("ADD DB".to_string())),
        ("INSTITUTION", [name]) => Ok(Command::AddInstitution((*name).to_string())),
        ("PROJECT", [name]) => Ok(Command::AddProject((*name).to_string())),
        ("USER", [user, first, last, affiliation, email]) => Ok(Command::AddUser(
            NewUser {
                user_name: (*user).to_string(),
                first_name: (*first).to_string(),
                last_name: (*last).to_string(),
                email: (*email).to_string(),
            },
            (*affiliation).to_string(),
        )),
        _ => Err(bad(statement)),
    }
}

impl FromStr for Command {
    type Err = AdminError;

    /// Parses one statement, without its terminating `;`.
    fn from_str(statement: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = statement.split_whitespace().collect();
        let Some((keyword, rest)) = words.split_first() else {
            return Err(bad(statement));
        };

        match keyword.to_uppercase().as_str() {
            "ADD" => parse_add(statement, rest),
            "HELP" => Ok(Self::Help),
            "QUIT" | "EXIT" => Ok(Self::Exit),
            other => Err(AdminError::NotImplemented(other.to_string())),
        }
    }
}

/// Accumulates input lines and yields complete `;`-terminated statements.
#[derive(Debug, Default)]
pub struct StatementBuffer {
    pending: String,
}

impl StatementBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one line and returns the statements it completes, in order.
    ///
    /// Empty statements are skipped.
    pub fn push_line(&mut self, line: &str) -> Vec<String> {
        if !self.pending.is_empty() {
            self.pending.push(' ');
        }
        self.pending.push_str(line.trim());

        let mut statements = Vec::new();
        while let Some(end) = self.pending.find(';') {
            let statement = self.pending[..end].trim().to_string();
            self.pending.drain(..=end);
            if !statement.is_empty() {
                statements.push(statement);
            }
        }
        if self.pending.trim().is_empty() {
            self.pending.clear();
        }
        statements
    }

    /// Whether an unterminated statement is waiting for more input.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Splits a block of text into statements.
#[must_use]
pub fn split_statements(text: &str) -> Vec<String> {
    let mut buffer = StatementBuffer::new();
    text.lines().flat_map(|line| buffer.push_line(line)).collect()
}
