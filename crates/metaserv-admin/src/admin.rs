//! Administrative operations on the catalog.
//!
//! Every operation validates its references before writing, and reports
//! failures through [`AdminError`] without touching the catalog.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use metaserv_schema::{parse_file, reconcile};

use crate::catalog::{Catalog, DatabaseEntry, NewUser};
use crate::config::ConnectionConfig;
use crate::error::{AdminError, Result};
use crate::repo::{Accessibility, Level};
use crate::target::TargetDatabase;

/// Project used when a description request names none.
pub const DEFAULT_PROJECT: &str = "LSST";

/// A request to register an existing database from its annotated schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbDescrRequest {
    /// Name of the database on the target server.
    pub db_name: String,
    /// Annotated schema file describing it.
    pub schema_file: PathBuf,
    /// Processing level.
    pub level: Level,
    /// Data release name.
    pub data_release: String,
    /// User name of the owner.
    pub owner: String,
    /// Access class.
    pub accessibility: Accessibility,
    /// Project name.
    pub project: String,
    /// Connection file for the target server; the catalog's when `None`.
    pub connection: Option<PathBuf>,
}

impl DbDescrRequest {
    /// Creates a request with the default project and connection.
    #[must_use]
    pub fn new(
        db_name: impl Into<String>,
        schema_file: impl Into<PathBuf>,
        level: Level,
        data_release: impl Into<String>,
        owner: impl Into<String>,
        accessibility: Accessibility,
    ) -> Self {
        Self {
            db_name: db_name.into(),
            schema_file: schema_file.into(),
            level,
            data_release: data_release.into(),
            owner: owner.into(),
            accessibility,
            project: DEFAULT_PROJECT.to_string(),
            connection: None,
        }
    }

    /// Sets the project.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Sets the target connection file.
    #[must_use]
    pub fn connection(mut self, path: impl Into<PathBuf>) -> Self {
        self.connection = Some(path.into());
        self
    }
}

/// Summary of a registered database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Repository id in the catalog.
    pub repo_id: i64,
    /// Tables recorded.
    pub tables: usize,
    /// Columns recorded.
    pub columns: usize,
}

/// Catalog administration.
pub struct MetaAdmin {
    catalog: Catalog,
    target: ConnectionConfig,
}

impl MetaAdmin {
    /// Creates an admin over `catalog`, using `target` for description
    /// requests that do not name a connection file.
    #[must_use]
    pub fn new(catalog: Catalog, target: ConnectionConfig) -> Self {
        Self { catalog, target }
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Registers an existing database from its annotated schema file.
    ///
    /// The database must exist on the target server, and its schema file must
    /// reconcile exactly with the columns the server reports.
    ///
    /// # Errors
    ///
    /// - [`AdminError::DatabaseNotFound`] if the database is not visible.
    /// - [`AdminError::Schema`] if parsing or reconciliation fails.
    /// - [`AdminError::OwnerNotFound`] / [`AdminError::ProjectNotFound`] for
    ///   unregistered references.
    /// - [`AdminError::DatabaseExists`] if it is already registered.
    pub async fn add_db_descr(&self, request: &DbDescrRequest) -> Result<Registration> {
        let config = match &request.connection {
            Some(path) => ConnectionConfig::from_file(path)?,
            None => self.target.clone(),
        };
        let target = TargetDatabase::connect(&config).await?;

        if !target.database_exists(&request.db_name).await? {
            error!(database = %request.db_name, "Database does not exist");
            target.close().await;
            return Err(AdminError::DatabaseNotFound(request.db_name.clone()));
        }

        let model = parse_file(&request.schema_file)?;
        let positions = target.column_positions(&request.db_name).await?;
        debug!(
            database = %request.db_name,
            tables = model.len(),
            columns = positions.len(),
            "Reconciling schema file with database"
        );
        let schema = reconcile(model, &positions)?;

        let version = target.schema_version(&request.db_name).await?;
        if version.is_none() {
            warn!(database = %request.db_name, "Schema version unknown");
        }
        let schema = schema.with_version(version);
        let endpoint = target.endpoint().clone();
        target.close().await;

        let Some(owner_id) = self.catalog.user_id(&request.owner).await? else {
            error!(owner = %request.owner, "Owner not found");
            return Err(AdminError::OwnerNotFound(request.owner.clone()));
        };
        let Some(project_id) = self.catalog.project_id(&request.project).await? else {
            error!(project = %request.project, "Project not found");
            return Err(AdminError::ProjectNotFound(request.project.clone()));
        };
        if self.catalog.database_id(&request.db_name).await?.is_some() {
            error!(database = %request.db_name, "Database already registered");
            return Err(AdminError::DatabaseExists(request.db_name.clone()));
        }

        let url = request.schema_file.display().to_string();
        let repo_id = self
            .catalog
            .insert_database(
                &DatabaseEntry {
                    db_name: &request.db_name,
                    url: &url,
                    level: request.level,
                    data_release: &request.data_release,
                    accessibility: request.accessibility,
                    owner_id,
                    project_id,
                    endpoint: &endpoint,
                },
                &schema,
            )
            .await?;

        Ok(Registration {
            repo_id,
            tables: schema.model().len(),
            columns: schema.model().column_count(),
        })
    }

    /// Registers a user affiliated with a known institution.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UserExists`] for a taken user name and
    /// [`AdminError::InstitutionNotFound`] for an unknown affiliation.
    pub async fn add_user(&self, user: &NewUser, affiliation: &str) -> Result<i64> {
        if self.catalog.user_id(&user.user_name).await?.is_some() {
            error!(user = %user.user_name, "User already exists");
            return Err(AdminError::UserExists(user.user_name.clone()));
        }
        let Some(institution_id) = self.catalog.institution_id(affiliation).await? else {
            error!(institution = %affiliation, "Institution not found");
            return Err(AdminError::InstitutionNotFound(affiliation.to_string()));
        };

        let id = self.catalog.insert_user(user, institution_id).await?;
        info!(user = %user.user_name, institution = %affiliation, "Added user");
        Ok(id)
    }

    /// Registers an institution.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InstitutionExists`] if the name is taken.
    pub async fn add_institution(&self, name: &str) -> Result<i64> {
        if self.catalog.institution_id(name).await?.is_some() {
            error!(institution = %name, "Institution already exists");
            return Err(AdminError::InstitutionExists(name.to_string()));
        }
        let id = self.catalog.insert_institution(name).await?;
        info!(institution = %name, "Added institution");
        Ok(id)
    }

    /// Registers a project.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::ProjectExists`] if the name is taken.
    pub async fn add_project(&self, name: &str) -> Result<i64> {
        if self.catalog.project_id(name).await?.is_some() {
            error!(project = %name, "Project already exists");
            return Err(AdminError::ProjectExists(name.to_string()));
        }
        let id = self.catalog.insert_project(name).await?;
        info!(project = %name, "Added project");
        Ok(id)
    }
}
