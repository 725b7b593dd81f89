//! Hosted database access for story cleanup.
//!
//! Every story may own databases on a shared MySQL server. The
//! [`DatabaseGateway`] trait is the narrow interface the delete workflow needs;
//! [`MysqlGateway`] implements it over a single blocking connection that is
//! released when the gateway goes out of scope.

use crate::core::{
    config::{self, ConfigChain},
    error::{Result, StoryError},
};
use mysql::prelude::Queryable;
use mysql::{Conn, Opts, OptsBuilder};
use regex::Regex;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3306;
const DEFAULT_DATABASE: &str = "hosted";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub trait DatabaseGateway {
    /// Every database name visible on the server
    fn list_databases(&mut self) -> Result<Vec<String>>;

    fn drop_database(&mut self, name: &str) -> Result<()>;
}

/// Databases whose name matches `pattern`, in server order
pub fn find_databases(gateway: &mut dyn DatabaseGateway, pattern: &Regex) -> Result<Vec<String>> {
    Ok(gateway
        .list_databases()?
        .into_iter()
        .filter(|name| pattern.is_match(name))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedDbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub database: String,
}

impl HostedDbSettings {
    /// `None` when no database host is configured
    pub fn from_config(config: &ConfigChain) -> Result<Option<Self>> {
        let Some(host) = config.lookup(config::HOSTED_DB_HOST) else {
            return Ok(None);
        };

        let port = match config.lookup_i64(config::HOSTED_DB_PORT) {
            Some(port) => u16::try_from(port).map_err(|_| {
                StoryError::config_invalid(config::HOSTED_DB_PORT, port.to_string())
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Some(Self {
            host,
            port,
            user: config.lookup(config::HOSTED_DB_USER).unwrap_or_default(),
            pass: config.lookup(config::HOSTED_DB_PASS).unwrap_or_default(),
            database: config.lookup_or(config::HOSTED_DB_NAME, DEFAULT_DATABASE),
        }))
    }
}

pub struct MysqlGateway {
    conn: Conn,
    host: String,
}

impl MysqlGateway {
    pub fn connect(settings: &HostedDbSettings) -> Result<Self> {
        log::debug!(
            "Connecting to {}@{}:{}/{}",
            settings.user,
            settings.host,
            settings.port,
            settings.database
        );
        let conn = Conn::new(connect_opts(settings))?;
        Ok(Self {
            conn,
            host: settings.host.clone(),
        })
    }
}

impl DatabaseGateway for MysqlGateway {
    fn list_databases(&mut self) -> Result<Vec<String>> {
        Ok(self.conn.query::<String, _>("SHOW DATABASES")?)
    }

    fn drop_database(&mut self, name: &str) -> Result<()> {
        self.conn.query_drop(drop_statement(name))?;
        Ok(())
    }
}

impl Drop for MysqlGateway {
    fn drop(&mut self) {
        log::debug!("Closing database connection to {}", self.host);
    }
}

fn connect_opts(settings: &HostedDbSettings) -> Opts {
    let builder = OptsBuilder::new()
        .ip_or_hostname(Some(settings.host.clone()))
        .tcp_port(settings.port)
        .tcp_connect_timeout(Some(CONNECT_TIMEOUT))
        .user(Some(settings.user.clone()))
        .pass(Some(settings.pass.clone()))
        .db_name(Some(settings.database.clone()));
    Opts::from(builder)
}

fn drop_statement(name: &str) -> String {
    format!("DROP DATABASE `{}`", name.replace('`', "``"))
}
