/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::error::Result;

/// Runtime configuration, read from the environment (and an optional `.env` file).
#[derive(Deserialize, Debug, Clone, Getters)]
#[get = "pub"]
pub struct Config {
    #[serde(default = "default_surrealdb_endpoint")]
    surrealdb_endpoint: String,
    surrealdb_username: Option<String>,
    surrealdb_password: Option<String>,
    #[serde(default = "default_surrealdb_namespace")]
    surrealdb_namespace: String,
    #[serde(default = "default_surrealdb_database")]
    surrealdb_database: String,
    #[serde(default = "default_bind_address")]
    bind_address: String,
    /// seconds
    #[serde(default = "default_session_length")]
    session_length: i64,
    #[serde(default = "default_secure_cookies")]
    secure_cookies: bool,
    smtp_host: Option<String>,
    smtp_username: Option<String>,
    smtp_password: Option<String>,
    /// sender address, the smtp username if unset
    smtp_from: Option<String>,
    #[serde(default = "default_mail_locale")]
    mail_locale: String,
    admin_username: Option<String>,
    admin_password: Option<String>,
    /// milliseconds
    #[serde(default = "default_housekeeping_interval")]
    housekeeping_interval: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(envy::from_env::<Config>()?)
    }

    /// Root credentials, only if both parts are present.
    pub fn surrealdb_credentials(&self) -> Option<(&str, &str)> {
        match (&self.surrealdb_username, &self.surrealdb_password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }

    pub fn smtp_credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.smtp_host, &self.smtp_username, &self.smtp_password) {
            (Some(host), Some(username), Some(password)) => {
                Some((host.as_str(), username.as_str(), password.as_str()))
            }
            _ => None,
        }
    }

    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            surrealdb_endpoint: default_surrealdb_endpoint(),
            surrealdb_username: None,
            surrealdb_password: None,
            surrealdb_namespace: default_surrealdb_namespace(),
            surrealdb_database: default_surrealdb_database(),
            bind_address: default_bind_address(),
            session_length: default_session_length(),
            secure_cookies: default_secure_cookies(),
            smtp_host: None,
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
            mail_locale: default_mail_locale(),
            admin_username: None,
            admin_password: None,
            housekeeping_interval: default_housekeeping_interval(),
        }
    }
}

fn default_surrealdb_endpoint() -> String {
    "mem://".to_owned()
}

fn default_surrealdb_namespace() -> String {
    "production".to_owned()
}

fn default_surrealdb_database() -> String {
    "shiftboard".to_owned()
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_owned()
}

// 8h
fn default_session_length() -> i64 {
    28800
}

fn default_secure_cookies() -> bool {
    true
}

fn default_mail_locale() -> String {
    "en".to_owned()
}

fn default_housekeeping_interval() -> u64 {
    60000
}
