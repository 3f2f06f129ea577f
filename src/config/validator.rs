//! Definition validation: identifiers, uniqueness and referential integrity.

use crate::config::ModelDefinition;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"))
}

fn route_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(/[A-Za-z0-9_\-]+)+$").expect("static pattern"))
}

/// Paths served by the common routes.
pub const RESERVED_ROUTES: &[&str] = &["/health", "/ready", "/version"];

pub fn is_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

fn check_identifier(s: &str) -> Result<(), ConfigError> {
    if is_identifier(s) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(s.to_string()))
    }
}

pub fn validate(definitions: &[ModelDefinition]) -> Result<(), ConfigError> {
    let names: HashSet<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut routes = HashSet::new();

    for def in definitions {
        check_identifier(&def.name)?;
        if let Some(table) = &def.table {
            check_identifier(table)?;
        }
        if let Some(schema) = &def.schema {
            check_identifier(schema)?;
        }
        if !seen.insert(def.name.as_str()) {
            return Err(ConfigError::DuplicateResource(def.name.clone()));
        }
        let route = def.route_url();
        if !route_re().is_match(&route) {
            return Err(ConfigError::InvalidIdentifier(route));
        }
        if RESERVED_ROUTES.contains(&route.as_str()) || !routes.insert(route.clone()) {
            return Err(ConfigError::DuplicateRoute(route));
        }

        for field in &def.fields {
            check_identifier(&field.name)?;
            if let Some(target) = &field.references {
                if !names.contains(target.as_str()) {
                    return Err(ConfigError::MissingReference {
                        kind: "resource",
                        id: target.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}
