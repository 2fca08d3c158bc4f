// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/docent/docent.toml`,
//! `$XDG_CONFIG_HOME/docent/docent.toml`, `./docent.toml`, `DOCENT_*` env vars.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DocentConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/docent/docent.toml";
pub(crate) const LOCAL_CONFIG: &str = "docent.toml";

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "assistant",
    "ambient",
    "threads",
    "generation",
    "preferences",
    "delivery",
    "feedback",
    "heuristics",
    "messages",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docent/docent.toml"))
}

/// Loads configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<DocentConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from a TOML string only; no files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<DocentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DocentConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads configuration from a specific file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DocentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DocentConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full Figment before extraction, for callers that want its metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DocentConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `DOCENT_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `DOCENT_AMBIENT_DEFAULT_COOLDOWN_SECS` maps to `ambient.default_cooldown_secs`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("DOCENT_").map(|key| section_key(key.as_str()).into())
}

fn section_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
