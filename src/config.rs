//! Configuration: typed defaults (`Config::default_config`) merged with an
//! optional `-f <file>` INI file, merged again with CLI flags (CLI wins).
//! Mirrors `examples/original_source/linkcheck/configuration/__init__.py`'s
//! key set and defaults.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use crate::cli::Args;
use crate::error::{Res, ResExt};

#[derive(Debug, Clone)]
pub(crate) struct AuthEntry {
    pub(crate) user: String,
    pub(crate) password: Option<String>,
    pub(crate) pattern: Regex,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) allowed_schemes: Vec<String>,
    pub(crate) cookie_file: Option<String>,
    pub(crate) robotstxt: bool,
    pub(crate) max_file_size_parse: u64,
    pub(crate) max_file_size_download: u64,
    pub(crate) max_run_seconds: Option<u64>,
    pub(crate) max_requests_per_second: f64,
    pub(crate) max_http_redirects: u32,
    pub(crate) nntp_server: Option<String>,
    pub(crate) ssl_verify: bool,
    pub(crate) threads: i32,
    pub(crate) timeout: u64,
    pub(crate) abort_timeout: u64,
    pub(crate) recursion_level: i32,
    pub(crate) user_agent: String,
    pub(crate) result_cache_size: usize,
    pub(crate) anchor_cache_size: usize,

    pub(crate) authentication: Vec<AuthEntry>,
    pub(crate) login_url: Option<String>,
    pub(crate) login_user_field: String,
    pub(crate) login_password_field: String,
    pub(crate) login_extra_fields: HashMap<String, String>,

    pub(crate) extern_links: Vec<Regex>,
    pub(crate) ignore_errors: Vec<Regex>,
    pub(crate) ignore_warnings: Vec<String>,
    pub(crate) intern_links: Vec<Regex>,
    pub(crate) check_extern: bool,
    pub(crate) no_follow_url: Vec<Regex>,

    pub(crate) enabled_plugins: Vec<String>,

    pub(crate) quiet: bool,
    pub(crate) verbose: bool,
    pub(crate) warnings: bool,
    pub(crate) status: bool,
    pub(crate) status_wait_seconds: u64,
    pub(crate) output: String,
    pub(crate) file_output: Vec<String>,

    pub(crate) user: Option<String>,
    pub(crate) password: Option<String>,

    pub(crate) failures_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            allowed_schemes: Vec::new(),
            cookie_file: None,
            robotstxt: true,
            max_file_size_parse: 1024 * 1024,
            max_file_size_download: 5 * 1024 * 1024,
            max_run_seconds: None,
            max_requests_per_second: 10.0,
            max_http_redirects: 10,
            nntp_server: std::env::var("NNTP_SERVER").ok(),
            ssl_verify: true,
            threads: 10,
            timeout: 60,
            abort_timeout: 300,
            recursion_level: -1,
            user_agent: format!("linkchecker/{}", env!("CARGO_PKG_VERSION")),
            result_cache_size: 100_000,
            anchor_cache_size: 100_000,
            authentication: Vec::new(),
            login_url: None,
            login_user_field: "login".to_string(),
            login_password_field: "password".to_string(),
            login_extra_fields: HashMap::new(),
            extern_links: Vec::new(),
            ignore_errors: Vec::new(),
            ignore_warnings: Vec::new(),
            intern_links: Vec::new(),
            check_extern: false,
            no_follow_url: Vec::new(),
            enabled_plugins: Vec::new(),
            quiet: false,
            verbose: false,
            warnings: true,
            status: true,
            status_wait_seconds: 5,
            output: "text".to_string(),
            file_output: Vec::new(),
            user: None,
            password: None,
            failures_file: None,
        }
    }
}

/// Hand-rolled INI reader: `[section]` headers, `key = value` lines,
/// `;`/`#` comments. No external ini crate, mirroring the teacher's
/// preference for small hand-rolled parsers over a dependency for a job
/// this narrow.
fn parse_ini(text: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current = String::from("");
    sections.insert(current.clone(), HashMap::new());

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len() - 1].trim().to_lowercase();
            sections.entry(current.clone()).or_default();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            sections
                .entry(current.clone())
                .or_default()
                .insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }
    sections
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_regex_list(s: &str) -> Vec<Regex> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| Regex::new(s).ok())
        .collect()
}

impl Config {
    pub(crate) fn load(args: &Args) -> Res<Config> {
        let mut config = Config::default();

        if let Some(path) = &args.config_file {
            config.merge_file(path)?;
        }
        config.merge_args(args)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Res<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let sections = parse_ini(&text);

        if let Some(checking) = sections.get("checking") {
            for (key, value) in checking {
                match key.as_str() {
                    "robotstxt" => self.robotstxt = parse_bool(value),
                    "sslverify" => self.ssl_verify = parse_bool(value),
                    "threads" => self.threads = value.parse().unwrap_or(self.threads),
                    "timeout" => self.timeout = value.parse().unwrap_or(self.timeout),
                    "aborttimeout" => self.abort_timeout = value.parse().unwrap_or(self.abort_timeout),
                    "recursionlevel" => {
                        self.recursion_level = value.parse().unwrap_or(self.recursion_level)
                    }
                    "useragent" => self.user_agent = value.clone(),
                    "maxrequestspersecond" => {
                        self.max_requests_per_second =
                            value.parse().unwrap_or(self.max_requests_per_second)
                    }
                    "maxhttpredirects" => {
                        self.max_http_redirects = value.parse().unwrap_or(self.max_http_redirects)
                    }
                    "maxfilesizeparse" => {
                        self.max_file_size_parse = value.parse().unwrap_or(self.max_file_size_parse)
                    }
                    "maxfilesizedownload" => {
                        self.max_file_size_download =
                            value.parse().unwrap_or(self.max_file_size_download)
                    }
                    "maxrunseconds" => self.max_run_seconds = value.parse().ok(),
                    "cookiefile" => self.cookie_file = Some(value.clone()),
                    "resultcachesize" => {
                        self.result_cache_size = value.parse().unwrap_or(self.result_cache_size)
                    }
                    "anchorcachesize" => {
                        self.anchor_cache_size = value.parse().unwrap_or(self.anchor_cache_size)
                    }
                    _ => {
                        return Err(std::io::Error::other(format!(
                            "Unknown key '{}' in [checking] section",
                            key
                        ))
                        .into());
                    }
                }
            }
        }

        if let Some(filtering) = sections.get("filtering") {
            for (key, value) in filtering {
                match key.as_str() {
                    "ignorewarnings" => {
                        self.ignore_warnings =
                            value.split(',').map(|s| s.trim().to_string()).collect()
                    }
                    "ignore" | "ignoreerrors" => self.ignore_errors = parse_regex_list(value),
                    "internlinks" => self.intern_links = parse_regex_list(value),
                    "externlinks" => self.extern_links = parse_regex_list(value),
                    "checkextern" => self.check_extern = parse_bool(value),
                    "nofollow" => self.no_follow_url = parse_regex_list(value),
                    _ => {
                        return Err(std::io::Error::other(format!(
                            "Unknown key '{}' in [filtering] section",
                            key
                        ))
                        .into());
                    }
                }
            }
        }

        if let Some(auth) = sections.get("authentication") {
            for (key, value) in auth {
                if key == "entry" {
                    // user:password:pattern
                    let parts: Vec<&str> = value.splitn(3, ':').collect();
                    if parts.len() == 3 {
                        if let Ok(pattern) = Regex::new(parts[2]) {
                            self.authentication.push(AuthEntry {
                                user: parts[0].to_string(),
                                password: if parts[1].is_empty() {
                                    None
                                } else {
                                    Some(parts[1].to_string())
                                },
                                pattern,
                            });
                        }
                    }
                } else if key == "loginurl" {
                    self.login_url = Some(value.clone());
                } else if key == "loginuserfield" {
                    self.login_user_field = value.clone();
                } else if key == "loginpasswordfield" {
                    self.login_password_field = value.clone();
                } else {
                    return Err(std::io::Error::other(format!(
                        "Unknown key '{}' in [authentication] section",
                        key
                    ))
                    .into());
                }
            }
        }

        if let Some(plugins) = sections.get("plugins") {
            for (key, value) in plugins {
                match key.as_str() {
                    "enabledplugins" => {
                        self.enabled_plugins =
                            value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
                    }
                    _ => {
                        return Err(std::io::Error::other(format!(
                            "Unknown key '{}' in [plugins] section",
                            key
                        ))
                        .into());
                    }
                }
            }
        }

        if let Some(output) = sections.get("output") {
            for (key, value) in output {
                match key.as_str() {
                    "log" => self.output = value.clone(),
                    "verbose" => self.verbose = parse_bool(value),
                    "warnings" => self.warnings = parse_bool(value),
                    "quiet" => self.quiet = parse_bool(value),
                    "status" => self.status = parse_bool(value),
                    _ => {
                        return Err(std::io::Error::other(format!(
                            "Unknown key '{}' in [output] section",
                            key
                        ))
                        .into());
                    }
                }
            }
        }

        Ok(())
    }

    fn merge_args(&mut self, args: &Args) -> Res<()> {
        if let Some(t) = args.threads {
            self.threads = t;
        }
        if let Some(r) = args.recursion_level {
            self.recursion_level = r;
        }
        if let Some(t) = args.timeout {
            self.timeout = t;
        }
        if args.no_robots {
            self.robotstxt = false;
        }
        if args.check_extern {
            self.check_extern = true;
        }
        if let Some(ua) = &args.user_agent {
            self.user_agent = ua.clone();
        }
        if let Some(cf) = &args.cookie_file {
            self.cookie_file = Some(cf.to_string_lossy().to_string());
        }
        for pat in &args.ignore_url {
            if let Ok(re) = Regex::new(pat) {
                self.ignore_errors.push(re);
            }
        }
        for pat in &args.no_follow_url {
            if let Ok(re) = Regex::new(pat) {
                self.no_follow_url.push(re);
            }
        }
        if args.verbose {
            self.verbose = true;
        }
        if args.no_warnings {
            self.warnings = false;
        }
        if args.no_status {
            self.status = false;
        }
        if args.quiet {
            self.output = "none".to_string();
        } else if let Some(o) = &args.output {
            self.output = o.clone();
        }
        self.file_output = args.file_output.clone();
        self.user = args.user.clone();
        if args.password_prompt {
            self.password = rpassword_prompt();
        }
        Ok(())
    }

    /// When the config file/CLI gave no explicit `internlinks`/
    /// `externlinks` patterns, derive "intern" from the seeds' own hosts
    /// (§4.7 step 1 "classify extern/intern against configured
    /// patterns", glossary "Extern link"): anything absolute that isn't
    /// under a seed host is extern, so `--check-extern` has an effect
    /// even on a default, unconfigured run.
    pub(crate) fn derive_intern_from_seeds(&mut self, seeds: &[String]) {
        if !self.intern_links.is_empty() || !self.extern_links.is_empty() {
            return;
        }
        let mut hosts = Vec::new();
        for seed in seeds {
            if let Ok(normalized) = crate::url_norm::normalize(seed, None, None) {
                if let Some(host) = normalized.parts.host {
                    if !hosts.contains(&host) {
                        hosts.push(host);
                    }
                }
            }
        }
        if hosts.is_empty() {
            return;
        }

        // Every absolute URL is a candidate extern link...
        if let Ok(re) = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://") {
            self.extern_links.push(re);
        }
        // ...unless it sits under one of the seeds' own hosts.
        for host in hosts {
            let pattern = format!(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://(www\.)?{}(:[0-9]+)?(/|$|\?|#)", regex::escape(&host));
            if let Ok(re) = Regex::new(&pattern) {
                self.intern_links.push(re);
            }
        }
    }

    /// First matching `(user, pattern)` entry wins; §6 "the first
    /// matching entry wins".
    pub(crate) fn user_password_for(&self, url: &str) -> (Option<String>, Option<String>) {
        for entry in &self.authentication {
            if entry.pattern.is_match(url) {
                return (Some(entry.user.clone()), entry.password.clone());
            }
        }
        (self.user.clone(), self.password.clone())
    }
}

/// Minimal tty password prompt; no extra crate, matching the teacher's
/// preference not to add a dependency for a one-line job.
fn rpassword_prompt() -> Option<String> {
    use std::io::Write;
    eprint!("Password: ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok()?;
    Some(line.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_intern_covers_seed_host_but_not_other_hosts() {
        let mut config = Config::default();
        config.derive_intern_from_seeds(&["http://example.com/a".to_string()]);

        let is_extern = |url: &str, config: &Config| {
            let matches_extern = config.extern_links.iter().any(|re| re.is_match(url));
            let matches_intern = config.intern_links.iter().any(|re| re.is_match(url));
            matches_extern && !matches_intern
        };

        assert!(!is_extern("http://example.com/b", &config));
        assert!(is_extern("http://other.org/b", &config));
    }

    #[test]
    fn explicit_internlinks_is_not_overridden_by_seed_derivation() {
        let mut config = Config::default();
        config.intern_links = parse_regex_list("example\\.com");
        config.derive_intern_from_seeds(&["http://unrelated.test/".to_string()]);
        // derive_intern_from_seeds must be a no-op once internlinks is set explicitly.
        assert_eq!(config.intern_links.len(), 1);
        assert!(config.extern_links.is_empty());
    }
}
