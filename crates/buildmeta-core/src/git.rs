//! Git metadata: commit, branch, working-tree status and a source-browse link.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::fact::Fact;
use crate::obs;
use crate::process::CommandRunner;
use crate::search::value_with_search_link;

/// Repository state gathered in one collection pass. Every field is optional;
/// a failed step leaves only its own field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitState {
    /// Abbreviated (8 character) `HEAD` commit id.
    pub commit_id: Option<String>,
    /// Abbreviated ref name; `HEAD` when detached.
    pub branch: Option<String>,
    /// `git status --porcelain` output; absent when the tree is clean.
    pub status: Option<String>,
    /// `remote.origin.url`, only looked up when a commit id is known.
    pub origin_url: Option<String>,
}

/// A code host recognisable from an origin URL.
#[derive(Debug)]
pub struct HostPattern {
    pub name: &'static str,
    markers: [&'static str; 2],
    regex: Regex,
    label: &'static str,
    base: &'static str,
    commit_path: &'static str,
}

impl HostPattern {
    fn new(
        name: &'static str,
        host: &'static str,
        markers: [&'static str; 2],
        label: &'static str,
        commit_path: &'static str,
    ) -> Self {
        let regex = Regex::new(&format!("^(.*){}[/:](.*)$", regex::escape(host)))
            .expect("host pattern is a valid regex");
        Self {
            name,
            markers,
            regex,
            label,
            base: host,
            commit_path,
        }
    }

    /// Whether `origin_url` names this host at all.
    pub fn applies_to(&self, origin_url: &str) -> bool {
        self.markers.iter().any(|m| origin_url.contains(m))
    }

    /// Repository path from `host/path` or `host:path`, without `.git`.
    pub fn repo_path<'a>(&self, origin_url: &'a str) -> Option<&'a str> {
        let caps = self.regex.captures(origin_url)?;
        let raw = caps.get(2)?.as_str();
        Some(raw.strip_suffix(".git").unwrap_or(raw))
    }

    /// Browse link for `commit_id` in the repository named by `origin_url`.
    pub fn browse_link(&self, origin_url: &str, commit_id: &str) -> Option<Fact> {
        let path = self.repo_path(origin_url)?;
        Some(Fact::link(
            self.label,
            format!("https://{}/{}/{}/{}", self.base, path, self.commit_path, commit_id),
        ))
    }
}

/// Known hosts, in matching order.
pub static HOST_PATTERNS: Lazy<[HostPattern; 2]> = Lazy::new(|| {
    [
        HostPattern::new(
            "github",
            "github.com",
            ["github.com/", "github.com:"],
            "Github source",
            "tree",
        ),
        HostPattern::new(
            "gitlab",
            "gitlab.com",
            ["gitlab.com/", "gitlab.com:"],
            "GitLab Source",
            "-/commit",
        ),
    ]
});

/// Browse link from the first host pattern the URL names.
///
/// The first host whose marker appears decides; if its regex then fails the
/// URL gets no link.
pub fn source_link(origin_url: &str, commit_id: &str) -> Option<Fact> {
    let pattern = HOST_PATTERNS.iter().find(|p| p.applies_to(origin_url))?;
    obs::emit_git_host_matched(pattern.name);
    pattern.browse_link(origin_url, commit_id)
}

/// Facts for a collected [`GitState`].
pub fn git_facts(state: &GitState, server: Option<&str>) -> Vec<Fact> {
    let mut facts = Vec::new();

    if let Some(commit_id) = &state.commit_id {
        facts.extend(value_with_search_link(server, "Git commit id", commit_id));
        if let Some(link) = state
            .origin_url
            .as_deref()
            .and_then(|url| source_link(url, commit_id))
        {
            facts.push(link);
        }
    }

    if let Some(branch) = &state.branch {
        facts.push(Fact::tag(branch.as_str()));
        facts.push(Fact::value("Git branch", branch.as_str()));
    }

    if let Some(status) = &state.status {
        facts.push(Fact::tag("Dirty"));
        facts.push(Fact::value("Git status", status.as_str()));
    }

    facts
}

/// Collects [`GitState`] through a [`CommandRunner`].
#[derive(Clone)]
pub struct GitCollector {
    runner: Arc<dyn CommandRunner>,
    git: String,
}

impl GitCollector {
    pub fn new(runner: Arc<dyn CommandRunner>, git: impl Into<String>) -> Self {
        Self {
            runner,
            git: git.into(),
        }
    }

    /// Probe the git executable with `git --version`.
    pub async fn is_installed(&self) -> bool {
        self.runner.succeeds(&self.git, &["--version"]).await
    }

    async fn step(&self, name: &'static str, args: &[&str]) -> Option<String> {
        let out = self
            .runner
            .stdout(&self.git, args)
            .await
            .filter(|s| !s.is_empty());
        if out.is_none() {
            obs::emit_git_step_skipped(name);
        }
        out
    }

    /// Run one collection pass. Returns `None` when git is not available.
    pub async fn collect(&self) -> Option<GitState> {
        if !self.is_installed().await {
            obs::emit_git_step_skipped("probe");
            return None;
        }

        let commit_id = self
            .step("commit_id", &["rev-parse", "--short=8", "--verify", "HEAD"])
            .await;
        let branch = self.step("branch", &["rev-parse", "--abbrev-ref", "HEAD"]).await;
        let status = self.step("status", &["status", "--porcelain"]).await;
        let origin_url = if commit_id.is_some() {
            self.step("origin_url", &["config", "--get", "remote.origin.url"])
                .await
        } else {
            None
        };

        Some(GitState {
            commit_id,
            branch,
            status,
            origin_url,
        })
    }

    /// Collect and convert to facts; empty when git is not available.
    pub async fn collect_facts(&self, server: Option<&str>) -> Vec<Fact> {
        match self.collect().await {
            Some(state) => git_facts(&state, server),
            None => Vec::new(),
        }
    }
}
