//! Environment-only CI metadata extraction.
//!
//! Each provider is a table of [`Rule`]s mapping a recognised variable to a
//! fact. TeamCity is not here: it reads project properties and runs once the
//! project graph is ready (see [`crate::teamcity`]).

use crate::env::EnvSnapshot;
use crate::fact::Fact;
use crate::provider::CiProvider;
use crate::search::value_with_search_link;

pub const CI_BUILD_NUMBER: &str = "CI build number";

/// How one environment variable turns into facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Variable holds a URL, emitted as a link with this label.
    Link { var: &'static str, label: &'static str },
    /// Plain custom value.
    Value { var: &'static str, key: &'static str },
    /// Custom value plus a search link.
    Searchable { var: &'static str, label: &'static str },
    /// Variable value becomes a bare tag.
    Tag { var: &'static str },
}

impl Rule {
    fn apply(&self, env: &EnvSnapshot, server: Option<&str>, facts: &mut Vec<Fact>) {
        match *self {
            Rule::Link { var, label } => {
                if let Some(url) = env.var(var) {
                    facts.push(Fact::link(label, url));
                }
            }
            Rule::Value { var, key } => {
                if let Some(value) = env.var(var) {
                    facts.push(Fact::value(key, value));
                }
            }
            Rule::Searchable { var, label } => {
                if let Some(value) = env.var(var) {
                    facts.extend(value_with_search_link(server, label, value));
                }
            }
            Rule::Tag { var } => {
                if let Some(value) = env.var(var) {
                    facts.push(Fact::tag(value));
                }
            }
        }
    }
}

#[rustfmt::skip]
const JENKINS: &[Rule] = &[
    Rule::Value { var: "BUILD_NUMBER", key: CI_BUILD_NUMBER },
    Rule::Searchable { var: "NODE_NAME", label: "CI node" },
    Rule::Searchable { var: "JOB_NAME", label: "CI job" },
    Rule::Searchable { var: "STAGE_NAME", label: "CI stage" },
];

#[rustfmt::skip]
const CIRCLE_CI: &[Rule] = &[
    Rule::Link { var: "CIRCLE_BUILD_URL", label: "CircleCI build" },
    Rule::Value { var: "CIRCLE_BUILD_NUM", key: CI_BUILD_NUMBER },
    Rule::Searchable { var: "CIRCLE_JOB", label: "CI job" },
    Rule::Searchable { var: "CIRCLE_WORKFLOW_ID", label: "CI workflow" },
];

#[rustfmt::skip]
const BAMBOO: &[Rule] = &[
    Rule::Link { var: "bamboo_resultsUrl", label: "Bamboo build" },
    Rule::Value { var: "bamboo_buildNumber", key: CI_BUILD_NUMBER },
    Rule::Searchable { var: "bamboo_planName", label: "CI plan" },
    Rule::Searchable { var: "bamboo_buildPlanName", label: "CI build plan" },
    Rule::Searchable { var: "bamboo_agentId", label: "CI agent" },
];

#[rustfmt::skip]
const GITHUB_ACTIONS: &[Rule] = &[
    Rule::Searchable { var: "GITHUB_WORKFLOW", label: "GitHub workflow" },
];

#[rustfmt::skip]
const GITLAB: &[Rule] = &[
    Rule::Link { var: "CI_JOB_URL", label: "GitLab build" },
    Rule::Link { var: "CI_PIPELINE_URL", label: "GitLab pipeline" },
    Rule::Searchable { var: "CI_JOB_NAME", label: "CI job" },
    Rule::Searchable { var: "CI_JOB_STAGE", label: "CI stage" },
];

#[rustfmt::skip]
const TRAVIS: &[Rule] = &[
    Rule::Link { var: "TRAVIS_BUILD_WEB_URL", label: "Travis build" },
    Rule::Value { var: "TRAVIS_BUILD_NUMBER", key: CI_BUILD_NUMBER },
    Rule::Searchable { var: "TRAVIS_JOB_NAME", label: "CI job" },
    Rule::Tag { var: "TRAVIS_EVENT_TYPE" },
];

#[rustfmt::skip]
const BITRISE: &[Rule] = &[
    Rule::Link { var: "BITRISE_BUILD_URL", label: "Bitrise build" },
    Rule::Value { var: "BITRISE_BUILD_NUMBER", key: CI_BUILD_NUMBER },
];

fn apply_all(rules: &[Rule], env: &EnvSnapshot, server: Option<&str>, facts: &mut Vec<Fact>) {
    for rule in rules {
        rule.apply(env, server, facts);
    }
}

/// Facts for every detected provider that only needs the environment.
///
/// Providers are evaluated independently; a build under GitHub Actions with
/// `CI=true` gets the full GitHub Actions fact set.
pub fn extract_ci_metadata(env: &EnvSnapshot, server: Option<&str>) -> Vec<Fact> {
    let mut facts = Vec::new();

    let jenkins = CiProvider::Jenkins.detect(env);
    if jenkins || CiProvider::Hudson.detect(env) {
        if let Some(url) = env.var("BUILD_URL") {
            let label = if jenkins { "Jenkins build" } else { "Hudson build" };
            facts.push(Fact::link(label, url));
        }
        apply_all(JENKINS, env, server, &mut facts);
    }

    if CiProvider::CircleCi.detect(env) {
        apply_all(CIRCLE_CI, env, server, &mut facts);
    }

    if CiProvider::Bamboo.detect(env) {
        apply_all(BAMBOO, env, server, &mut facts);
    }

    if CiProvider::GitHubActions.detect(env) {
        if let (Some(repository), Some(run_id)) =
            (env.var("GITHUB_REPOSITORY"), env.var("GITHUB_RUN_ID"))
        {
            facts.push(Fact::link(
                "GitHub Actions build",
                format!("https://github.com/{repository}/actions/runs/{run_id}"),
            ));
        }
        apply_all(GITHUB_ACTIONS, env, server, &mut facts);
    }

    if CiProvider::GitLab.detect(env) {
        apply_all(GITLAB, env, server, &mut facts);
    }

    if CiProvider::Travis.detect(env) {
        apply_all(TRAVIS, env, server, &mut facts);
    }

    if CiProvider::Bitrise.detect(env) {
        apply_all(BITRISE, env, server, &mut facts);
    }

    facts
}
