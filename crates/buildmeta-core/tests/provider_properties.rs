//! Property-based tests for environment-only enrichment.
//!
//! The immediate-phase fact set must be a pure function of the environment
//! snapshot: for any subset of recognised variables, exactly the facts listed
//! in the table below appear.

use std::collections::BTreeMap;

use buildmeta_core::{
    immediate_facts, is_ci, search_link, source_link, EnricherConfig, EnvSnapshot, Fact,
};
use proptest::prelude::*;

const SERVER: &str = "https://ge.example.com";

enum Kind {
    Link(&'static str),
    Value(&'static str),
    Search(&'static str),
    Tag,
}

struct Row {
    /// Any of these variables enables the row.
    gate: &'static [&'static str],
    var: &'static str,
    kind: Kind,
}

const JENKINS_GATE: &[&str] = &["JENKINS_URL", "HUDSON_URL"];
const CIRCLE_GATE: &[&str] = &["CIRCLE_BUILD_URL"];
const BAMBOO_GATE: &[&str] = &["bamboo_resultsUrl"];
const GITHUB_GATE: &[&str] = &["GITHUB_ACTIONS"];
const GITLAB_GATE: &[&str] = &["GITLAB_CI"];
const TRAVIS_GATE: &[&str] = &["TRAVIS_JOB_ID"];
const BITRISE_GATE: &[&str] = &["BITRISE_BUILD_URL"];

const fn row(gate: &'static [&'static str], var: &'static str, kind: Kind) -> Row {
    Row { gate, var, kind }
}

#[rustfmt::skip]
const ROWS: &[Row] = &[
    row(JENKINS_GATE, "BUILD_NUMBER", Kind::Value("CI build number")),
    row(JENKINS_GATE, "NODE_NAME", Kind::Search("CI node")),
    row(JENKINS_GATE, "JOB_NAME", Kind::Search("CI job")),
    row(JENKINS_GATE, "STAGE_NAME", Kind::Search("CI stage")),
    row(CIRCLE_GATE, "CIRCLE_BUILD_URL", Kind::Link("CircleCI build")),
    row(CIRCLE_GATE, "CIRCLE_BUILD_NUM", Kind::Value("CI build number")),
    row(CIRCLE_GATE, "CIRCLE_JOB", Kind::Search("CI job")),
    row(CIRCLE_GATE, "CIRCLE_WORKFLOW_ID", Kind::Search("CI workflow")),
    row(BAMBOO_GATE, "bamboo_resultsUrl", Kind::Link("Bamboo build")),
    row(BAMBOO_GATE, "bamboo_buildNumber", Kind::Value("CI build number")),
    row(BAMBOO_GATE, "bamboo_planName", Kind::Search("CI plan")),
    row(BAMBOO_GATE, "bamboo_buildPlanName", Kind::Search("CI build plan")),
    row(BAMBOO_GATE, "bamboo_agentId", Kind::Search("CI agent")),
    row(GITHUB_GATE, "GITHUB_WORKFLOW", Kind::Search("GitHub workflow")),
    row(GITLAB_GATE, "CI_JOB_URL", Kind::Link("GitLab build")),
    row(GITLAB_GATE, "CI_PIPELINE_URL", Kind::Link("GitLab pipeline")),
    row(GITLAB_GATE, "CI_JOB_NAME", Kind::Search("CI job")),
    row(GITLAB_GATE, "CI_JOB_STAGE", Kind::Search("CI stage")),
    row(TRAVIS_GATE, "TRAVIS_BUILD_WEB_URL", Kind::Link("Travis build")),
    row(TRAVIS_GATE, "TRAVIS_BUILD_NUMBER", Kind::Value("CI build number")),
    row(TRAVIS_GATE, "TRAVIS_JOB_NAME", Kind::Search("CI job")),
    row(TRAVIS_GATE, "TRAVIS_EVENT_TYPE", Kind::Tag),
    row(BITRISE_GATE, "BITRISE_BUILD_URL", Kind::Link("Bitrise build")),
    row(BITRISE_GATE, "BITRISE_BUILD_NUMBER", Kind::Value("CI build number")),
];

const DETECTION_VARS: &[&str] = &[
    "CI",
    "JENKINS_URL",
    "HUDSON_URL",
    "TEAMCITY_VERSION",
    "CIRCLE_BUILD_URL",
    "bamboo_resultsUrl",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "TRAVIS_JOB_ID",
    "BITRISE_BUILD_URL",
];

const EXTRA_VARS: &[&str] = &[
    "BUILD_URL",
    "GITHUB_REPOSITORY",
    "GITHUB_RUN_ID",
    // TeamCity's build number lives in project properties, never the env.
    "BUILD_VCS_NUMBER",
];

fn recognised_vars() -> Vec<&'static str> {
    let mut vars: Vec<&'static str> = DETECTION_VARS.to_vec();
    vars.extend(EXTRA_VARS);
    for row in ROWS {
        if !vars.contains(&row.var) {
            vars.push(row.var);
        }
    }
    vars
}

fn expected_facts(
    vars: &BTreeMap<&'static str, String>,
    ci_property: bool,
    server: Option<&str>,
) -> Vec<Fact> {
    let has = |name: &str| vars.contains_key(name);
    let mut facts = vec![Fact::tag("Linux")];

    let ci = ci_property || DETECTION_VARS.iter().any(|v| has(*v));
    facts.push(Fact::tag(if ci { "CI" } else { "LOCAL" }));

    if JENKINS_GATE.iter().any(|g| has(*g)) {
        if let Some(url) = vars.get("BUILD_URL") {
            let label = if has("JENKINS_URL") { "Jenkins build" } else { "Hudson build" };
            facts.push(Fact::link(label, url.as_str()));
        }
    }

    if has("GITHUB_ACTIONS") {
        let repo = vars.get("GITHUB_REPOSITORY");
        if let (Some(repo), Some(run)) = (repo, vars.get("GITHUB_RUN_ID")) {
            facts.push(Fact::link(
                "GitHub Actions build",
                format!("https://github.com/{repo}/actions/runs/{run}"),
            ));
        }
    }

    for row in ROWS {
        if !row.gate.iter().any(|g| has(*g)) {
            continue;
        }
        let Some(value) = vars.get(row.var) else {
            continue;
        };
        match row.kind {
            Kind::Link(label) => facts.push(Fact::link(label, value.as_str())),
            Kind::Value(key) => facts.push(Fact::value(key, value.as_str())),
            Kind::Search(label) => {
                facts.push(Fact::value(label, value.as_str()));
                if let Some(server) = server {
                    facts.push(search_link(server, label, value));
                }
            }
            Kind::Tag => facts.push(Fact::tag(value.as_str())),
        }
    }

    facts
}

fn sorted(facts: &[Fact]) -> Vec<String> {
    let mut out: Vec<String> = facts.iter().map(|f| format!("{f:?}")).collect();
    out.sort();
    out
}

fn arb_env() -> impl Strategy<Value = (BTreeMap<&'static str, String>, bool)> {
    let vars = recognised_vars();
    let max = vars.len();
    (
        prop::collection::btree_map(
            prop::sample::select(vars),
            "[a-zA-Z0-9 ./:_-]{0,16}",
            0..max,
        ),
        any::<bool>(),
    )
}

fn snapshot(vars: &BTreeMap<&'static str, String>, ci_property: bool) -> EnvSnapshot {
    let mut builder = EnvSnapshot::builder().property("os.name", "Linux");
    for (k, v) in vars {
        builder = builder.var(*k, v.as_str());
    }
    if ci_property {
        builder = builder.property("CI", "true");
    }
    builder.build()
}

proptest! {
    #[test]
    fn immediate_facts_match_table((vars, ci_property) in arb_env(), with_server in any::<bool>()) {
        let env = snapshot(&vars, ci_property);
        let server = with_server.then_some(SERVER);
        let actual = immediate_facts(&env, server, &EnricherConfig::default());
        let expected = expected_facts(&vars, ci_property, server);
        prop_assert_eq!(sorted(&actual), sorted(&expected));
    }

    #[test]
    fn immediate_facts_are_deterministic((vars, ci_property) in arb_env()) {
        let config = EnricherConfig::default();
        let first = immediate_facts(&snapshot(&vars, ci_property), Some(SERVER), &config);
        let second = immediate_facts(&snapshot(&vars, ci_property), Some(SERVER), &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn ci_tag_agrees_with_detection((vars, ci_property) in arb_env()) {
        let env = snapshot(&vars, ci_property);
        let facts = immediate_facts(&env, None, &EnricherConfig::default());
        let expected = if is_ci(&env) { "CI" } else { "LOCAL" };
        prop_assert!(facts.contains(&Fact::tag(expected)));
    }

    #[test]
    fn search_links_end_with_placeholder((vars, ci_property) in arb_env()) {
        let env = snapshot(&vars, ci_property);
        let facts = immediate_facts(&env, Some(SERVER), &EnricherConfig::default());
        for fact in &facts {
            if let Fact::Link { label, url } = fact {
                if label.ends_with(" build scans") {
                    prop_assert!(url.starts_with("https://ge.example.com/scans?search.names="));
                    prop_assert!(url.ends_with("#selection.buildScanB=%7BSCAN_ID%7D"));
                }
            }
        }
    }

    #[test]
    fn github_origin_forms_agree(
        org in "[a-z][a-z0-9-]{0,10}",
        repo in "[a-z][a-z0-9_.-]{0,10}",
        commit in "[0-9a-f]{8}",
    ) {
        let ssh = source_link(&format!("git@github.com:{org}/{repo}.git"), &commit);
        let https = source_link(&format!("https://github.com/{org}/{repo}.git"), &commit);
        prop_assert_eq!(&ssh, &https);
        let expected_url = format!("https://github.com/{org}/{repo}/tree/{commit}");
        prop_assert_eq!(ssh, Some(Fact::link("Github source", expected_url)));
    }
}
