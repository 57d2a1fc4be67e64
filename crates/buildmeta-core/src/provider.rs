//! CI provider signatures and detection.

use serde::Serialize;

use crate::env::EnvSnapshot;

/// A CI system recognisable from the environment.
///
/// Signatures overlap: a vendor CI usually also sets `CI`, so both
/// [`CiProvider::GenericCi`] and the vendor match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CiProvider {
    GenericCi,
    Jenkins,
    Hudson,
    TeamCity,
    CircleCi,
    Bamboo,
    GitHubActions,
    GitLab,
    Travis,
    Bitrise,
}

impl CiProvider {
    /// Every provider, in evaluation order.
    pub const ALL: [CiProvider; 10] = [
        CiProvider::GenericCi,
        CiProvider::Jenkins,
        CiProvider::Hudson,
        CiProvider::TeamCity,
        CiProvider::CircleCi,
        CiProvider::Bamboo,
        CiProvider::GitHubActions,
        CiProvider::GitLab,
        CiProvider::Travis,
        CiProvider::Bitrise,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CiProvider::GenericCi => "generic_ci",
            CiProvider::Jenkins => "jenkins",
            CiProvider::Hudson => "hudson",
            CiProvider::TeamCity => "teamcity",
            CiProvider::CircleCi => "circleci",
            CiProvider::Bamboo => "bamboo",
            CiProvider::GitHubActions => "github_actions",
            CiProvider::GitLab => "gitlab",
            CiProvider::Travis => "travis",
            CiProvider::Bitrise => "bitrise",
        }
    }

    /// Whether this provider's signature matches `env`.
    pub fn detect(&self, env: &EnvSnapshot) -> bool {
        match self {
            CiProvider::GenericCi => env.has_var("CI") || env.property("CI").is_some(),
            CiProvider::Jenkins => env.has_var("JENKINS_URL"),
            CiProvider::Hudson => env.has_var("HUDSON_URL"),
            CiProvider::TeamCity => env.has_var("TEAMCITY_VERSION"),
            CiProvider::CircleCi => env.has_var("CIRCLE_BUILD_URL"),
            CiProvider::Bamboo => env.has_var("bamboo_resultsUrl"),
            CiProvider::GitHubActions => env.has_var("GITHUB_ACTIONS"),
            CiProvider::GitLab => env.has_var("GITLAB_CI"),
            CiProvider::Travis => env.has_var("TRAVIS_JOB_ID"),
            CiProvider::Bitrise => env.has_var("BITRISE_BUILD_URL"),
        }
    }
}

impl std::fmt::Display for CiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// All providers whose signature matches, in evaluation order.
pub fn detect_all(env: &EnvSnapshot) -> Vec<CiProvider> {
    CiProvider::ALL
        .into_iter()
        .filter(|p| p.detect(env))
        .collect()
}

/// True when any provider, the generic one included, matches.
pub fn is_ci(env: &EnvSnapshot) -> bool {
    CiProvider::ALL.iter().any(|p| p.detect(env))
}
