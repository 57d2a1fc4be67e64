//! TeamCity metadata.
//!
//! TeamCity exposes its build through project properties rather than the
//! environment, and the server URL only through the agent's configuration
//! properties file, so extraction waits for the project graph.

use std::path::Path;

use crate::extract::CI_BUILD_NUMBER;
use crate::fact::Fact;
use crate::obs;
use crate::project::ProjectGraph;
use crate::properties::read_properties_file;
use crate::search::{append_if_missing, value_with_search_link};

const CONFIGURATION_PROPERTIES_FILE: &str = "teamcity.configuration.properties.file";
const BUILD_NUMBER: &str = "build.number";
const BUILD_TYPE_ID: &str = "teamcity.buildType.id";
const AGENT_NAME: &str = "agent.name";
const SERVER_URL: &str = "teamcity.serverUrl";

/// Facts for a TeamCity build.
pub fn extract_teamcity(project: &dyn ProjectGraph, server: Option<&str>) -> Vec<Fact> {
    let config_file = project.root_property(CONFIGURATION_PROPERTIES_FILE);
    let build_number = project.root_property(BUILD_NUMBER);
    let build_type_id = project.root_property(BUILD_TYPE_ID);
    let agent_name = project.root_property(AGENT_NAME);

    let mut facts = Vec::new();

    if let (Some(config_file), Some(build_number), Some(build_type_id)) =
        (&config_file, &build_number, &build_type_id)
    {
        if let Some(server_url) = server_url(Path::new(config_file)) {
            let url = format!(
                "{}viewLog.html?buildNumber={}&buildTypeId={}",
                append_if_missing(&server_url, "/"),
                build_number,
                build_type_id
            );
            facts.push(Fact::link("TeamCity build", url));
        }
    }

    if let Some(build_number) = build_number {
        facts.push(Fact::value(CI_BUILD_NUMBER, build_number));
    }

    if let Some(agent_name) = agent_name {
        facts.extend(value_with_search_link(server, "CI agent", &agent_name));
    }

    facts
}

fn server_url(config_file: &Path) -> Option<String> {
    match read_properties_file(config_file) {
        Ok(mut props) => props.remove(SERVER_URL),
        Err(e) => {
            obs::emit_input_unreadable(CONFIGURATION_PROPERTIES_FILE, &e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::StaticProject;

    fn config_file(dir: &Path, contents: &str) -> String {
        let path = dir.join("teamcity.config.properties");
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_full_teamcity_build() {
        let dir = tempfile::tempdir().unwrap();
        let file = config_file(dir.path(), "teamcity.serverUrl=https\\://tc.example.com\n");
        let project = StaticProject::new()
            .with_property(CONFIGURATION_PROPERTIES_FILE, file)
            .with_property(BUILD_NUMBER, "117")
            .with_property(BUILD_TYPE_ID, "App_Build")
            .with_property(AGENT_NAME, "agent-3");

        let facts = extract_teamcity(&project, None);
        assert_eq!(
            facts,
            vec![
                Fact::link(
                    "TeamCity build",
                    "https://tc.example.com/viewLog.html?buildNumber=117&buildTypeId=App_Build"
                ),
                Fact::value(CI_BUILD_NUMBER, "117"),
                Fact::value("CI agent", "agent-3"),
            ]
        );
    }

    #[test]
    fn test_no_link_without_server_url() {
        let dir = tempfile::tempdir().unwrap();
        let file = config_file(dir.path(), "teamcity.agent.name=x\n");
        let project = StaticProject::new()
            .with_property(CONFIGURATION_PROPERTIES_FILE, file)
            .with_property(BUILD_NUMBER, "1")
            .with_property(BUILD_TYPE_ID, "T");
        assert_eq!(
            extract_teamcity(&project, None),
            vec![Fact::value(CI_BUILD_NUMBER, "1")]
        );
    }

    #[test]
    fn test_no_link_without_build_type() {
        let dir = tempfile::tempdir().unwrap();
        let file = config_file(dir.path(), "teamcity.serverUrl=https\\://tc\n");
        let project = StaticProject::new()
            .with_property(CONFIGURATION_PROPERTIES_FILE, file)
            .with_property(BUILD_NUMBER, "1");
        assert_eq!(
            extract_teamcity(&project, None),
            vec![Fact::value(CI_BUILD_NUMBER, "1")]
        );
    }

    #[test]
    fn test_unreadable_file_is_absent() {
        let project = StaticProject::new()
            .with_property(CONFIGURATION_PROPERTIES_FILE, "/nonexistent/teamcity.properties")
            .with_property(BUILD_NUMBER, "1")
            .with_property(BUILD_TYPE_ID, "T")
            .with_property(AGENT_NAME, "a");
        let facts = extract_teamcity(&project, Some("https://ge"));
        assert_eq!(facts[0], Fact::value(CI_BUILD_NUMBER, "1"));
        assert_eq!(facts[1], Fact::value("CI agent", "a"));
        assert!(matches!(&facts[2], Fact::Link { label, .. } if label == "CI agent build scans"));
        assert_eq!(facts.len(), 3);
    }

    #[test]
    fn test_nothing_without_properties() {
        assert!(extract_teamcity(&StaticProject::new(), Some("https://ge")).is_empty());
    }
}
