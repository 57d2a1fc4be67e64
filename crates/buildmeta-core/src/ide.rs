//! Classification of the client that invoked the build.

use crate::env::EnvSnapshot;
use crate::fact::Fact;
use crate::project::ProjectGraph;
use crate::provider::is_ci;

const ANDROID_INVOKED_FROM_IDE: &str = "android.injected.invoked.from.ide";
const ANDROID_STUDIO_VERSION: &str = "android.injected.studio.version";
const IDEA_VERSION: &str = "idea.version";
const ECLIPSE_BUILD_ID: &str = "eclipse.buildId";

/// Facts naming the invoking IDE, or "Cmd Line" for a local terminal build.
///
/// First match wins. Under CI with no IDE markers nothing is emitted.
pub fn detect_ide(env: &EnvSnapshot, project: &dyn ProjectGraph) -> Vec<Fact> {
    if project.has_root_property(ANDROID_INVOKED_FROM_IDE) {
        let mut facts = vec![Fact::tag("Android Studio")];
        if let Some(version) = project.root_property(ANDROID_STUDIO_VERSION) {
            facts.push(Fact::value("Android Studio version", version));
        }
        facts
    } else if env.property(IDEA_VERSION).is_some()
        || env.property_keys_with_prefix(IDEA_VERSION).next().is_some()
    {
        vec![Fact::tag("IntelliJ IDEA")]
    } else if env.property(ECLIPSE_BUILD_ID).is_some() {
        vec![Fact::tag("Eclipse")]
    } else if !is_ci(env) {
        vec![Fact::tag("Cmd Line")]
    } else {
        Vec::new()
    }
}
