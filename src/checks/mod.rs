pub mod diy;
pub mod provenance;
pub mod vulnerability;

use crate::check::CheckFactories;
use crate::config::EngineConfig;

pub use diy::DiyCheck;
pub use provenance::ProvenanceCheck;
pub use vulnerability::VulnerabilityCheck;

/// Register the built-in checks.
///
/// Names already present in `registry` keep their existing factory.
pub fn register_default_checks(registry: &mut CheckFactories, config: &EngineConfig) {
    registry.register(diy::NAME, || Box::new(DiyCheck::new()));
    registry.register(provenance::NAME, || Box::new(ProvenanceCheck::new()));

    let fail_on = config.fail_on;
    registry.register(vulnerability::NAME, move || {
        Box::new(VulnerabilityCheck::new(fail_on))
    });
}

/// Registry holding only the built-in checks, for top-level wiring
pub fn default_registry(config: &EngineConfig) -> CheckFactories {
    let mut registry = CheckFactories::new();
    register_default_checks(&mut registry, config);
    registry
}
