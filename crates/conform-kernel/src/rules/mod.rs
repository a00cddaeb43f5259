//! The rule set, registered in report order.
//!
//! Each loading check comes before the checks that read its document:
//! manifest, then CI config, then README.

pub mod ci;
pub mod manifest;
pub mod readme;

use crate::context::CheckContext;
use crate::policy::Policy;
use crate::runner::Runner;
use std::rc::Rc;

pub fn register_all(runner: &mut Runner<CheckContext>, policy: &Policy) {
    let policy = Rc::new(policy.clone());
    manifest::register(runner, &policy);
    ci::register(runner, &policy);
    readme::register(runner, &policy);
}

/// A runner with every rule registered for `policy`.
pub fn runner_for(policy: &Policy) -> Runner<CheckContext> {
    let mut runner = Runner::new();
    register_all(&mut runner, policy);
    log::debug!(
        "registered {} checks for variant {}",
        runner.len(),
        policy.variant
    );
    runner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Variant;

    #[test]
    fn rule_counts_per_variant() {
        assert_eq!(runner_for(&Policy::for_variant(Variant::Browser)).len(), 30);
        assert_eq!(runner_for(&Policy::for_variant(Variant::Main)).len(), 31);
        assert_eq!(runner_for(&Policy::for_variant(Variant::Github)).len(), 31);
    }

    #[test]
    fn loaders_precede_their_readers() {
        let runner = runner_for(&Policy::default());
        let descriptions: Vec<&str> = runner
            .checks()
            .map(|check| check.description.as_str())
            .collect();
        let position = |needle: &str| {
            descriptions
                .iter()
                .position(|text| text.contains(needle))
                .unwrap_or_else(|| panic!("no check mentioning {needle}"))
        };
        assert_eq!(position("package.json should be a valid JSON file"), 0);
        assert!(position(".gitlab-ci.yml should be a valid YAML file") < position("validate build errors"));
        assert!(position("README.md should be a readable") < position("first heading"));
    }
}
