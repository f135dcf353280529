//! Resource-compatibility check for candidate configurations.

use std::collections::BTreeMap;

use orderer_configtx::Bundle;
use orderer_types::{policy_names, Policy};

use crate::config::CapabilitiesConfig;
use crate::error::ResourceError;

/// Check that `bundle` can be run by this orderer and is internally consistent.
///
/// Every channel and orderer capability must be supported. Each channel-level
/// implicit-meta policy must find its sub-policy in every child group, and the
/// orderer group must define the block validation policy.
pub fn check_resources(
    bundle: &Bundle,
    supported: &CapabilitiesConfig,
) -> Result<(), ResourceError> {
    let channel = bundle.channel_config();

    check_capabilities("channel", channel.capabilities.iter(), &supported.channel)?;
    check_capabilities(
        "orderer",
        bundle.shared_config().capabilities().iter(),
        &supported.orderer,
    )?;

    let mut children: Vec<(&str, &BTreeMap<String, Policy>)> =
        vec![("Orderer", &channel.orderer.policies)];
    if let Some(application) = bundle.application_config() {
        children.push(("Application", &application.policies));
    }

    for (name, policy) in &channel.policies {
        let Policy::ImplicitMeta { sub_policy, .. } = policy else {
            continue;
        };
        if let Some((group, _)) = children
            .iter()
            .find(|(_, policies)| !policies.contains_key(sub_policy))
        {
            return Err(ResourceError::MissingSubPolicy {
                policy: name.clone(),
                sub_policy: sub_policy.clone(),
                group: (*group).to_string(),
            });
        }
    }

    if !channel
        .orderer
        .policies
        .contains_key(policy_names::BLOCK_VALIDATION)
    {
        return Err(ResourceError::MissingOrdererPolicy(
            policy_names::BLOCK_VALIDATION.to_string(),
        ));
    }

    Ok(())
}

fn check_capabilities<'a>(
    scope: &'static str,
    required: impl Iterator<Item = &'a String>,
    supported: &[String],
) -> Result<(), ResourceError> {
    for name in required {
        if !supported.contains(name) {
            return Err(ResourceError::UnsupportedCapability {
                scope,
                name: name.clone(),
            });
        }
    }
    Ok(())
}
