//! `occi/infrastructure` — Compute, Network, Storage and their links.
//!
//! Kinds: `compute`, `network`, `storage` (resources), `networkinterface`,
//! `storagelink` (links). Mixins: `ipnetwork`, `ipnetworkinterface`,
//! `os_tpl`, `resource_tpl`, `user_data`, `ssh_key`. Actions live under the
//! per-kind `.../<kind>/action#` schemes.
//!
//! **State attributes** are required and immutable; they default to the
//! kind's idle state so freshly built instances validate.

use super::core::{LINK, RESOURCE};
use crate::attribute::AttributeDefinition;
use crate::category::{Action, Category, Kind, Mixin};

/// Scheme of the infrastructure kinds and mixins.
pub const SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure#";

/// `infrastructure#compute`.
pub const COMPUTE: &str = "http://schemas.ogf.org/occi/infrastructure#compute";
/// `infrastructure#network`.
pub const NETWORK: &str = "http://schemas.ogf.org/occi/infrastructure#network";
/// `infrastructure#storage`.
pub const STORAGE: &str = "http://schemas.ogf.org/occi/infrastructure#storage";
/// `infrastructure#networkinterface`.
pub const NETWORK_INTERFACE: &str = "http://schemas.ogf.org/occi/infrastructure#networkinterface";
/// `infrastructure#storagelink`.
pub const STORAGE_LINK: &str = "http://schemas.ogf.org/occi/infrastructure#storagelink";

/// `infrastructure/network#ipnetwork`.
pub const IP_NETWORK: &str = "http://schemas.ogf.org/occi/infrastructure/network#ipnetwork";
/// `infrastructure/networkinterface#ipnetworkinterface`.
pub const IP_NETWORK_INTERFACE: &str =
    "http://schemas.ogf.org/occi/infrastructure/networkinterface#ipnetworkinterface";
/// `infrastructure#os_tpl`.
pub const OS_TPL: &str = "http://schemas.ogf.org/occi/infrastructure#os_tpl";
/// `infrastructure#resource_tpl`.
pub const RESOURCE_TPL: &str = "http://schemas.ogf.org/occi/infrastructure#resource_tpl";
/// `infrastructure/compute#user_data`.
pub const USER_DATA: &str = "http://schemas.ogf.org/occi/infrastructure/compute#user_data";
/// `infrastructure/credentials#ssh_key`.
pub const SSH_KEY: &str = "http://schemas.ogf.org/occi/infrastructure/credentials#ssh_key";

/// Action identifiers.
pub mod action {
    /// Scheme of compute actions.
    pub const COMPUTE_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure/compute/action#";
    /// Scheme of network actions.
    pub const NETWORK_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure/network/action#";
    /// Scheme of storage actions.
    pub const STORAGE_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure/storage/action#";

    /// Start a compute instance.
    pub const COMPUTE_START: &str = "http://schemas.ogf.org/occi/infrastructure/compute/action#start";
    /// Stop a compute instance.
    pub const COMPUTE_STOP: &str = "http://schemas.ogf.org/occi/infrastructure/compute/action#stop";
    /// Restart a compute instance.
    pub const COMPUTE_RESTART: &str =
        "http://schemas.ogf.org/occi/infrastructure/compute/action#restart";
    /// Suspend a compute instance.
    pub const COMPUTE_SUSPEND: &str =
        "http://schemas.ogf.org/occi/infrastructure/compute/action#suspend";
    /// Save a compute instance's disk state.
    pub const COMPUTE_SAVE: &str = "http://schemas.ogf.org/occi/infrastructure/compute/action#save";
    /// Bring a network up.
    pub const NETWORK_UP: &str = "http://schemas.ogf.org/occi/infrastructure/network/action#up";
    /// Take a network down.
    pub const NETWORK_DOWN: &str = "http://schemas.ogf.org/occi/infrastructure/network/action#down";
    /// Bring a storage online.
    pub const STORAGE_ONLINE: &str =
        "http://schemas.ogf.org/occi/infrastructure/storage/action#online";
    /// Take a storage offline.
    pub const STORAGE_OFFLINE: &str =
        "http://schemas.ogf.org/occi/infrastructure/storage/action#offline";
    /// Back a storage up.
    pub const STORAGE_BACKUP: &str =
        "http://schemas.ogf.org/occi/infrastructure/storage/action#backup";
    /// Snapshot a storage.
    pub const STORAGE_SNAPSHOT: &str =
        "http://schemas.ogf.org/occi/infrastructure/storage/action#snapshot";
    /// Resize a storage.
    pub const STORAGE_RESIZE: &str =
        "http://schemas.ogf.org/occi/infrastructure/storage/action#resize";
}

/// Returns the infrastructure actions, kinds, and mixins in dependency order.
#[must_use]
pub fn categories() -> Vec<Category> {
    let mut categories = actions();
    categories.extend(kinds());
    categories.extend(mixins());
    categories
}

fn method(pattern: &str, default: &str) -> AttributeDefinition {
    AttributeDefinition::string()
        .with_pattern(pattern)
        .with_default(default)
}

fn state(pattern: &str, default: &str) -> AttributeDefinition {
    AttributeDefinition::string()
        .required()
        .immutable()
        .with_pattern(pattern)
        .with_default(default)
}

fn actions() -> Vec<Category> {
    use action::{COMPUTE_SCHEME, NETWORK_SCHEME, STORAGE_SCHEME};
    vec![
        Action::new(COMPUTE_SCHEME, "start")
            .title("Start compute instance")
            .into(),
        Action::new(COMPUTE_SCHEME, "stop")
            .title("Stop compute instance")
            .attribute("method", method("graceful|acpioff|poweroff", "graceful"))
            .into(),
        Action::new(COMPUTE_SCHEME, "restart")
            .title("Restart compute instance")
            .attribute("method", method("graceful|warm|cold", "graceful"))
            .into(),
        Action::new(COMPUTE_SCHEME, "suspend")
            .title("Suspend compute instance")
            .attribute("method", method("hibernate|suspend", "suspend"))
            .into(),
        Action::new(COMPUTE_SCHEME, "save")
            .title("Save compute instance")
            .attribute("method", method("hot|deferred", "hot"))
            .attribute("name", AttributeDefinition::string())
            .into(),
        Action::new(NETWORK_SCHEME, "up")
            .title("Activate network")
            .into(),
        Action::new(NETWORK_SCHEME, "down")
            .title("Deactivate network")
            .into(),
        Action::new(STORAGE_SCHEME, "online")
            .title("Activate storage")
            .into(),
        Action::new(STORAGE_SCHEME, "offline")
            .title("Deactivate storage")
            .into(),
        Action::new(STORAGE_SCHEME, "backup")
            .title("Backup storage")
            .into(),
        Action::new(STORAGE_SCHEME, "snapshot")
            .title("Snapshot storage")
            .into(),
        Action::new(STORAGE_SCHEME, "resize")
            .title("Resize storage")
            .attribute(
                "size",
                AttributeDefinition::number()
                    .required()
                    .describe("New storage size in GB"),
            )
            .into(),
    ]
}

fn kinds() -> Vec<Category> {
    use action::*;
    vec![
        Kind::new(SCHEME, "compute")
            .title("Compute resource")
            .parent(RESOURCE)
            .location("/compute/")
            .actions(&[
                COMPUTE_START,
                COMPUTE_STOP,
                COMPUTE_RESTART,
                COMPUTE_SUSPEND,
                COMPUTE_SAVE,
            ])
            .attribute(
                "occi.compute.architecture",
                AttributeDefinition::string().with_pattern("x86|x64"),
            )
            .attribute(
                "occi.compute.cores",
                AttributeDefinition::number().describe("Number of virtual CPU cores"),
            )
            .attribute("occi.compute.share", AttributeDefinition::number())
            .attribute("occi.compute.hostname", AttributeDefinition::string())
            .attribute(
                "occi.compute.speed",
                AttributeDefinition::number().describe("CPU clock frequency in GHz"),
            )
            .attribute(
                "occi.compute.memory",
                AttributeDefinition::number().describe("Main memory in GB"),
            )
            .attribute(
                "occi.compute.state",
                state("inactive|active|suspended|error", "inactive"),
            )
            .attribute("occi.compute.state.message", AttributeDefinition::string())
            .into(),
        Kind::new(SCHEME, "network")
            .title("Network resource")
            .parent(RESOURCE)
            .location("/network/")
            .actions(&[NETWORK_UP, NETWORK_DOWN])
            .attribute("occi.network.vlan", AttributeDefinition::number())
            .attribute("occi.network.label", AttributeDefinition::string())
            .attribute("occi.network.state", state("active|inactive|error", "inactive"))
            .attribute("occi.network.state.message", AttributeDefinition::string())
            .into(),
        Kind::new(SCHEME, "storage")
            .title("Storage resource")
            .parent(RESOURCE)
            .location("/storage/")
            .actions(&[
                STORAGE_ONLINE,
                STORAGE_OFFLINE,
                STORAGE_BACKUP,
                STORAGE_SNAPSHOT,
                STORAGE_RESIZE,
            ])
            .attribute(
                "occi.storage.size",
                AttributeDefinition::number()
                    .required()
                    .describe("Storage size in GB"),
            )
            .attribute("occi.storage.state", state("online|offline|error", "offline"))
            .attribute("occi.storage.state.message", AttributeDefinition::string())
            .into(),
        Kind::new(SCHEME, "networkinterface")
            .title("Network interface link")
            .parent(LINK)
            .location("/link/networkinterface/")
            .attribute(
                "occi.networkinterface.interface",
                AttributeDefinition::string().required().immutable(),
            )
            .attribute(
                "occi.networkinterface.mac",
                AttributeDefinition::string()
                    .required()
                    .with_pattern("([0-9a-fA-F]{2}:){5}[0-9a-fA-F]{2}"),
            )
            .attribute(
                "occi.networkinterface.state",
                state("active|inactive|error", "inactive"),
            )
            .attribute("occi.networkinterface.state.message", AttributeDefinition::string())
            .into(),
        Kind::new(SCHEME, "storagelink")
            .title("Storage link")
            .parent(LINK)
            .location("/link/storagelink/")
            .attribute(
                "occi.storagelink.deviceid",
                AttributeDefinition::string().required(),
            )
            .attribute("occi.storagelink.mountpoint", AttributeDefinition::string())
            .attribute(
                "occi.storagelink.state",
                state("active|inactive|error", "inactive"),
            )
            .attribute("occi.storagelink.state.message", AttributeDefinition::string())
            .into(),
    ]
}

fn mixins() -> Vec<Category> {
    vec![
        Mixin::new("http://schemas.ogf.org/occi/infrastructure/network#", "ipnetwork")
            .title("IP networking mixin")
            .applies(&[NETWORK])
            .location("/mixin/ipnetwork/")
            .attribute("occi.network.address", AttributeDefinition::string())
            .attribute("occi.network.gateway", AttributeDefinition::string())
            .attribute(
                "occi.network.allocation",
                AttributeDefinition::string().with_pattern("dynamic|static"),
            )
            .into(),
        Mixin::new(
            "http://schemas.ogf.org/occi/infrastructure/networkinterface#",
            "ipnetworkinterface",
        )
        .title("IP network interface mixin")
        .applies(&[NETWORK_INTERFACE])
        .location("/mixin/ipnetworkinterface/")
        .attribute("occi.networkinterface.address", AttributeDefinition::string())
        .attribute("occi.networkinterface.gateway", AttributeDefinition::string())
        .attribute(
            "occi.networkinterface.allocation",
            AttributeDefinition::string().with_pattern("dynamic|static"),
        )
        .into(),
        Mixin::new(SCHEME, "os_tpl")
            .title("OS template")
            .applies(&[COMPUTE])
            .location("/mixin/os_tpl/")
            .into(),
        Mixin::new(SCHEME, "resource_tpl")
            .title("Resource template")
            .applies(&[COMPUTE])
            .location("/mixin/resource_tpl/")
            .into(),
        Mixin::new("http://schemas.ogf.org/occi/infrastructure/compute#", "user_data")
            .title("Contextualization data")
            .applies(&[COMPUTE])
            .location("/mixin/user_data/")
            .attribute(
                "occi.compute.userdata",
                AttributeDefinition::string().describe("Base64-encoded user data"),
            )
            .into(),
        Mixin::new("http://schemas.ogf.org/occi/infrastructure/credentials#", "ssh_key")
            .title("SSH credentials")
            .applies(&[COMPUTE])
            .location("/mixin/ssh_key/")
            .attribute(
                "occi.credentials.ssh.publickey",
                AttributeDefinition::string().required(),
            )
            .into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Model;

    #[test]
    fn identifiers_match_constants() {
        let ids: Vec<String> = categories().iter().map(Category::identifier).collect();
        for id in [
            COMPUTE,
            NETWORK,
            STORAGE,
            NETWORK_INTERFACE,
            STORAGE_LINK,
            IP_NETWORK,
            IP_NETWORK_INTERFACE,
            OS_TPL,
            RESOURCE_TPL,
            USER_DATA,
            SSH_KEY,
            action::COMPUTE_STOP,
            action::STORAGE_RESIZE,
        ] {
            assert!(ids.iter().any(|i| i == id), "missing {id}");
        }
    }

    #[test]
    fn all_identifiers_unique() {
        let mut seen = std::collections::HashSet::new();
        for category in categories() {
            assert!(
                seen.insert(category.identifier()),
                "Duplicate identifier: {}",
                category.identifier()
            );
        }
    }

    #[test]
    fn loaded_model_is_valid() {
        let model = Model::with_infrastructure().unwrap();
        model.valid().unwrap();
        assert_eq!(model.kinds().count(), 8);
        assert_eq!(model.mixins().count(), 6);
        assert_eq!(model.actions().count(), 12);
    }
}
