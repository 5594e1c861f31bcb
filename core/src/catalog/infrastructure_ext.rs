//! Infrastructure extensions: security groups, IP reservations, placement.
//!
//! Loaded after [`infrastructure`](super::infrastructure); `ipreservation`
//! descends from its `network` kind.

use super::core::{LINK, RESOURCE};
use super::infrastructure::{COMPUTE, NETWORK, SCHEME};
use crate::attribute::AttributeDefinition;
use crate::category::{Category, Kind, Mixin};

/// `infrastructure#securitygroup`.
pub const SECURITY_GROUP: &str = "http://schemas.ogf.org/occi/infrastructure#securitygroup";
/// `infrastructure#securitygrouplink`.
pub const SECURITY_GROUP_LINK: &str =
    "http://schemas.ogf.org/occi/infrastructure#securitygrouplink";
/// `infrastructure#ipreservation`.
pub const IP_RESERVATION: &str = "http://schemas.ogf.org/occi/infrastructure#ipreservation";
/// `infrastructure#availability_zone`.
pub const AVAILABILITY_ZONE: &str = "http://schemas.ogf.org/occi/infrastructure#availability_zone";
/// `infrastructure#region`.
pub const REGION: &str = "http://schemas.ogf.org/occi/infrastructure#region";
/// `infrastructure#floatingippool`.
pub const FLOATING_IP_POOL: &str = "http://schemas.ogf.org/occi/infrastructure#floatingippool";

/// Returns the extension kinds and mixins in dependency order.
#[must_use]
pub fn categories() -> Vec<Category> {
    vec![
        Kind::new(SCHEME, "securitygroup")
            .title("Security group")
            .parent(RESOURCE)
            .location("/securitygroup/")
            .attribute(
                "occi.securitygroup.rules",
                AttributeDefinition::object().describe("Firewall rules as a list of objects"),
            )
            .attribute(
                "occi.securitygroup.state",
                AttributeDefinition::string()
                    .required()
                    .immutable()
                    .with_pattern("active|inactive|error")
                    .with_default("active"),
            )
            .into(),
        Kind::new(SCHEME, "securitygrouplink")
            .title("Security group link")
            .parent(LINK)
            .location("/link/securitygrouplink/")
            .attribute(
                "occi.securitygrouplink.state",
                AttributeDefinition::string()
                    .required()
                    .immutable()
                    .with_pattern("active|inactive|error")
                    .with_default("inactive"),
            )
            .into(),
        Kind::new(SCHEME, "ipreservation")
            .title("IP reservation")
            .parent(NETWORK)
            .location("/ipreservation/")
            .attribute("occi.ipreservation.address", AttributeDefinition::string())
            .attribute(
                "occi.ipreservation.used",
                AttributeDefinition::boolean().immutable().with_default(false),
            )
            .attribute(
                "occi.ipreservation.state",
                AttributeDefinition::string()
                    .required()
                    .immutable()
                    .with_pattern("active|inactive|error")
                    .with_default("inactive"),
            )
            .into(),
        Mixin::new(SCHEME, "availability_zone")
            .title("Availability zone")
            .applies(&[COMPUTE])
            .location("/mixin/availability_zone/")
            .into(),
        Mixin::new(SCHEME, "region")
            .title("Region")
            .location("/mixin/region/")
            .into(),
        Mixin::new(SCHEME, "floatingippool")
            .title("Floating IP pool")
            .applies(&[IP_RESERVATION])
            .location("/mixin/floatingippool/")
            .into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Model;

    #[test]
    fn extensions_resolve_against_infrastructure() {
        let model = Model::with_extensions().unwrap();
        model.valid().unwrap();
        assert!(model.is_related(IP_RESERVATION, NETWORK));
        assert!(model.find_mixin(FLOATING_IP_POOL).is_some());
    }

    #[test]
    fn extensions_alone_fail_to_resolve() {
        let mut model = Model::bootstrap().unwrap();
        assert!(model.register_all(categories()).is_err());
        assert_eq!(model, Model::bootstrap().unwrap());
    }
}
