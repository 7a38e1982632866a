use serde::{Deserialize, Serialize};

/// Address and community of one SNMP agent. Also one row of the target list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub snmp_address: String,
    pub snmp_community: String,
}

impl Connection {
    pub fn new(address: impl Into<String>, community: impl Into<String>) -> Self {
        Self {
            snmp_address: address.into(),
            snmp_community: community.into(),
        }
    }
}
