use super::vendor::VendorTag;
use crate::error::{ProbeError, Result};

const CISCO_CPU_5MIN: &str = "1.3.6.1.4.1.9.9.109.1.1.1.1.7";
const CISCO_CPU_5MIN_LEGACY: &str = "1.3.6.1.4.1.9.9.109.1.1.1.1.4";
const ZXCTN_MASTER_PROBES: &[&str] = &[
    "1.3.6.1.4.1.3902.3.6002.1.3.1.6.0.0.3",
    "1.3.6.1.4.1.3902.3.6002.1.3.1.6.0.0.4",
];

/// Retrieval algorithm used to turn SNMP samples into a CPU percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// GET the OID and use the value as-is.
    SingleGet,
    /// GETNEXT from the OID and use the first value as-is.
    GetNextSingle,
    /// GETNEXT down the subtree until a nonzero value or the subtree ends.
    ChainWalkThreshold,
    /// WALK the subtree and average every value.
    WalkAverage,
    /// GET an idle percentage and report 100 minus it.
    LinuxComplement,
    /// Find the active master engine first, then GET its CPU entry.
    MasterIndexLookup { probes: &'static [&'static str] },
}

/// Where and how to read CPU load for one vendor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionSpec {
    pub oid: &'static str,
    pub strategy: Strategy,
}

impl CollectionSpec {
    const fn new(oid: &'static str, strategy: Strategy) -> Self {
        Self { oid, strategy }
    }
}

/// Looks up the collection spec registered for `tag`.
pub fn collection_spec(tag: VendorTag, target: &str) -> Result<CollectionSpec> {
    use Strategy::*;
    use VendorTag::*;

    let spec = match tag {
        CiscoNx => CollectionSpec::new("1.3.6.1.4.1.9.9.305.1.1.1.0", SingleGet),
        Cisco | CiscoIos7200 | CiscoOld => {
            CollectionSpec::new("1.3.6.1.4.1.9.9.109.1.1.1.1.7.1", SingleGet)
        }
        Hillstone => CollectionSpec::new(".1.3.6.1.4.1.28557.2.2.1.3", GetNextSingle),
        CiscoIosXe | CiscoIosXr => CollectionSpec::new(CISCO_CPU_5MIN, GetNextSingle),
        CiscoAsa => CollectionSpec::new(CISCO_CPU_5MIN, WalkAverage),
        CiscoAsaOld => CollectionSpec::new(CISCO_CPU_5MIN_LEGACY, WalkAverage),
        Huawei | HuaweiV5_70 | HuaweiV5_130 => {
            CollectionSpec::new("1.3.6.1.4.1.2011.5.25.31.1.1.1.1.5", ChainWalkThreshold)
        }
        HuaweiV3_10 | H3cV3_10 => {
            CollectionSpec::new("1.3.6.1.4.1.2011.6.1.1.1.3", ChainWalkThreshold)
        }
        HuaweiMe60 => CollectionSpec::new("1.3.6.1.4.1.2011.6.3.4.1.2", WalkAverage),
        H3c | H3cV5 | H3cV7 => {
            CollectionSpec::new("1.3.6.1.4.1.25506.2.6.1.1.1.1.6", ChainWalkThreshold)
        }
        H3cS9500 => CollectionSpec::new("1.3.6.1.4.1.2011.10.2.6.1.1.1.1.6", ChainWalkThreshold),
        Juniper => CollectionSpec::new("1.3.6.1.4.1.2636.3.1.13.1.8", ChainWalkThreshold),
        Ruijie => CollectionSpec::new("1.3.6.1.4.1.4881.1.1.10.2.36.1.1.2", GetNextSingle),
        Dell => CollectionSpec::new(
            "1.3.6.1.4.1.674.10895.5000.2.6132.1.1.1.1.4.11",
            GetNextSingle,
        ),
        Linux => CollectionSpec::new("1.3.6.1.4.1.2021.11.11.0", LinuxComplement),
        A10 => CollectionSpec::new("1.3.6.1.4.1.22610.2.4.1.3.3", GetNextSingle),
        Aruba => CollectionSpec::new("1.3.6.1.4.1.14823.2.2.1.1.1.9.1.3", GetNextSingle),
        CiscoController => CollectionSpec::new("1.3.6.1.4.1.14179.1.1.5.1", GetNextSingle),
        Zxctn9000 => CollectionSpec::new(
            "1.3.6.1.4.1.3902.3.6002.2.1.1.7",
            MasterIndexLookup {
                probes: ZXCTN_MASTER_PROBES,
            },
        ),
        Unrecognized => {
            return Err(ProbeError::UnrecognizedVendor {
                target: target.to_string(),
            })
        }
    };

    Ok(spec)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_recognized_tag_has_a_spec() {
        for tag in VendorTag::all().iter().filter(|t| t.is_recognized()) {
            assert!(collection_spec(*tag, "192.0.2.1").is_ok(), "{tag:?}");
        }
    }

    #[test]
    fn unrecognized_tag_fails() {
        assert!(matches!(
            collection_spec(VendorTag::Unrecognized, "192.0.2.1"),
            Err(ProbeError::UnrecognizedVendor { .. })
        ));
    }

    #[test]
    fn strategy_families() {
        let strategy = |tag| collection_spec(tag, "t").unwrap().strategy;
        assert_eq!(strategy(VendorTag::Cisco), Strategy::SingleGet);
        assert_eq!(strategy(VendorTag::CiscoIosXe), Strategy::GetNextSingle);
        assert_eq!(strategy(VendorTag::Hillstone), Strategy::GetNextSingle);
        assert_eq!(strategy(VendorTag::CiscoAsa), Strategy::WalkAverage);
        assert_eq!(strategy(VendorTag::HuaweiMe60), Strategy::WalkAverage);
        assert_eq!(strategy(VendorTag::H3cS9500), Strategy::ChainWalkThreshold);
        assert_eq!(strategy(VendorTag::Juniper), Strategy::ChainWalkThreshold);
        assert_eq!(strategy(VendorTag::Linux), Strategy::LinuxComplement);
        assert!(matches!(
            strategy(VendorTag::Zxctn9000),
            Strategy::MasterIndexLookup { probes } if probes.len() == 2
        ));
    }

    #[test]
    fn asa_generations_use_different_oids() {
        let new = collection_spec(VendorTag::CiscoAsa, "t").unwrap();
        let old = collection_spec(VendorTag::CiscoAsaOld, "t").unwrap();
        assert_ne!(new.oid, old.oid);
        assert_eq!(new.strategy, old.strategy);
    }
}
