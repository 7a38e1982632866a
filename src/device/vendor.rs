use std::{fmt, str::FromStr};

/// Platform identity derived from a device's sysDescr.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VendorTag {
    Cisco,
    CiscoOld,
    CiscoIos7200,
    CiscoNx,
    CiscoIosXe,
    CiscoIosXr,
    CiscoController,
    CiscoAsa,
    CiscoAsaOld,
    Huawei,
    HuaweiMe60,
    HuaweiV5_70,
    HuaweiV5_130,
    HuaweiV3_10,
    H3c,
    H3cV5,
    H3cV7,
    H3cS9500,
    H3cV3_10,
    Ruijie,
    Juniper,
    Dell,
    Linux,
    A10,
    Aruba,
    Hillstone,
    Zxctn9000,
    /// No rule matched. Renders as an empty string.
    Unrecognized,
}

const ALL_TAGS: [VendorTag; 28] = [
    VendorTag::Cisco,
    VendorTag::CiscoOld,
    VendorTag::CiscoIos7200,
    VendorTag::CiscoNx,
    VendorTag::CiscoIosXe,
    VendorTag::CiscoIosXr,
    VendorTag::CiscoController,
    VendorTag::CiscoAsa,
    VendorTag::CiscoAsaOld,
    VendorTag::Huawei,
    VendorTag::HuaweiMe60,
    VendorTag::HuaweiV5_70,
    VendorTag::HuaweiV5_130,
    VendorTag::HuaweiV3_10,
    VendorTag::H3c,
    VendorTag::H3cV5,
    VendorTag::H3cV7,
    VendorTag::H3cS9500,
    VendorTag::H3cV3_10,
    VendorTag::Ruijie,
    VendorTag::Juniper,
    VendorTag::Dell,
    VendorTag::Linux,
    VendorTag::A10,
    VendorTag::Aruba,
    VendorTag::Hillstone,
    VendorTag::Zxctn9000,
    VendorTag::Unrecognized,
];

impl VendorTag {
    pub fn all() -> &'static [VendorTag] {
        &ALL_TAGS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorTag::Cisco => "Cisco",
            VendorTag::CiscoOld => "Cisco_old",
            VendorTag::CiscoIos7200 => "Cisco_IOS_7200",
            VendorTag::CiscoNx => "Cisco_NX",
            VendorTag::CiscoIosXe => "Cisco_IOS_XE",
            VendorTag::CiscoIosXr => "Cisco_IOS_XR",
            VendorTag::CiscoController => "Cisco_Controller",
            VendorTag::CiscoAsa => "Cisco_ASA",
            VendorTag::CiscoAsaOld => "Cisco_ASA_OLD",
            VendorTag::Huawei => "Huawei",
            VendorTag::HuaweiMe60 => "Huawei_ME60",
            VendorTag::HuaweiV5_70 => "Huawei_V5.70",
            VendorTag::HuaweiV5_130 => "Huawei_V5.130",
            VendorTag::HuaweiV3_10 => "Huawei_V3.10",
            VendorTag::H3c => "H3C",
            VendorTag::H3cV5 => "H3C_V5",
            VendorTag::H3cV7 => "H3C_V7",
            VendorTag::H3cS9500 => "H3C_S9500",
            VendorTag::H3cV3_10 => "H3c_V3.10",
            VendorTag::Ruijie => "Ruijie",
            VendorTag::Juniper => "Juniper",
            VendorTag::Dell => "Dell",
            VendorTag::Linux => "Linux",
            VendorTag::A10 => "A10",
            VendorTag::Aruba => "Aruba",
            VendorTag::Hillstone => "Hillstone",
            VendorTag::Zxctn9000 => "ZXCTN_9000",
            VendorTag::Unrecognized => "",
        }
    }

    pub fn is_recognized(&self) -> bool {
        *self != VendorTag::Unrecognized
    }
}

impl fmt::Display for VendorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for VendorTag {
    type Err = std::convert::Infallible;

    /// Unknown names parse as [`VendorTag::Unrecognized`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ALL_TAGS
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .unwrap_or(VendorTag::Unrecognized))
    }
}

/// Maps a sysDescr string to a vendor tag.
///
/// Rules are checked in order and the first hit wins. Primary keywords match
/// case-insensitively; the sub-variant checks are case-sensitive.
pub fn classify(descr: &str) -> VendorTag {
    let lower = descr.to_lowercase();

    if lower.contains("cisco nx-os") {
        return VendorTag::CiscoNx;
    }
    if descr.contains("Cisco Internetwork Operating System Software") {
        return VendorTag::CiscoOld;
    }
    if lower.contains("cisco ios") {
        return if descr.contains("IOS-XE Software") {
            VendorTag::CiscoIosXe
        } else if descr.contains("Cisco IOS XR") {
            VendorTag::CiscoIosXr
        } else {
            VendorTag::Cisco
        };
    }
    if lower.contains("cisco controller") {
        return VendorTag::CiscoController;
    }
    if lower.contains("cisco adaptive security appliance") {
        return match version_number(descr) {
            Some(version) if version < 9.2 => VendorTag::CiscoAsaOld,
            _ => VendorTag::CiscoAsa,
        };
    }
    if lower.contains("h3c") {
        return if descr.contains("Software Version 5") {
            VendorTag::H3cV5
        } else if descr.contains("Software Version 7") {
            VendorTag::H3cV7
        } else if descr.contains("Version S9500") {
            VendorTag::H3cS9500
        } else if descr.contains("Version 3.10") {
            VendorTag::H3cV3_10
        } else {
            VendorTag::H3c
        };
    }
    if lower.contains("huawei") {
        return if descr.contains("MultiserviceEngine 60") {
            VendorTag::HuaweiMe60
        } else if descr.contains("Version 5.70") {
            VendorTag::HuaweiV5_70
        } else if descr.contains("Version 5.130") {
            VendorTag::HuaweiV5_130
        } else if descr.contains("Version 3.10") {
            VendorTag::HuaweiV3_10
        } else {
            VendorTag::Huawei
        };
    }

    const SIMPLE_RULES: [(&str, VendorTag); 7] = [
        ("ruijie", VendorTag::Ruijie),
        ("juniper networks", VendorTag::Juniper),
        ("dell networking", VendorTag::Dell),
        ("linux", VendorTag::Linux),
        ("thunder series", VendorTag::A10),
        ("arubaos", VendorTag::Aruba),
        ("hillstone", VendorTag::Hillstone),
    ];
    if let Some((_, tag)) = SIMPLE_RULES.iter().find(|(key, _)| lower.contains(key)) {
        return *tag;
    }

    if descr.contains("ZXCTN 9000") {
        return VendorTag::Zxctn9000;
    }

    VendorTag::Unrecognized
}

/// Pulls the number following a "version" token, with parentheses removed.
///
/// "Version 9.1(2)" reads as 9.12. When several "version" tokens carry a
/// successor, the last one wins.
pub fn version_number(descr: &str) -> Option<f64> {
    let tokens: Vec<&str> = descr.split_whitespace().collect();
    let raw = tokens
        .windows(2)
        .filter(|pair| pair[0].eq_ignore_ascii_case("version"))
        .map(|pair| pair[1])
        .last()?;
    raw.replace(['(', ')'], "").parse::<f64>().ok()
}
