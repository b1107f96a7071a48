//! The structured fields this crate decodes explicitly.  Any other field is
//! parsed with [`SYNTAX_FIELD_RAW`], i.e. its body comes back as raw bytes.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::syntax::{group, param, param_with, DataType::*, Preproc, Syntax};

// Parameter names shared between modules.
pub const PNAME_EXT_DATA: &str = "ExtData";
pub const PNAME_EXT_LENGTH: &str = "ExtLength";
pub const PNAME_FLAG_BYTE: &str = "FlagByte";
pub const PNAME_SF_LENGTH: &str = "SFLength";
pub const PNAME_SF_TYPE_ID: &str = "SFTypeID";
pub const PNAME_TRIPLETS: &str = "Triplets";

/// Structured Field Introducer.  The two extension parameters only exist
/// when the extension flag is set in `FlagByte`.
pub const SYNTAX_SFI: Syntax = &[
    param(0, 3, Code, PNAME_SF_TYPE_ID, true),
    param(3, 1, Byte, PNAME_FLAG_BYTE, true),
    param(4, 2, Byte, "Reserved", true),
    param_with(6, 1, Ubin, PNAME_EXT_LENGTH, true, Preproc::SuppressIfNoExtension),
    param_with(7, 0, Byte, PNAME_EXT_DATA, true, Preproc::SetExtensionLength),
];

/// Any structured field not explicitly defined.
pub const SYNTAX_FIELD_RAW: Syntax = &[param(0, 0, Byte, "Data", false)];

// To add new structured fields:
// 1. Define the syntax here...

const SYNTAX_FIELD_BAG: Syntax = &[
    param(0, 8, Char, "AEGName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BDG: Syntax = &[
    param(0, 8, Char, "DEGName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BDI: Syntax = &[
    param(0, 8, Char, "IndxName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BDT: Syntax = &[
    param(0, 8, Char, "DocName", true),
    param(8, 2, Byte, "Reserved", true),
    param(10, 0, Triplet, PNAME_TRIPLETS, true),
];

const SYNTAX_FIELD_BFG: Syntax = &[param(0, 8, Char, "FEGName", false)];

const SYNTAX_FIELD_BFM: Syntax = &[
    param(0, 8, Char, "FMName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BMM: Syntax = &[
    param(0, 8, Char, "MMName", true),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BNG: Syntax = &[
    param(0, 8, Char, "PGrpName", true),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BPG: Syntax = &[
    param(0, 8, Char, "PageName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BPT: Syntax = &[
    param(0, 8, Char, "PTdoName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BRG: Syntax = &[
    param(0, 8, Char, "RGrpName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_BRS: Syntax = &[
    param(0, 8, Char, "RSName", true),
    param(8, 2, Byte, "Reserved", true),
    param(10, 0, Triplet, PNAME_TRIPLETS, true),
];

const SYNTAX_FIELD_CTC: Syntax = &[param(0, 10, Byte, "ConData", true)];

const SYNTAX_FIELD_EAG: Syntax = &[param(0, 8, Char, "AEGName", false)];

const SYNTAX_FIELD_EDG: Syntax = &[param(0, 8, Char, "DEGName", false)];

const SYNTAX_FIELD_EDI: Syntax = &[
    param(0, 8, Char, "IndxName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_EDT: Syntax = &[
    param(0, 8, Char, "DocName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_EFG: Syntax = &[param(0, 8, Char, "FEGName", false)];

const SYNTAX_FIELD_EFM: Syntax = &[param(0, 8, Char, "FMName", false)];

const SYNTAX_FIELD_EMM: Syntax = &[param(0, 8, Char, "MMName", false)];

const SYNTAX_FIELD_ENG: Syntax = &[
    param(0, 8, Char, "PGrpName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_EPG: Syntax = &[
    param(0, 8, Char, "PageName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_EPT: Syntax = &[
    param(0, 8, Char, "PTdoName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_ERG: Syntax = &[
    param(0, 8, Char, "RGrpName", false),
    param(8, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_ERS: Syntax = &[param(0, 8, Char, "RSName", false)];

const SYNTAX_FIELD_IEL: Syntax = &[param(0, 0, Triplet, PNAME_TRIPLETS, true)];

const SYNTAX_FIELD_IPO: Syntax = &[
    param(0, 8, Char, "OvlyName", true),
    param(8, 3, Sbin, "XolOset", true),
    param(11, 3, Sbin, "YolOset", true),
    param(14, 2, Code, "OvlyOrent", false),
    param(16, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_IPS: Syntax = &[
    param(0, 8, Char, "PsegName", true),
    param(8, 3, Sbin, "XpsOset", true),
    param(11, 3, Sbin, "YpsOset", true),
    param(14, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_MCC: Syntax = &[group(&[
    param(0, 2, Ubin, "Startnum", true),
    param(2, 2, Ubin, "Stopnum", true),
    param(4, 1, Byte, "Reserved", true),
    param(5, 1, Code, "MMCid", true),
])];

const SYNTAX_FIELD_MCF: Syntax = &[group(&[
    param_with(0, 2, Ubin, "RGLength", true, Preproc::ThisGroupLength),
    param(2, 0, Triplet, PNAME_TRIPLETS, true),
])];

const SYNTAX_FIELD_MCF_1: Syntax = &[
    param_with(0, 1, Ubin, "RGLength", true, Preproc::NextGroupLength),
    param(1, 3, Byte, "Reserved", true),
    group(&[
        param(0, 1, Ubin, "CFLid", true),
        param(1, 1, Byte, "Reserved", true),
        param(2, 1, Code, "Sectid", true),
        param(3, 1, Byte, "Reserved", true),
        param(4, 8, Char, "CFName", true),
        param(12, 8, Char, "CPName", true),
        param(20, 8, Char, "FCSName", true),
        param(28, 2, Code, "CharRot", false),
    ]),
];

const SYNTAX_FIELD_MDD: Syntax = &[
    param(0, 1, Code, "XmBase", true),
    param(1, 1, Code, "YmBase", true),
    param(2, 2, Ubin, "XmUnits", true),
    param(4, 2, Ubin, "YmUnits", true),
    param(6, 3, Ubin, "XmSize", true),
    param(9, 3, Ubin, "YmSize", true),
    param(12, 1, Byte, "MDDFlgs", true),
    param(13, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_MMC: Syntax = &[
    param(0, 1, Code, "MMCid", true),
    param(1, 1, Code, "Constant", true),
    param(2, 0, Byte, "Keywords", false),
];

const SYNTAX_FIELD_MPO: Syntax = &[group(&[
    param_with(0, 2, Ubin, "RGLength", true, Preproc::ThisGroupLength),
    param(2, 0, Triplet, PNAME_TRIPLETS, true),
])];

const SYNTAX_FIELD_NOP: Syntax = &[param(0, 0, Byte, "UndfData", false)];

const SYNTAX_FIELD_PGD: Syntax = &[
    param(0, 1, Code, "XpgBase", true),
    param(1, 1, Code, "YpgBase", true),
    param(2, 2, Ubin, "XpgUnits", true),
    param(4, 2, Ubin, "YpgUnits", true),
    param(6, 3, Ubin, "XpgSize", true),
    param(9, 3, Ubin, "YpgSize", true),
    param(12, 3, Byte, "Reserved", true),
    param(15, 0, Triplet, PNAME_TRIPLETS, false),
];

const SYNTAX_FIELD_PGP_1: Syntax = &[
    param(0, 3, Ubin, "XmOset", true),
    param(3, 3, Ubin, "YmOset", true),
];

const SYNTAX_FIELD_PTD: Syntax = &[
    param(0, 1, Code, "XPBASE", true),
    param(1, 1, Code, "YPBASE", true),
    param(2, 2, Ubin, "XPUNITVL", true),
    param(4, 2, Ubin, "YPUNITVL", true),
    param(6, 3, Ubin, "XPEXTENT", true),
    param(9, 3, Ubin, "YPEXTENT", true),
    param(12, 2, Byte, "TEXTFLAGS", false),
    param(14, 0, Byte, "TXTCONDS", false),
];

const SYNTAX_FIELD_PTD_1: Syntax = &[
    param(0, 1, Code, "XptBase", true),
    param(1, 1, Code, "YptBase", true),
    param(2, 2, Ubin, "XptUnits", true),
    param(4, 2, Ubin, "YptUnits", true),
    param(6, 2, Ubin, "XptSize", true),
    param(8, 2, Ubin, "YptSize", true),
    param(10, 2, Byte, "Reserved", false),
];

const SYNTAX_FIELD_PTX: Syntax = &[param(0, 0, Ptoca, "PTOCAdat", false)];

const SYNTAX_FIELD_TLE: Syntax = &[param(0, 0, Triplet, PNAME_TRIPLETS, true)];

// 2. Define its ID here...

pub const SF_BAG: u32 = 0xD3A8C9;
pub const SF_BDG: u32 = 0xD3A8C4;
pub const SF_BDI: u32 = 0xD3A8A7;
pub const SF_BDT: u32 = 0xD3A8A8;
pub const SF_BFG: u32 = 0xD3A8C5;
pub const SF_BFM: u32 = 0xD3A8CD;
pub const SF_BMM: u32 = 0xD3A8CC;
pub const SF_BNG: u32 = 0xD3A8AD;
pub const SF_BPG: u32 = 0xD3A8AF;
pub const SF_BPT: u32 = 0xD3A89B;
pub const SF_BRG: u32 = 0xD3A8C6;
pub const SF_BRS: u32 = 0xD3A8CE;
pub const SF_CTC: u32 = 0xD3A79B;
pub const SF_EAG: u32 = 0xD3A9C9;
pub const SF_EDG: u32 = 0xD3A9C4;
pub const SF_EDI: u32 = 0xD3A9A7;
pub const SF_EDT: u32 = 0xD3A9A8;
pub const SF_EFG: u32 = 0xD3A9C5;
pub const SF_EFM: u32 = 0xD3A9CD;
pub const SF_EMM: u32 = 0xD3A9CC;
pub const SF_ENG: u32 = 0xD3A9AD;
pub const SF_EPG: u32 = 0xD3A9AF;
pub const SF_EPT: u32 = 0xD3A99B;
pub const SF_ERG: u32 = 0xD3A9C6;
pub const SF_ERS: u32 = 0xD3A9CE;
pub const SF_IEL: u32 = 0xD3B2A7;
pub const SF_IPO: u32 = 0xD3AFD8;
pub const SF_IPS: u32 = 0xD3AF5F;
pub const SF_MCC: u32 = 0xD3A288;
pub const SF_MCF: u32 = 0xD3AB8A;
pub const SF_MCF_1: u32 = 0xD3B18A;
pub const SF_MDD: u32 = 0xD3A688;
pub const SF_MMC: u32 = 0xD3A788;
pub const SF_MPO: u32 = 0xD3ABD8;
pub const SF_NOP: u32 = 0xD3EEEE;
pub const SF_PGD: u32 = 0xD3A6AF;
pub const SF_PGP_1: u32 = 0xD3ACAF;
pub const SF_PTD: u32 = 0xD3B19B;
pub const SF_PTD_1: u32 = 0xD3A69B;
pub const SF_PTX: u32 = 0xD3EE9B;
pub const SF_TLE: u32 = 0xD3A090;

#[derive(Debug, Clone, Copy)]
pub struct StructuredFieldType {
    pub abbreviation: &'static str,
    pub name: &'static str,
    pub syntax: Syntax,
}

// 3. Add it to the list here...

lazy_static! {
    pub static ref SF_TYPES: HashMap<u32, StructuredFieldType> = {
        let types = [
            (SF_BAG, "BAG", "Begin Active Environment Group", SYNTAX_FIELD_BAG),
            (SF_BDG, "BDG", "Begin Document Environment Group", SYNTAX_FIELD_BDG),
            (SF_BDI, "BDI", "Begin Document Index", SYNTAX_FIELD_BDI),
            (SF_BDT, "BDT", "Begin Document", SYNTAX_FIELD_BDT),
            (SF_BFG, "BFG", "Begin Form Environment Group", SYNTAX_FIELD_BFG),
            (SF_BFM, "BFM", "Begin Form Map", SYNTAX_FIELD_BFM),
            (SF_BMM, "BMM", "Begin Medium Map", SYNTAX_FIELD_BMM),
            (SF_BNG, "BNG", "Begin Named Page Group", SYNTAX_FIELD_BNG),
            (SF_BPG, "BPG", "Begin Page", SYNTAX_FIELD_BPG),
            (SF_BPT, "BPT", "Begin Presentation Text Object", SYNTAX_FIELD_BPT),
            (SF_BRG, "BRG", "Begin Resource Group", SYNTAX_FIELD_BRG),
            (SF_BRS, "BRS", "Begin Resource", SYNTAX_FIELD_BRS),
            (SF_CTC, "CTC", "Composed Text Control", SYNTAX_FIELD_CTC),
            (SF_EAG, "EAG", "End Active Environment Group", SYNTAX_FIELD_EAG),
            (SF_EDG, "EDG", "End Document Environment Group", SYNTAX_FIELD_EDG),
            (SF_EDI, "EDI", "End Document Index", SYNTAX_FIELD_EDI),
            (SF_EDT, "EDT", "End Document", SYNTAX_FIELD_EDT),
            (SF_EFG, "EFG", "End Form Environment Group", SYNTAX_FIELD_EFG),
            (SF_EFM, "EFM", "End Form Map", SYNTAX_FIELD_EFM),
            (SF_EMM, "EMM", "End Medium Map", SYNTAX_FIELD_EMM),
            (SF_ENG, "ENG", "End Named Page Group", SYNTAX_FIELD_ENG),
            (SF_EPG, "EPG", "End Page", SYNTAX_FIELD_EPG),
            (SF_EPT, "EPT", "End Presentation Text Object", SYNTAX_FIELD_EPT),
            (SF_ERG, "ERG", "End Resource Group", SYNTAX_FIELD_ERG),
            (SF_ERS, "ERS", "End Resource", SYNTAX_FIELD_ERS),
            (SF_IEL, "IEL", "Index Element", SYNTAX_FIELD_IEL),
            (SF_IPO, "IPO", "Include Page Overlay", SYNTAX_FIELD_IPO),
            (SF_IPS, "IPS", "Include Page Segment", SYNTAX_FIELD_IPS),
            (SF_MCC, "MCC", "Medium Copy Count", SYNTAX_FIELD_MCC),
            (SF_MCF, "MCF", "Map Coded Font Format 2", SYNTAX_FIELD_MCF),
            (SF_MCF_1, "MCF-1", "Map Coded Font Format 1", SYNTAX_FIELD_MCF_1),
            (SF_MDD, "MDD", "Medium Descriptor", SYNTAX_FIELD_MDD),
            (SF_MMC, "MMC", "Medium Modification Control", SYNTAX_FIELD_MMC),
            (SF_MPO, "MPO", "Map Page Overlay", SYNTAX_FIELD_MPO),
            (SF_NOP, "NOP", "No Operation", SYNTAX_FIELD_NOP),
            (SF_PGD, "PGD", "Page Descriptor", SYNTAX_FIELD_PGD),
            (SF_PGP_1, "PGP-1", "Page Position Format 1", SYNTAX_FIELD_PGP_1),
            (SF_PTD, "PTD", "Presentation Text Data Descriptor Format 2", SYNTAX_FIELD_PTD),
            (SF_PTD_1, "PTD-1", "Presentation Text Data Descriptor Format 1", SYNTAX_FIELD_PTD_1),
            (SF_PTX, "PTX", "Presentation Text Data", SYNTAX_FIELD_PTX),
            (SF_TLE, "TLE", "Tag Logical Element", SYNTAX_FIELD_TLE),
        ];
        types
            .iter()
            .map(|&(id, abbreviation, name, syntax)| {
                (
                    id,
                    StructuredFieldType {
                        abbreviation,
                        name,
                        syntax,
                    },
                )
            })
            .collect()
    };
}

/// True if the Structured Field Introducer extension flag is set.
pub fn sfi_ext_flag(b: u8) -> bool {
    b & 0b1000_0000 > 0
}

/// True if the Structured Field Introducer segmented flag is set.
pub fn sfi_seg_flag(b: u8) -> bool {
    b & 0b0010_0000 > 0
}

/// True if the Structured Field Introducer padding flag is set.
pub fn sfi_pad_flag(b: u8) -> bool {
    b & 0b0000_1000 > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::syntax_length;

    #[test]
    fn test_every_id_is_modca_class() {
        for id in SF_TYPES.keys() {
            assert_eq!(id >> 16, 0xD3, "0x{:06X}", id);
        }
    }

    #[test]
    fn test_catalogue_is_complete() {
        assert_eq!(SF_TYPES.len(), 41);
        assert_eq!(SF_TYPES[&SF_BDT].abbreviation, "BDT");
        assert_eq!(SF_TYPES[&SF_PGP_1].abbreviation, "PGP-1");
    }

    #[test]
    fn test_mcc_group_has_fixed_length() {
        match SYNTAX_FIELD_MCC[0] {
            crate::syntax::SyntaxElement::Group(g) => assert_eq!(syntax_length(g), 6),
            _ => panic!("MCC syntax should be a repeating group"),
        }
    }

    #[test]
    fn test_sfi_flags() {
        assert!(sfi_ext_flag(0x80));
        assert!(!sfi_ext_flag(0x28));
        assert!(sfi_seg_flag(0x20));
        assert!(!sfi_seg_flag(0x88));
        assert!(sfi_pad_flag(0x08));
        assert!(!sfi_pad_flag(0xA0));
    }
}
