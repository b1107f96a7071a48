//! The triplets this crate decodes explicitly.  Any other triplet is parsed
//! with [`SYNTAX_TRIPLET_RAW`], i.e. its body comes back as raw bytes.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::syntax::{param, DataType::*, Syntax};

// Synthetic parameter names attached to every triplet record.
pub const PNAME_T_ID: &str = "Tid";
pub const PNAME_T_LENGTH: &str = "Tlength";

/// Any triplet not explicitly defined.
pub const SYNTAX_TRIPLET_RAW: Syntax = &[param(0, 0, Byte, "Contents", true)];

// To add new triplets:
// 1. Define the syntax here...

const SYNTAX_TRIPLET_01: Syntax = &[
    param(0, 2, Code, "GCSGID", true),
    param(2, 2, Code, "ID", true),
];

const SYNTAX_TRIPLET_02: Syntax = &[
    param(0, 1, Code, "FQNType", true),
    param(1, 1, Code, "FQNFmt", true),
    param(2, 0, Char, "FQName", true),
];

const SYNTAX_TRIPLET_18: Syntax = &[
    param(0, 1, Code, "IStype", true),
    param(1, 2, Code, "ISid", true),
];

const SYNTAX_TRIPLET_21: Syntax = &[
    param(0, 1, Code, "ObjType", true),
    param(1, 7, Code, "ConData", true),
];

const SYNTAX_TRIPLET_24: Syntax = &[
    param(0, 1, Code, "ResType", true),
    param(1, 1, Code, "ResLID", true),
];

const SYNTAX_TRIPLET_25: Syntax = &[param(0, 1, Code, "ResSNum", true)];

const SYNTAX_TRIPLET_26: Syntax = &[param(0, 2, Code, "CharRot", true)];

const SYNTAX_TRIPLET_2D: Syntax = &[
    param(0, 4, Ubin, "DirByOff", true),
    param(4, 4, Ubin, "DirByHi", false),
];

const SYNTAX_TRIPLET_36: Syntax = &[
    param(0, 2, Byte, "Reserved", true),
    param(2, 0, Char, "AttVal", false),
];

const SYNTAX_TRIPLET_56: Syntax = &[param(0, 4, Ubin, "PageNum", true)];

const SYNTAX_TRIPLET_57: Syntax = &[
    param(0, 4, Ubin, "ByteExt", true),
    param(4, 4, Ubin, "BytExtHi", true),
];

const SYNTAX_TRIPLET_58: Syntax = &[
    param(0, 4, Ubin, "SFOff", true),
    param(4, 4, Ubin, "SFOffHi", false),
];

const SYNTAX_TRIPLET_59: Syntax = &[
    param(0, 4, Ubin, "SFExt", true),
    param(4, 4, Ubin, "SFExtHi", false),
];

const SYNTAX_TRIPLET_62: Syntax = &[
    param(0, 1, Code, "StampType", true),
    param(1, 1, Code, "THunYear", true),
    param(2, 2, Code, "TenYear", true),
    param(4, 3, Code, "Day", true),
    param(7, 2, Code, "Hour", true),
    param(9, 2, Code, "Minute", true),
    param(11, 2, Code, "Second", true),
    param(13, 2, Code, "HundSec", true),
];

const SYNTAX_TRIPLET_68: Syntax = &[param(0, 1, Code, "MedOrient", true)];

const SYNTAX_TRIPLET_80: Syntax = &[
    param(0, 4, Ubin, "SeqNum", true),
    param(4, 4, Ubin, "LevNum", true),
];

// 2. Define its ID here...

pub const TT_01: u8 = 0x01;
pub const TT_02: u8 = 0x02;
pub const TT_18: u8 = 0x18;
pub const TT_21: u8 = 0x21;
pub const TT_24: u8 = 0x24;
pub const TT_25: u8 = 0x25;
pub const TT_26: u8 = 0x26;
pub const TT_2D: u8 = 0x2D;
pub const TT_36: u8 = 0x36;
pub const TT_56: u8 = 0x56;
pub const TT_57: u8 = 0x57;
pub const TT_58: u8 = 0x58;
pub const TT_59: u8 = 0x59;
pub const TT_62: u8 = 0x62;
pub const TT_68: u8 = 0x68;
pub const TT_80: u8 = 0x80;

#[derive(Debug, Clone, Copy)]
pub struct TripletType {
    pub name: &'static str,
    pub syntax: Syntax,
}

// 3. Add it to the list here...

lazy_static! {
    pub static ref TRIPLET_TYPES: HashMap<u8, TripletType> = {
        let types = [
            (TT_01, "Coded Graphic Character Set Global Identifier", SYNTAX_TRIPLET_01),
            (TT_02, "Fully Qualified Name", SYNTAX_TRIPLET_02),
            (TT_18, "MO:DCA Interchange Set", SYNTAX_TRIPLET_18),
            (TT_21, "Resource Object Type", SYNTAX_TRIPLET_21),
            (TT_24, "Resource Local Identifier", SYNTAX_TRIPLET_24),
            (TT_25, "Resource Section Number", SYNTAX_TRIPLET_25),
            (TT_26, "Character Rotation", SYNTAX_TRIPLET_26),
            (TT_2D, "Object Byte Offset", SYNTAX_TRIPLET_2D),
            (TT_36, "Attribute Value", SYNTAX_TRIPLET_36),
            (TT_56, "Medium Map Page Number", SYNTAX_TRIPLET_56),
            (TT_57, "Object Byte Extent", SYNTAX_TRIPLET_57),
            (TT_58, "Object Structured Field Offset", SYNTAX_TRIPLET_58),
            (TT_59, "Object Structured Field Extent", SYNTAX_TRIPLET_59),
            (TT_62, "Local Date and Time Stamp", SYNTAX_TRIPLET_62),
            (TT_68, "Medium Orientation", SYNTAX_TRIPLET_68),
            (TT_80, "Attribute Qualifier", SYNTAX_TRIPLET_80),
        ];
        types
            .iter()
            .map(|&(id, name, syntax)| (id, TripletType { name, syntax }))
            .collect()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_complete() {
        assert_eq!(TRIPLET_TYPES.len(), 16);
        assert_eq!(TRIPLET_TYPES[&TT_02].name, "Fully Qualified Name");
        assert!(!TRIPLET_TYPES.contains_key(&0x00));
    }
}
