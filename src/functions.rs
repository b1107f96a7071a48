//! The presentation-text (PTOCA) control sequence functions this crate
//! decodes explicitly.  Any other function is parsed with
//! [`SYNTAX_FUNCTION_RAW`], i.e. its body comes back as raw bytes.
//!
//! Each logical function has two wire IDs: an even one for the unchained
//! form and the odd successor for the chained form.  Both map to the same
//! function metadata.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::syntax::{param, DataType::*, Syntax};

// Synthetic parameter names attached to every control-sequence record.
pub const PNAME_CS_LENGTH: &str = "LENGTH";
pub const PNAME_CS_TYPE: &str = "TYPE";

/// Any function not explicitly defined.
pub const SYNTAX_FUNCTION_RAW: Syntax = &[param(0, 0, Byte, "DATA", true)];

// To add new functions:
// 1. Define the syntax here...

const SYNTAX_FUNCTION_AMB: Syntax = &[param(0, 2, Sbin, "DSPLCMNT", true)];

const SYNTAX_FUNCTION_AMI: Syntax = &[param(0, 2, Sbin, "DSPLCMNT", true)];

const SYNTAX_FUNCTION_BSU: Syntax = &[param(0, 1, Code, "LID", true)];

const SYNTAX_FUNCTION_DBR: Syntax = &[
    param(0, 2, Sbin, "RLENGTH", true),
    param(2, 3, Sbin, "RWIDTH", false),
];

const SYNTAX_FUNCTION_DIR: Syntax = &[
    param(0, 2, Sbin, "RLENGTH", true),
    param(2, 3, Sbin, "RWIDTH", false),
];

const SYNTAX_FUNCTION_ESU: Syntax = &[param(0, 1, Code, "LID", true)];

const SYNTAX_FUNCTION_NOP: Syntax = &[param(0, 0, Byte, "IGNDATA", false)];

const SYNTAX_FUNCTION_RMB: Syntax = &[param(0, 2, Sbin, "INCRMENT", true)];

const SYNTAX_FUNCTION_RMI: Syntax = &[param(0, 2, Sbin, "INCRMENT", true)];

const SYNTAX_FUNCTION_RPS: Syntax = &[
    param(0, 2, Ubin, "RLENGTH", true),
    param(2, 0, Char, "RPTDATA", false),
];

const SYNTAX_FUNCTION_SCFL: Syntax = &[param(0, 1, Code, "LID", true)];

const SYNTAX_FUNCTION_STC: Syntax = &[
    param(0, 2, Code, "FRGCOLOR", true),
    param(2, 1, Byte, "PRECSION", false),
];

const SYNTAX_FUNCTION_STO: Syntax = &[
    param(0, 2, Code, "IORNTION", true),
    param(2, 2, Code, "BORNTION", true),
];

const SYNTAX_FUNCTION_SVI: Syntax = &[param(0, 2, Sbin, "INCRMENT", true)];

const SYNTAX_FUNCTION_TRN: Syntax = &[param(0, 0, Char, "TRNDATA", false)];

#[derive(Debug, Clone, Copy)]
pub struct Function {
    pub abbreviation: &'static str,
    pub name: &'static str,
    pub syntax: Syntax,
}

// 2. Define its IDs here - one unchained and one chained...

// Unchained
pub const FN_U_AMB: u8 = 0xD2;
pub const FN_U_AMI: u8 = 0xC6;
pub const FN_U_BSU: u8 = 0xF2;
pub const FN_U_DBR: u8 = 0xE6;
pub const FN_U_DIR: u8 = 0xE4;
pub const FN_U_ESU: u8 = 0xF4;
pub const FN_U_RMB: u8 = 0xD4;
pub const FN_U_RMI: u8 = 0xC8;
pub const FN_U_RPS: u8 = 0xEE;
pub const FN_U_SCFL: u8 = 0xF0;
pub const FN_U_STC: u8 = 0x74;
pub const FN_U_STO: u8 = 0xF6;
pub const FN_U_SVI: u8 = 0xC4;
pub const FN_U_TRN: u8 = 0xDA;
pub const FN_U_NOP: u8 = 0xF8;

// Chained
pub const FN_C_AMB: u8 = 0xD3;
pub const FN_C_AMI: u8 = 0xC7;
pub const FN_C_BSU: u8 = 0xF3;
pub const FN_C_DBR: u8 = 0xE7;
pub const FN_C_DIR: u8 = 0xE5;
pub const FN_C_ESU: u8 = 0xF5;
pub const FN_C_RMB: u8 = 0xD5;
pub const FN_C_RMI: u8 = 0xC9;
pub const FN_C_RPS: u8 = 0xEF;
pub const FN_C_SCFL: u8 = 0xF1;
pub const FN_C_STC: u8 = 0x75;
pub const FN_C_STO: u8 = 0xF7;
pub const FN_C_SVI: u8 = 0xC5;
pub const FN_C_TRN: u8 = 0xDB;
pub const FN_C_NOP: u8 = 0xF9;

// 3. Add the unchained and chained versions to the list here...

lazy_static! {
    pub static ref FUNCTIONS: HashMap<u8, Function> = {
        let functions = [
            (FN_U_AMB, FN_C_AMB, "AMB", "Absolute Move Baseline", SYNTAX_FUNCTION_AMB),
            (FN_U_AMI, FN_C_AMI, "AMI", "Absolute Move Inline", SYNTAX_FUNCTION_AMI),
            (FN_U_BSU, FN_C_BSU, "BSU", "Begin Suppression", SYNTAX_FUNCTION_BSU),
            (FN_U_DBR, FN_C_DBR, "DBR", "Draw Baseline Rule", SYNTAX_FUNCTION_DBR),
            (FN_U_DIR, FN_C_DIR, "DIR", "Draw Inline Rule", SYNTAX_FUNCTION_DIR),
            (FN_U_ESU, FN_C_ESU, "ESU", "End Suppression", SYNTAX_FUNCTION_ESU),
            (FN_U_RMB, FN_C_RMB, "RMB", "Relative Move Baseline", SYNTAX_FUNCTION_RMB),
            (FN_U_RMI, FN_C_RMI, "RMI", "Relative Move Inline", SYNTAX_FUNCTION_RMI),
            (FN_U_RPS, FN_C_RPS, "RPS", "Repeat String", SYNTAX_FUNCTION_RPS),
            (FN_U_SCFL, FN_C_SCFL, "SCFL", "Set Coded Font Local", SYNTAX_FUNCTION_SCFL),
            (FN_U_STC, FN_C_STC, "STC", "Set Text Color", SYNTAX_FUNCTION_STC),
            (FN_U_STO, FN_C_STO, "STO", "Set Text Orientation", SYNTAX_FUNCTION_STO),
            (FN_U_SVI, FN_C_SVI, "SVI", "Set Variable Space Character Increment", SYNTAX_FUNCTION_SVI),
            (FN_U_TRN, FN_C_TRN, "TRN", "Transparent Data", SYNTAX_FUNCTION_TRN),
            (FN_U_NOP, FN_C_NOP, "NOP", "No Operation", SYNTAX_FUNCTION_NOP),
        ];
        let mut map = HashMap::new();
        for &(unchained, chained, abbreviation, name, syntax) in functions.iter() {
            let info = Function {
                abbreviation,
                name,
                syntax,
            };
            map.insert(unchained, info);
            map.insert(chained, info);
        }
        map
    };
}

/// True if the function ID is the unchained form.
pub fn unchained_function(function: u8) -> bool {
    function % 2 == 0
}

/// True if the function ID is the chained form.
pub fn chained_function(function: u8) -> bool {
    !unchained_function(function)
}
