//! Type code to display name mapping for the dumped runtime
//!
//! Datatype codes advance in steps of 4 (`0` = TRASH through `224` =
//! LIBRARY); internal series kinds follow from 232, then graphics content
//! kinds.

/// Resolve a type code to its display name
///
/// Returns "unknown" for codes outside the table.
pub fn kind_name(code: i32) -> &'static str {
    match code {
        0 => "TRASH",
        4 => "UNSET",
        8 => "NONE",
        12 => "BAR",
        16 => "LIT_BAR",
        20 => "LOGIC",
        24 => "INTEGER",
        28 => "DECIMAL",
        32 => "PERCENT",
        36 => "MONEY",
        40 => "CHAR",
        44 => "PAIR",
        48 => "TUPLE",
        52 => "TIME",
        56 => "DATE",
        60 => "WORD",
        64 => "SET_WORD",
        68 => "GET_WORD",
        72 => "LIT_WORD",
        76 => "REFINEMENT",
        80 => "ISSUE",
        84 => "BINARY",
        88 => "STRING",
        92 => "FILE",
        96 => "EMAIL",
        100 => "URL",
        104 => "TAG",
        108 => "BITSET",
        112 => "IMAGE",
        116 => "VECTOR",
        120 => "BLOCK",
        124 => "GROUP",
        128 => "PATH",
        132 => "SET_PATH",
        136 => "GET_PATH",
        140 => "LIT_PATH",
        144 => "MAP",
        148 => "DATATYPE",
        152 => "TYPESET",
        156 => "NATIVE",
        160 => "ACTION",
        164 => "ROUTINE",
        168 => "COMMAND",
        172 => "FUNCTION",
        176 => "VARARGS",
        180 => "OBJECT",
        184 => "FRAME",
        188 => "MODULE",
        192 => "ERROR",
        196 => "TASK",
        200 => "PORT",
        204 => "GOB",
        208 => "EVENT",
        212 => "CALLBACK",
        216 => "HANDLE",
        220 => "STRUCT",
        224 => "LIBRARY",
        232 => "SERIES",
        233 => "ARRAY",
        234 => "CONTEXT",
        235 => "KEYLIST",
        236 => "VARLIST",
        237 => "FIELD",
        238 => "STU",
        239 => "HASH",
        240 => "CHUNK",
        241 => "CALL",
        242 => "ROUTINE_INFO",
        243 => "KIND_MAX",
        244 => "GOBT_COLOR",
        245 => "GOBT_IMAGE",
        246 => "GOBT_STRING",
        247 => "ARRAY(DRAW)",
        248 => "ARRAY(TEXT)",
        249 => "ARRAY(EFFECT)",
        _ => "unknown",
    }
}
