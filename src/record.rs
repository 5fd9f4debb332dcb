//! Dump line parsing
//!
//! One line of a memory dump describes one object:
//!
//! ```text
//! <addr-hex>,<referrer-addr-hex-or-nil>,<type-code>,<size>,<edge-label-or-null>,<name-or-null>
//! ```
//!
//! The name is the remainder of the line after the fifth comma, so it may
//! itself contain commas. Blank lines and lines starting with `#` are
//! comments.

/// Referrer sentinels meaning "no referrer" (the synthetic NIL root)
const NIL_SENTINELS: [&str; 2] = ["nil", "(nil)"];

/// Edge label / name sentinels meaning "absent"
const NULL_SENTINELS: [&str; 2] = ["null", "(null)"];

/// A single parsed object record, borrowing its strings from the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpRecord<'a> {
    /// Object address
    pub label: u64,
    /// Referrer address, 0 when the referrer is nil
    pub referrer: u64,
    /// Runtime type code
    pub kind: i32,
    /// Bytes held directly by this object
    pub size: u64,
    /// Edge label from the referrer, empty when absent
    pub edge: &'a str,
    /// Display name, empty when absent
    pub name: &'a str,
}

/// Result of classifying one raw line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome<'a> {
    Record(DumpRecord<'a>),
    Comment,
    Malformed,
}

/// Parse one dump line
///
/// Leading spaces and tabs are skipped before classification. Any missing
/// field or unparseable number makes the line [`ParseOutcome::Malformed`].
///
/// # Example
///
/// ```
/// use dump2dot::record::{parse_line, ParseOutcome};
///
/// match parse_line("0x2,0x1,24,50,child_of,leaf1") {
///     ParseOutcome::Record(rec) => {
///         assert_eq!(rec.label, 2);
///         assert_eq!(rec.referrer, 1);
///         assert_eq!(rec.name, "leaf1");
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn parse_line(line: &str) -> ParseOutcome<'_> {
    let line = line.trim_start_matches(&[' ', '\t'][..]);
    if line.is_empty() || line.starts_with('#') {
        return ParseOutcome::Comment;
    }

    let mut fields = line.splitn(6, ',');
    let (Some(addr), Some(referrer), Some(kind), Some(size), Some(edge), Some(name)) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return ParseOutcome::Malformed;
    };

    let Some(label) = parse_address(addr) else {
        return ParseOutcome::Malformed;
    };

    let referrer = if NIL_SENTINELS.contains(&referrer.trim()) {
        0
    } else {
        match parse_address(referrer) {
            Some(r) => r,
            None => return ParseOutcome::Malformed,
        }
    };

    let Ok(kind) = kind.trim().parse::<i32>() else {
        return ParseOutcome::Malformed;
    };
    let Ok(size) = size.trim().parse::<u64>() else {
        return ParseOutcome::Malformed;
    };

    ParseOutcome::Record(DumpRecord {
        label,
        referrer,
        kind,
        size,
        edge: strip_null(edge),
        name: strip_null(name),
    })
}

/// Parse a dump address: always base 16, with an optional `0x` prefix
pub fn parse_address(text: &str) -> Option<u64> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).ok()
}

fn strip_null(field: &str) -> &str {
    if NULL_SENTINELS.contains(&field) {
        ""
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> DumpRecord<'_> {
        match parse_line(line) {
            ParseOutcome::Record(rec) => rec,
            other => panic!("expected record for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_parse_full_record() {
        let rec = record("0x7f00a0,0x7f0010,120,64,<body>,my-block");
        assert_eq!(rec.label, 0x7f00a0);
        assert_eq!(rec.referrer, 0x7f0010);
        assert_eq!(rec.kind, 120);
        assert_eq!(rec.size, 64);
        assert_eq!(rec.edge, "<body>");
        assert_eq!(rec.name, "my-block");
    }

    #[test]
    fn test_address_without_prefix_is_still_hex() {
        let rec = record("10,nil,24,8,,x");
        assert_eq!(rec.label, 16);
    }

    #[test]
    fn test_nil_referrer_maps_to_zero() {
        assert_eq!(record("0x1,nil,24,100,,root").referrer, 0);
        assert_eq!(record("0x1,(nil),24,100,,root").referrer, 0);
    }

    #[test]
    fn test_null_edge_and_name_are_empty() {
        let rec = record("0x1,0x2,24,8,null,(null)");
        assert_eq!(rec.edge, "");
        assert_eq!(rec.name, "");
    }

    #[test]
    fn test_name_keeps_remaining_commas() {
        let rec = record("0x1,0x2,88,8,,hello, world");
        assert_eq!(rec.name, "hello, world");
    }

    #[test]
    fn test_leading_whitespace_skipped() {
        let rec = record(" \t0x1,nil,24,8,,root");
        assert_eq!(rec.label, 1);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        assert_eq!(parse_line(""), ParseOutcome::Comment);
        assert_eq!(parse_line("   "), ParseOutcome::Comment);
        assert_eq!(parse_line("# header"), ParseOutcome::Comment);
        assert_eq!(parse_line("\t# indented"), ParseOutcome::Comment);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        assert_eq!(parse_line("0x1"), ParseOutcome::Malformed);
        assert_eq!(parse_line("0x1,nil,24,100"), ParseOutcome::Malformed);
        assert_eq!(parse_line("0x1,nil,24,100,edge"), ParseOutcome::Malformed);
    }

    #[test]
    fn test_bad_numbers_are_malformed() {
        assert_eq!(parse_line("zz,nil,24,100,,n"), ParseOutcome::Malformed);
        assert_eq!(parse_line("0x1,qq,24,100,,n"), ParseOutcome::Malformed);
        assert_eq!(parse_line("0x1,nil,int,100,,n"), ParseOutcome::Malformed);
        assert_eq!(parse_line("0x1,nil,24,-5,,n"), ParseOutcome::Malformed);
    }

    #[test]
    fn test_empty_name_field() {
        let rec = record("0x1,nil,24,100,,");
        assert_eq!(rec.name, "");
    }

    #[test]
    fn test_parse_address_prefixes() {
        assert_eq!(parse_address("0xff"), Some(255));
        assert_eq!(parse_address("0XFF"), Some(255));
        assert_eq!(parse_address("ff"), Some(255));
        assert_eq!(parse_address(""), None);
        assert_eq!(parse_address("0x"), None);
    }
}
