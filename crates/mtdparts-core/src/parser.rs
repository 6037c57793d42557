//! mtdparts grammar parsing
//!
//! Accepts the Linux kernel / U-Boot compatible mtdparts grammar:
//!
//! ```text
//! mtdparts   := <mtd-def>[;<mtd-def>...]
//! <mtd-def>  := <mtd-id>:<part-def>[,<part-def>...]
//! <part-def> := <size>[@<offset>][(<name>)][ro]
//! <size>     := '-' for all remaining space, or a C-style integer
//!               literal with an optional k/m/g binary multiplier
//! <offset>   := C-style integer literal
//! ```
//!
//! Fields appear in fixed order, only the size is mandatory, and any text
//! left after the last recognized field fails the parse.

use crate::error::ParseError;
use crate::store::{DeviceId, PartitionTable, Size};

/// Parser driving a [`PartitionTable`] from mtdparts specification strings
///
/// [`parse`](Self::parse) may be called once per input line; devices
/// accumulate into the same table. The first error aborts the parse and
/// leaves the table partially built, to be discarded by the caller.
pub struct MtdPartsParser<'t> {
    table: &'t mut PartitionTable,
}

impl<'t> MtdPartsParser<'t> {
    /// Create a parser feeding the given table
    pub fn new(table: &'t mut PartitionTable) -> Self {
        Self { table }
    }

    /// Parse a complete specification string
    pub fn parse(&mut self, spec: &str) -> Result<(), ParseError> {
        if spec.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        for mtd_def in spec.split(';') {
            self.parse_mtd_def(mtd_def)?;
        }
        Ok(())
    }

    /// Parse one `<mtd-id>:<part-def>[,<part-def>...]` definition
    fn parse_mtd_def(&mut self, def: &str) -> Result<(), ParseError> {
        let Some((tag, part_list)) = def.split_once(':') else {
            return Err(ParseError::EmptyPartitionList {
                device: def.to_string(),
            });
        };
        if tag.is_empty() {
            return Err(ParseError::EmptyDeviceId {
                text: def.to_string(),
            });
        }

        let dev = self.table.add_device(tag);
        if part_list.is_empty() {
            return Err(ParseError::EmptyPartitionList {
                device: tag.to_string(),
            });
        }
        for part_def in part_list.split(',') {
            self.parse_part_def(dev, part_def)?;
        }
        Ok(())
    }

    /// Parse one `<size>[@<offset>][(<name>)][ro]` definition and commit
    /// the resulting partition
    fn parse_part_def(&mut self, dev: DeviceId, def: &str) -> Result<(), ParseError> {
        let device = self.table.device_tag(dev).to_string();
        let mut draft = self.table.begin_partition(dev)?;

        // Mandatory size field, ending at the first '@', '(' or literal
        // "ro" (the multiplier letters cannot collide with any of these).
        let (size_tok, mut rest) = def.split_at(field_break(def, &["@", "(", "ro"]));
        if size_tok.is_empty() {
            return Err(ParseError::MissingSize {
                device,
                text: def.to_string(),
            });
        }
        let size = parse_size(size_tok).ok_or_else(|| ParseError::InvalidSize {
            device: device.clone(),
            text: def.to_string(),
        })?;
        draft.set_size(size);

        // Optional '@'-prefixed offset, ending at the next '(' or "ro".
        if let Some(tail) = rest.strip_prefix('@') {
            let (offset_tok, tail) = tail.split_at(field_break(tail, &["(", "ro"]));
            let offset = parse_int(offset_tok).ok_or_else(|| ParseError::InvalidOffset {
                device: device.clone(),
                text: def.to_string(),
            })?;
            draft.set_offset(offset)?;
            rest = tail;
        }

        // Optional parenthesized name.
        if let Some(tail) = rest.strip_prefix('(') {
            let Some(end) = tail.find(')') else {
                return Err(ParseError::UnterminatedName {
                    device,
                    text: def.to_string(),
                });
            };
            let name = &tail[..end];
            if name.is_empty() {
                return Err(ParseError::EmptyName {
                    device,
                    text: def.to_string(),
                });
            }
            draft.set_name(name);
            rest = &tail[end + 1..];
        }

        // Optional trailing read-only flag; nothing may follow it.
        if let Some(tail) = rest.strip_prefix("ro") {
            draft.set_read_only();
            rest = tail;
        }
        if !rest.is_empty() {
            return Err(ParseError::ExcessFields {
                device,
                text: rest.to_string(),
            });
        }

        self.table.commit_partition(draft);
        Ok(())
    }
}

/// Position of the first occurrence of any of `stops`, or the end of text
fn field_break(text: &str, stops: &[&str]) -> usize {
    stops
        .iter()
        .filter_map(|stop| text.find(stop))
        .min()
        .unwrap_or(text.len())
}

/// Parse a size token: `-` for all remaining space, otherwise a C-style
/// integer literal with an optional `k`/`m`/`g` binary multiplier
fn parse_size(tok: &str) -> Option<Size> {
    if tok == "-" {
        return Some(Size::Remaining);
    }
    let (digits, mult) = match tok.bytes().last()? {
        b'k' => (&tok[..tok.len() - 1], 1u64 << 10),
        b'm' => (&tok[..tok.len() - 1], 1 << 20),
        b'g' => (&tok[..tok.len() - 1], 1 << 30),
        _ => (tok, 1),
    };
    parse_int(digits)?.checked_mul(mult).map(Size::Bytes)
}

/// Parse a C-style unsigned integer literal: `0x`/`0X` hexadecimal,
/// `0`-prefixed octal, decimal otherwise
fn parse_int(tok: &str) -> Option<u64> {
    if let Some(hex) = tok
        .strip_prefix("0x")
        .or_else(|| tok.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else if tok.len() > 1 && tok.starts_with('0') {
        u64::from_str_radix(&tok[1..], 8).ok()
    } else {
        tok.parse().ok()
    }
}
