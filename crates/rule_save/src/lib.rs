//! Persistence for parking rule sets.
//!
//! A rule set is saved as a small versioned blob: a fixed 20-byte header
//! (magic, version, record count, payload length, xxHash32) followed by the
//! bitcode-encoded `{building -> rule}` records. Loads are all or nothing.

pub mod atomic_write;
pub mod rule_codec;
pub mod rule_header;
pub mod save_error;

pub use rule_codec::{
    decode_rules, encode_rules, load_rules_from_file, load_rules_into, save_rules_to_file,
};
pub use rule_header::{RuleHeader, HEADER_SIZE, MAGIC, RULES_FORMAT_VERSION};
pub use save_error::SaveError;
