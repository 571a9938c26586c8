//! Identifier Allocation
//!
//! Every component instance owns a short random tag drawn once at
//! construction. The tag never changes for the lifetime of the instance;
//! the user-facing identifier is derived from it on demand as
//! `{tag}-{name}`, so renaming a component re-derives the identifier
//! without touching the tag.
//!
//! # Collision Model
//!
//! Tags are 7 lowercase hex characters (~268 million values). Collisions
//! are not detected; the space is large enough that two live components
//! sharing a tag is treated as negligible, matching the cheap-allocation
//! goal. Anything that must be unique per field additionally mixes in the
//! field name via [`scoped_id`].

use rand::Rng;

use crate::tree::ComponentCore;

/// Length of the random instance tag, in hex characters.
pub const COMPONENT_TAG_LENGTH: usize = 7;

/// Logical name assigned to components that were never named explicitly.
pub const DEFAULT_COMPONENT_NAME: &str = "unnamed";

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Draw a fresh random instance tag.
///
/// Uses the thread-local generator; tags are purely decorative entropy
/// and carry no security weight.
pub(crate) fn random_tag() -> String {
    let mut rng = rand::thread_rng();
    (0..COMPONENT_TAG_LENGTH)
        .map(|_| HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char)
        .collect()
}

/// Derive a cell identifier scoped to one component and one field.
///
/// The result is `{component_id}-{field}`, giving every component a
/// private namespace for the reactive cells it owns.
pub fn scoped_id(core: &ComponentCore, field: &str) -> String {
    format!("{}-{}", core.id(), field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_have_fixed_length() {
        for _ in 0..32 {
            assert_eq!(random_tag().len(), COMPONENT_TAG_LENGTH);
        }
    }

    #[test]
    fn tags_are_lowercase_hex() {
        for _ in 0..32 {
            let tag = random_tag();
            assert!(tag.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn tags_differ_between_draws() {
        // 16^7 values; a collision across a handful of draws would point
        // at a broken generator rather than bad luck.
        let first = random_tag();
        let second = random_tag();
        let third = random_tag();
        assert!(first != second || second != third);
    }

    #[test]
    fn scoped_id_appends_the_field() {
        let core = ComponentCore::new("sidebar");
        let scoped = scoped_id(&core, "signal");
        assert_eq!(scoped, format!("{}-signal", core.id()));
        assert!(scoped.ends_with("-sidebar-signal"));
    }
}
