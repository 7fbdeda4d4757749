//! Property tests for tagged-name encoding

use proptest::prelude::*;
use tagtree::tag::{decode, encode, validate_base_name, validate_tag, TagSet, TaggedName};

fn base_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9_.]{0,8}( [A-Za-z0-9_.]{1,6}){0,2}"
}

fn tag() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_+.]{1,8}"
}

fn tag_set() -> impl Strategy<Value = TagSet> {
    prop::collection::btree_set(tag(), 0..5)
}

proptest! {
    /// Any legal base and tag set survives encode then decode unchanged
    #[test]
    fn test_decode_inverts_encode(base in base_name(), tags in tag_set()) {
        prop_assume!(validate_base_name(&base).is_ok());
        for t in &tags {
            prop_assert!(validate_tag(t).is_ok());
        }
        let (decoded_base, decoded_tags) = decode(&encode(&base, &tags)).unwrap();
        prop_assert_eq!(decoded_base, base);
        prop_assert_eq!(decoded_tags, tags);
    }

    /// Tag order and repetition in a file name never matter
    #[test]
    fn test_tag_order_is_canonical(base in base_name(), tags in prop::collection::vec(tag(), 1..6)) {
        prop_assume!(validate_base_name(&base).is_ok());
        let mut shuffled = tags.clone();
        shuffled.reverse();
        shuffled.extend(tags.iter().cloned());
        let stem = format!("{} -{}", base, shuffled.iter().map(|t| format!(" @{}", t)).collect::<String>());

        let name = TaggedName::parse(&format!("{}.jpg", stem)).unwrap();
        let expected: TagSet = tags.into_iter().collect();
        prop_assert_eq!(&name.tags, &expected);
        prop_assert_eq!(name.to_string(), format!("{}.jpg", encode(&base, &expected)));
    }
}
