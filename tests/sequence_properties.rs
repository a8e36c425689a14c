use erp_documents::documents::sequence::{self, IdPrefix, MAX_SEQUENCE};
use proptest::prelude::*;

fn prefix_strategy() -> impl Strategy<Value = IdPrefix> {
    prop_oneof![
        Just(IdPrefix::BOM),
        Just(IdPrefix::BOM_MATERIAL),
        Just(IdPrefix::MANUFACTURING_ORDER),
        Just(IdPrefix::RFQ),
        Just(IdPrefix::RFQ_PRODUCT),
        Just(IdPrefix::QUOTATION),
        Just(IdPrefix::QUOTATION_PRODUCT),
        Just(IdPrefix::VENDOR_BILL),
    ]
}

proptest! {
    #[test]
    fn next_id_follows_the_last_one(prefix in prefix_strategy(), n in 1u32..MAX_SEQUENCE) {
        let last = prefix.format(n);
        let next = sequence::next(prefix, &last).unwrap();

        prop_assert_eq!(sequence::parse_sequence(&next).unwrap(), n + 1);
        prop_assert!(next.starts_with(prefix.as_str()));
    }

    #[test]
    fn ids_sort_as_text_in_issue_order(prefix in prefix_strategy(), a in 1u32..=MAX_SEQUENCE, b in 1u32..=MAX_SEQUENCE) {
        let (left, right) = (prefix.format(a), prefix.format(b));
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }

    #[test]
    fn batches_are_contiguous(prefix in prefix_strategy(), start in 0u32..1000, count in 1usize..20) {
        let last = if start == 0 { String::new() } else { prefix.format(start) };
        let ids = sequence::next_batch(prefix, &last, count).unwrap();

        prop_assert_eq!(ids.len(), count);
        for (offset, id) in ids.iter().enumerate() {
            prop_assert_eq!(sequence::parse_sequence(id).unwrap(), start + 1 + offset as u32);
        }
    }
}

#[test]
fn sequence_space_is_finite() {
    let last = IdPrefix::RFQ.format(MAX_SEQUENCE);
    assert!(sequence::next(IdPrefix::RFQ, &last).is_err());
}
