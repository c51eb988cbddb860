#![no_main]

use jpeghash_core::{SegmentHasher, TypeFilter, scan};
use libfuzzer_sys::fuzz_target;
use sha1::{Digest, Sha1};

fuzz_target!(|input: (u8, u8, u16, &[u8])| {
    let (lo, hi, split, data) = input;

    let plain = scan::<Sha1>(data, &TypeFilter::default());
    assert_eq!(plain, Sha1::digest(data));

    let filter = TypeFilter::build([(lo.min(hi), lo.max(hi))]).unwrap_or_default();
    let whole = scan::<Sha1>(data, &filter);

    let at = usize::from(split) % (data.len() + 1);
    let mut hasher = SegmentHasher::<Sha1>::new(&filter);
    hasher.update(&data[..at]);
    hasher.update(&data[at..]);
    assert_eq!(hasher.finalize(), whole);
});
