//! Fuzz target for format sniffing and loading with arbitrary byte input.
//!
//! Every detector runs over the input; if one accepts it, the matching
//! archive type parses it as if it were an entry of another archive. The goal
//! is to find panics or hangs in the detectors and parsers.
//!
//! Run with: cargo +nightly fuzz run archive_load

#![no_main]

use arcmgr::format;
use arcmgr::{Archive, ArchiveId, EntryId, EntryRef, Source};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Detectors must agree with a restricted run over their own format
    let Some(found) = format::identify_bytes(data) else {
        return;
    };
    let source = Source::Entry {
        parent: EntryRef::new(ArchiveId::next(), EntryId::from_raw(0)),
        name: "fuzz.dat",
        data,
    };
    assert_eq!(format::identify_restricted(&source, &[found]), Some(found));

    let mut archive = (found.desc().create)();
    if archive.load(source).is_ok() {
        let tree = archive.tree();
        for entry in tree.walk(tree.root()) {
            let _ = tree.path_of(entry);
            let _ = tree.namespace_of(entry);
            let _ = tree.data(entry).map(<[u8]>::len);
        }
        // Writable formats must produce bytes their own detector accepts
        if let Ok(bytes) = archive.write() {
            assert_eq!(format::identify_bytes(&bytes), Some(found));
        }
    }
});
