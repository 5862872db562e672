#![no_main]

use libfuzzer_sys::fuzz_target;
use stager_metadata::MavenMetadataDocument;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = MavenMetadataDocument::from_xml(data) else {
        return;
    };

    // Anything that parses must survive a marshal/unmarshal cycle.
    let xml = doc.to_xml().expect("marshal parsed document");
    let again = MavenMetadataDocument::from_xml(xml.as_bytes()).expect("unmarshal own output");
    assert_eq!(doc, again);
});
