#![no_main]

use libfuzzer_sys::fuzz_target;
use stager::pom::{ProjectDefaults, parse_description, render_pom, translate};
use stager::types::{ArtifactCoordinate, Version};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = parse_description(text, "fuzz") else {
        return;
    };

    let defaults = ProjectDefaults {
        title: "fuzz".to_string(),
        description: None,
    };
    let pom = translate(&doc, &defaults);
    let Ok(version) = Version::parse("1.0.0") else {
        return;
    };
    let coordinate = ArtifactCoordinate::new("org.example", "fuzz", version);
    let _ = render_pom(&pom, &coordinate, "pom");
});
