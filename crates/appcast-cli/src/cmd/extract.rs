//! Extract-version command

use anyhow::{Result, bail};
use appcast_core::VersionExtractor;
use appcast_core::discovery::extensions_from_str;

pub fn extract_version(
    names: &[String],
    prefix: Option<&str>,
    extensions: Option<&str>,
) -> Result<()> {
    let mut extractor = VersionExtractor::new();
    if let Some(prefix) = prefix {
        extractor = extractor.with_prefix(prefix);
    }
    if let Some(exts) = extensions {
        extractor = extractor.with_extensions(extensions_from_str(exts));
    }

    let mut missing = 0;
    for name in names {
        match extractor.extract(name) {
            Some(version) => println!("{version}"),
            None => {
                eprintln!("no version found in {name}");
                missing += 1;
            }
        }
    }

    if missing > 0 {
        bail!("{missing} of {} names had no version", names.len());
    }
    Ok(())
}
