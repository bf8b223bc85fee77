//! `python` step (`spec.md` §4.4, §9).
//!
//! The reference implementation runs guide-embedded Python against its own
//! interpreter. That's an optional capability this engine does not provide;
//! per `spec.md` §9 the default implementation rejects it with a clear error
//! rather than silently skipping or shelling out to a system `python3`.

use ypms_core::{Error, Result};

pub async fn python() -> Result<String> {
    Err(Error::validation(
        "python steps are not supported by this engine; guides requiring one cannot run here",
    ))
}
