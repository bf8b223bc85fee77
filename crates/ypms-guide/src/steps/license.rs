//! `license-agreement-url` step (`spec.md` §4.4): print the license URL and
//! require the user to type `a` to acknowledge before continuing. Runs on
//! the blocking stdin/stdout, consistent with the rest of this engine's
//! single-threaded, blocking execution model.

use ypms_core::{Error, Result, SubstitutionContext};

use crate::content;

pub async fn license_agreement_url(
    content: &sonic_rs::Value,
    ctx: &SubstitutionContext,
) -> Result<String> {
    let url = ctx.apply(content::as_str(content, "license-agreement-url")?);

    println!("This package requires agreeing to the license at:\n  {url}");
    println!("Type `a` and press enter to acknowledge, anything else to abort.");

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| Error::filesystem(format!("failed to read acknowledgment: {e}")))?;

    if line.trim().eq_ignore_ascii_case("a") {
        Ok(format!("license at {url} acknowledged"))
    } else {
        Err(Error::validation(format!(
            "license at {url} was not acknowledged"
        )))
    }
}
