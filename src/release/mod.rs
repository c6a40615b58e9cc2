//! Release creation

use crate::error::Result;
use crate::host::PrHost;
use tracing::debug;

/// Tag and release name for a version string ("1.2.3" -> "v1.2.3")
pub fn release_tag(version: &str) -> String {
    format!("v{version}")
}

/// Create a release whose tag and name are both `v<version>`.
///
/// Primary operation: any API failure is fatal for the invocation.
pub async fn create_release(host: &dyn PrHost, version: &str) -> Result<String> {
    let tag = release_tag(version);
    debug!(tag = %tag, "creating release");
    host.create_release(&tag, &tag).await?;
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_tag() {
        assert_eq!(release_tag("3.11.0"), "v3.11.0");
    }
}
