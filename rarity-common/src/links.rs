//! IPFS link resolution

/// Public gateway used when none is configured
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.ipfs.io/ipfs/";

const IPFS_SCHEME: &str = "ipfs://";

/// Rewrite an `ipfs://` link to go through `gateway`.
///
/// Links without the scheme are returned unchanged. Only the first
/// occurrence of the scheme is replaced.
pub fn resolve_link(url: &str, gateway: &str) -> String {
    if url.is_empty() || !url.contains(IPFS_SCHEME) {
        return url.to_string();
    }
    url.replacen(IPFS_SCHEME, gateway, 1)
}
